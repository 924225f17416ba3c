use pretty_assertions::assert_eq;
use reshape_types::{EvalError, ObjectRef, ScalarKind, TypeId, Value};

use super::{compile, Fixture};
use crate::{projection_type, projector, GenError};

#[test]
fn one_bracketed_entry_per_property() {
    let fx = Fixture::new();
    let project = compile(projector(&fx.cx(), fx.person));

    let map = project.call(fx.ann()).unwrap();
    assert_eq!(map.as_map().unwrap().ty(), projection_type(&fx.cx()));
    assert_eq!(
        map.as_map().unwrap().entries(),
        vec![
            (Value::string("[Name]"), Value::string("Ann")),
            (Value::string("[Age]"), Value::string("30")),
            (Value::string("[Home]"), Value::string(r#"{"City":"NYC"}"#)),
        ]
    );
}

#[test]
fn null_members_keep_their_entries() {
    let fx = Fixture::new();
    let project = compile(projector(&fx.cx(), fx.person));

    let map = project
        .call(fx.person_of("x", 1, Value::Null))
        .unwrap();
    let map = map.as_map().unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map.get(&Value::string("[Home]")).unwrap(), Value::string("null"));

    let nameless = fx.ann();
    nameless.as_object().unwrap().set_field(0, Value::Null).unwrap();
    let map = project.call(nameless).unwrap();
    assert_eq!(
        map.as_map().unwrap().get(&Value::string("[Name]")).unwrap(),
        Value::Null
    );
}

#[test]
fn projecting_null_is_a_runtime_error() {
    let fx = Fixture::new();
    let project = compile(projector(&fx.cx(), fx.person));

    assert!(matches!(
        project.call(Value::Null),
        Err(EvalError::NullReference { .. })
    ));
}

#[test]
fn only_records_project() {
    let fx = Fixture::new();

    assert!(matches!(
        projector(&fx.cx(), TypeId::I32),
        Err(GenError::ShapeMismatch { .. })
    ));
}

#[test]
fn null_nullable_scalars_project_to_null() {
    let fx = Fixture::new();
    let ty = fx
        .registry()
        .record("Reading")
        .property("Count", ScalarKind::I32.nullable_type_id())
        .property("At", ScalarKind::DateTime.nullable_type_id())
        .finish();
    let project = compile(projector(&fx.cx(), ty));

    let map = project
        .call(Value::Object(ObjectRef::new(ty, vec![Value::Null, Value::Null])))
        .unwrap();
    assert_eq!(
        map.as_map().unwrap().entries(),
        vec![
            (Value::string("[Count]"), Value::Null),
            (Value::string("[At]"), Value::Null),
        ]
    );
    let map = project
        .call(Value::Object(ObjectRef::new(ty, vec![Value::I32(5), Value::Null])))
        .unwrap();
    assert_eq!(map.as_map().unwrap().entries()[0].1, Value::string("5"));
}
