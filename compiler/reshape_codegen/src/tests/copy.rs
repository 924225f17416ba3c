use pretty_assertions::assert_eq;
use reshape_types::{MapRef, ObjectRef, TypeId, Value};

use super::{compile, field, linked_node, Fixture};
use crate::{copier, GenError};

#[test]
fn shallow_copy_shares_nested_references() {
    let fx = Fixture::new();
    let copy = compile(copier(&fx.cx(), fx.person, false));

    let original = fx.ann();
    let copied = copy.call(original.clone()).unwrap();
    assert_eq!(copied, original);
    assert!(!copied.same_ref(&original));
    assert!(field(&copied, 2).same_ref(&field(&original, 2)));
}

#[test]
fn deep_copy_duplicates_nested_references() {
    let fx = Fixture::new();
    let copy = compile(copier(&fx.cx(), fx.person, true));

    let original = fx.ann();
    let copied = copy.call(original.clone()).unwrap();
    assert_eq!(copied, original);
    assert!(!field(&copied, 2).same_ref(&field(&original, 2)));

    let homeless = fx.person_of("Bo", 4, Value::Null);
    assert_eq!(field(&copy.call(homeless).unwrap(), 2), Value::Null);
    assert_eq!(copy.call(Value::Null).unwrap(), Value::Null);
}

#[test]
fn deep_copy_walks_collections() {
    let fx = Fixture::new();
    let reg = fx.registry();
    let by_name = reg.dictionary_of(TypeId::STRING, fx.address);
    let directory = reg
        .record("Directory")
        .property("Entries", reg.list_of(fx.address))
        .property("Index", by_name)
        .finish();
    let copy = compile(copier(&fx.cx(), directory, true));

    let home = fx.address_of("NYC");
    let entries = fx.list(fx.address, vec![home.clone(), Value::Null]);
    let index = MapRef::new(by_name);
    index.insert(Value::string("home"), home.clone());
    let original = Value::Object(ObjectRef::new(directory, vec![entries, Value::Map(index)]));

    let copied = copy.call(original.clone()).unwrap();
    assert_eq!(copied, original);
    let copied_entries = field(&copied, 0);
    assert!(!copied_entries.same_ref(&field(&original, 0)));
    let first = copied_entries.as_list().unwrap().get(0).unwrap();
    assert!(!first.same_ref(&home));
    let indexed = field(&copied, 1).as_map().unwrap().get(&Value::string("home")).unwrap();
    assert!(!indexed.same_ref(&home));
}

#[test]
fn self_referential_records() {
    let fx = Fixture::new();
    let node = linked_node(fx.registry());

    // Shallow copies never look past the top level.
    let copy = compile(copier(&fx.cx(), node, false));
    let tail = Value::Object(ObjectRef::new(node, vec![Value::I32(2), Value::Null]));
    let head = Value::Object(ObjectRef::new(node, vec![Value::I32(1), tail.clone()]));
    assert!(field(&copy.call(head).unwrap(), 1).same_ref(&tail));

    assert!(matches!(
        copier(&fx.cx(), node, true),
        Err(GenError::DepthExceeded { .. })
    ));
}
