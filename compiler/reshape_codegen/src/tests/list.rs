use pretty_assertions::assert_eq;
use reshape_types::{ObjectRef, Value};

use super::{compile, field, Fixture};
use crate::{list_copier, list_mapper, list_projector};

#[test]
fn maps_each_element_in_order() {
    let fx = Fixture::new();
    let map = compile(list_mapper(&fx.cx(), fx.dto, fx.person, false));

    let dto = |name: &str| Value::Object(ObjectRef::new(fx.dto, vec![Value::string(name)]));
    let people = map
        .call(fx.list(fx.dto, vec![dto("a"), Value::Null, dto("b")]))
        .unwrap();
    let people = people.as_list().unwrap();
    assert_eq!(people.ty(), fx.registry().list_of(fx.person));
    let items = people.items();
    assert_eq!(items.len(), 3);
    assert_eq!(field(&items[0], 0), Value::string("a"));
    assert_eq!(items[1], Value::Null);
    assert_eq!(field(&items[2], 0), Value::string("b"));

    assert_eq!(map.call(Value::Null).unwrap(), Value::Null);
}

#[test]
fn copies_lists_shallow_and_deep() {
    let fx = Fixture::new();
    let original = fx.list(fx.person, vec![fx.ann()]);
    let first = |list: &Value| list.as_list().unwrap().get(0).unwrap();

    let shallow = compile(list_copier(&fx.cx(), fx.person, false));
    let copied = shallow.call(original.clone()).unwrap();
    assert!(!copied.same_ref(&original));
    assert!(first(&copied).same_ref(&first(&original)));

    let deep = compile(list_copier(&fx.cx(), fx.person, true));
    let copied = deep.call(original.clone()).unwrap();
    assert_eq!(copied, original);
    assert!(!first(&copied).same_ref(&first(&original)));
}

#[test]
fn projects_each_record() {
    let fx = Fixture::new();
    let project = compile(list_projector(&fx.cx(), fx.person));

    let maps = project.call(fx.list(fx.person, vec![fx.ann(), fx.ann()])).unwrap();
    let maps = maps.as_list().unwrap().items();
    assert_eq!(maps.len(), 2);
    assert_eq!(
        maps[1].as_map().unwrap().get(&Value::string("[Age]")).unwrap(),
        Value::string("30")
    );
}
