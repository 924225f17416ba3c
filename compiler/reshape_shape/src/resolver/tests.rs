use super::*;
use pretty_assertions::assert_eq;
use reshape_types::{ScalarKind, TypeRegistry};

fn resolver() -> ShapeResolver {
    ShapeResolver::new(SharedRegistry::new(TypeRegistry::new()))
}

#[test]
fn scalars_and_strings() {
    let r = resolver();
    assert_eq!(
        r.classify(TypeId::I64).unwrap().kind,
        ShapeKind::Scalar(ScalarKind::I64)
    );
    assert_eq!(r.classify(TypeId::STRING).unwrap().kind, ShapeKind::String);
}

#[test]
fn nullable_scalars_are_nullable_leaves() {
    let r = resolver();
    let shape = r.classify(ScalarKind::F64.nullable_type_id()).unwrap();
    assert_eq!(shape.kind, ShapeKind::Nullable(ScalarKind::F64));
    assert_eq!(shape.name, "F64?");
    assert!(shape.is_leaf());
    assert!(shape.is_nullable());
    assert!(!r.classify(TypeId::F64).unwrap().is_nullable());
}

#[test]
fn record_properties_keep_declaration_order() {
    let r = resolver();
    let address = r.registry().record("Address").property("City", TypeId::STRING).finish();
    let person = r
        .registry()
        .record("Person")
        .property("Name", TypeId::STRING)
        .property("Age", TypeId::I32)
        .property("Home", address)
        .finish();
    let shape = r.classify(person).unwrap();
    let names: Vec<_> = shape.properties().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Name", "Age", "Home"]);
    assert_eq!(shape.property("Home").map(|p| (p.ty, p.index)), Some((address, 2)));
}

#[test]
fn self_referential_record_classifies() {
    let r = resolver();
    let builder = r.registry().record("Node");
    let id = builder.id();
    let node = builder.property("Value", TypeId::I32).property("Next", id).finish();
    let shape = r.classify(node).unwrap();
    assert_eq!(shape.property("Next").map(|p| p.ty), Some(node));
}

#[test]
fn builtin_collections() {
    let r = resolver();
    let list = r.registry().list_of(TypeId::I32);
    let array = r.registry().array_of(TypeId::STRING);
    let dict = r.registry().dictionary_of(TypeId::STRING, TypeId::F64);
    assert_eq!(
        r.classify(list).unwrap().kind,
        ShapeKind::List {
            element: TypeId::I32
        }
    );
    assert_eq!(
        r.classify(array).unwrap().kind,
        ShapeKind::Array {
            element: TypeId::STRING
        }
    );
    assert_eq!(
        r.classify(dict).unwrap().kind,
        ShapeKind::Dictionary {
            key: TypeId::STRING,
            value: TypeId::F64
        }
    );
}

#[test]
fn dictionary_capability_wins_over_collection() {
    let r = resolver();
    let ty = r
        .registry()
        .collection("Lookup")
        .capability(Capability::Collection {
            element: TypeId::STRING,
        })
        .capability(Capability::Dictionary {
            key: TypeId::STRING,
            value: TypeId::I32,
        })
        .finish();
    assert!(matches!(
        r.classify(ty).unwrap().kind,
        ShapeKind::Dictionary { .. }
    ));
}

#[test]
fn collection_wins_over_enumerable() {
    let r = resolver();
    let ty = r
        .registry()
        .collection("Bag")
        .capability(Capability::Enumerable {
            element: TypeId::OBJECT,
        })
        .capability(Capability::Collection {
            element: TypeId::I32,
        })
        .finish();
    assert_eq!(
        r.classify(ty).unwrap().kind,
        ShapeKind::List {
            element: TypeId::I32
        }
    );
}

#[test]
fn two_dictionary_capabilities_are_ambiguous() {
    let r = resolver();
    let ty = r
        .registry()
        .collection("Both")
        .capability(Capability::Dictionary {
            key: TypeId::STRING,
            value: TypeId::I32,
        })
        .capability(Capability::Dictionary {
            key: TypeId::I32,
            value: TypeId::STRING,
        })
        .finish();
    assert!(matches!(r.classify(ty), Err(ShapeError::Ambiguous { .. })));
    assert!(r.is_empty());
}

#[test]
fn multi_argument_collection_is_unclassifiable() {
    let r = resolver();
    let ty = r
        .registry()
        .collection("Pairs")
        .generic_args(&[TypeId::I32, TypeId::STRING])
        .capability(Capability::Enumerable {
            element: TypeId::OBJECT,
        })
        .finish();
    assert!(matches!(
        r.classify(ty),
        Err(ShapeError::Unclassifiable { .. })
    ));
}

#[test]
fn host_and_unknown_types_fail() {
    let r = resolver();
    assert!(matches!(
        r.classify(TypeId::TEXT_BUFFER),
        Err(ShapeError::Unclassifiable { .. })
    ));
    assert!(matches!(
        r.classify(TypeId::VOID),
        Err(ShapeError::Unclassifiable { .. })
    ));
    assert_eq!(
        r.classify(TypeId::new(9_999)),
        Err(ShapeError::UnknownType(TypeId::new(9_999)))
    );
}

#[test]
fn shapes_are_memoized() {
    let r = resolver();
    let a = r.classify(TypeId::I32).unwrap();
    let b = r.classify(TypeId::I32).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(r.len(), 1);
}
