use pretty_assertions::assert_eq;
use reshape_types::{EvalError, MapRef, ObjectRef, ScalarKind, TypeId, Value};

use super::{compile, field, linked_node, Fixture};
use crate::{json_decoder, json_encoder, GenError};

#[test]
fn encodes_nested_records() {
    let fx = Fixture::new();
    let encode = compile(json_encoder(&fx.cx(), fx.person));

    assert_eq!(
        encode.call(fx.ann()).unwrap(),
        Value::string(r#"{"Name":"Ann","Age":30,"Home":{"City":"NYC"}}"#)
    );
    assert_eq!(
        encode.call(fx.person_of("Bo", 4, Value::Null)).unwrap(),
        Value::string(r#"{"Name":"Bo","Age":4,"Home":null}"#)
    );
    assert_eq!(encode.call(Value::Null).unwrap(), Value::string("null"));
}

#[test]
fn escapes_strings() {
    let fx = Fixture::new();
    let encode = compile(json_encoder(&fx.cx(), fx.address));

    let tricky = fx.address_of("a\"b\\c\nd");
    assert_eq!(
        encode.call(tricky).unwrap(),
        Value::string(r#"{"City":"a\"b\\c\nd"}"#)
    );
}

#[test]
fn empty_containers() {
    let fx = Fixture::new();
    let reg = fx.registry();
    let empty = reg.record("Empty").finish();
    let names = reg.array_of(TypeId::STRING);

    let encode = compile(json_encoder(&fx.cx(), empty));
    let instance = Value::Object(reshape_types::ObjectRef::new(empty, Vec::new()));
    assert_eq!(encode.call(instance).unwrap(), Value::string("{}"));

    let encode = compile(json_encoder(&fx.cx(), names));
    let array = Value::List(reshape_types::ListRef::new(names, Vec::new()));
    assert_eq!(encode.call(array).unwrap(), Value::string("[]"));
}

#[test]
fn encodes_lists_and_dictionaries() {
    let fx = Fixture::new();
    let reg = fx.registry();
    let scores = reg.dictionary_of(TypeId::STRING, TypeId::I32);
    let team = reg
        .record("Team")
        .property("Members", reg.list_of(TypeId::STRING))
        .property("Scores", scores)
        .finish();
    let encode = compile(json_encoder(&fx.cx(), team));

    let members = fx.list(TypeId::STRING, vec![Value::string("a"), Value::string("b")]);
    let map = MapRef::new(scores);
    map.insert(Value::string("x"), Value::I32(1));
    map.insert(Value::string("y"), Value::I32(-2));
    let value = Value::Object(reshape_types::ObjectRef::new(
        team,
        vec![members, Value::Map(map)],
    ));
    assert_eq!(
        encode.call(value).unwrap(),
        Value::string(r#"{"Members":["a","b"],"Scores":{"x":1,"y":-2}}"#)
    );
}

#[test]
fn quotes_chars_and_datetimes() {
    let fx = Fixture::new();
    let reg = fx.registry();
    let event = reg
        .record("Event")
        .property("Code", TypeId::CHAR)
        .property("Done", TypeId::BOOL)
        .property("Ratio", TypeId::F64)
        .finish();
    let encode = compile(json_encoder(&fx.cx(), event));

    let value = Value::Object(reshape_types::ObjectRef::new(
        event,
        vec![Value::Char('x'), Value::Bool(true), Value::F64(1.5)],
    ));
    assert_eq!(
        encode.call(value).unwrap(),
        Value::string(r#"{"Code":"x","Done":true,"Ratio":1.5}"#)
    );
}

#[test]
fn non_string_keys_fail_at_build_time() {
    let fx = Fixture::new();
    let by_id = fx.registry().dictionary_of(TypeId::I32, TypeId::STRING);

    let err = json_encoder(&fx.cx(), by_id).unwrap_err();
    assert_eq!(
        err,
        GenError::UnsupportedKeyType {
            dictionary: "Dictionary<I32, String>".to_owned(),
            key: "I32".to_owned(),
        }
    );
    assert!(matches!(
        json_decoder(&fx.cx(), by_id),
        Err(GenError::UnsupportedKeyType { .. })
    ));
}

#[test]
fn self_referential_records_hit_the_depth_limit() {
    let fx = Fixture::new();
    let node = linked_node(fx.registry());

    assert!(matches!(
        json_encoder(&fx.cx(), node),
        Err(GenError::DepthExceeded { max_depth: 16, .. })
    ));
}

#[test]
fn decodes_what_it_encodes() {
    let fx = Fixture::new();
    let encode = compile(json_encoder(&fx.cx(), fx.person));
    let decode = compile(json_decoder(&fx.cx(), fx.person));

    let text = encode.call(fx.ann()).unwrap();
    assert_eq!(decode.call(text).unwrap(), fx.ann());
}

#[test]
fn decoding_skips_unknown_properties_and_honors_null() {
    let fx = Fixture::new();
    let decode = compile(json_decoder(&fx.cx(), fx.person));

    let text = r#"{"Extra":[1,{"a":[]}],"Name":null,"Home":null,"Age":7,"More":"x"}"#;
    let person = decode.call(Value::string(text)).unwrap();
    assert_eq!(field(&person, 0), Value::Null);
    assert_eq!(field(&person, 1), Value::I32(7));
    assert_eq!(field(&person, 2), Value::Null);

    assert_eq!(decode.call(Value::string("null")).unwrap(), Value::Null);
}

#[test]
fn decoding_a_mismatched_container_leaves_the_default() {
    let fx = Fixture::new();
    let decode = compile(json_decoder(&fx.cx(), fx.person));

    let person = decode
        .call(Value::string(r#"{"Home":[1,2],"Age":3}"#))
        .unwrap();
    assert_eq!(field(&person, 1), Value::I32(3));
    assert_eq!(field(&person, 2), Value::Null);
}

#[test]
fn decodes_collections() {
    let fx = Fixture::new();
    let reg = fx.registry();
    let scores = reg.dictionary_of(TypeId::STRING, TypeId::I64);
    let addresses = reg.list_of(fx.address);

    let decode = compile(json_decoder(&fx.cx(), scores));
    let map = decode.call(Value::string(r#"{"a":1,"b":-5}"#)).unwrap();
    assert_eq!(
        map.as_map().unwrap().entries(),
        vec![
            (Value::string("a"), Value::I64(1)),
            (Value::string("b"), Value::I64(-5)),
        ]
    );

    let decode = compile(json_decoder(&fx.cx(), addresses));
    let list = decode
        .call(Value::string(r#"[{"City":"A"},null,{"City":"B"}]"#))
        .unwrap();
    assert_eq!(
        list.as_list().unwrap().items(),
        vec![fx.address_of("A"), Value::Null, fx.address_of("B")]
    );
    let empty = decode.call(Value::string("[]")).unwrap();
    assert!(empty.as_list().unwrap().is_empty());
}

#[test]
fn decoding_errors_are_per_call() {
    let fx = Fixture::new();
    let decode = compile(json_decoder(&fx.cx(), fx.person));

    assert!(matches!(
        decode.call(Value::string(r#"{"Age":"old"}"#)),
        Err(EvalError::Json { .. })
    ));
    assert!(matches!(
        decode.call(Value::string(r#"{"Age":1"#)),
        Err(EvalError::Json { .. })
    ));
    assert!(matches!(
        decode.call(Value::string(r#"{"Age":3000000000}"#)),
        Err(EvalError::InvalidConversion { .. })
    ));
    let person = decode.call(Value::string(r#"{"Age":1}"#)).unwrap();
    assert_eq!(field(&person, 1), Value::I32(1));
}

/// `Reading { Count: I32?, Ratio: F64? }`.
fn reading(fx: &Fixture) -> TypeId {
    fx.registry()
        .record("Reading")
        .property("Count", ScalarKind::I32.nullable_type_id())
        .property("Ratio", ScalarKind::F64.nullable_type_id())
        .finish()
}

#[test]
fn nullable_scalars_encode_null_or_their_literal() {
    let fx = Fixture::new();
    let ty = reading(&fx);
    let encode = compile(json_encoder(&fx.cx(), ty));

    let empty = Value::Object(ObjectRef::new(ty, vec![Value::Null, Value::Null]));
    assert_eq!(
        encode.call(empty).unwrap(),
        Value::string(r#"{"Count":null,"Ratio":null}"#)
    );
    let full = Value::Object(ObjectRef::new(ty, vec![Value::I32(-4), Value::F64(0.5)]));
    assert_eq!(
        encode.call(full).unwrap(),
        Value::string(r#"{"Count":-4,"Ratio":0.5}"#)
    );
}

#[test]
fn nullable_scalars_decode_null_as_null() {
    let fx = Fixture::new();
    let ty = reading(&fx);
    let decode = compile(json_decoder(&fx.cx(), ty));

    let value = decode
        .call(Value::string(r#"{"Count":null,"Ratio":2}"#))
        .unwrap();
    assert_eq!(field(&value, 0), Value::Null);
    assert_eq!(field(&value, 1), Value::F64(2.0));
    let value = decode.call(Value::string(r#"{"Count":9}"#)).unwrap();
    assert_eq!(field(&value, 0), Value::I32(9));
    assert_eq!(field(&value, 1), Value::Null);
}

#[test]
fn non_finite_floats_encode_as_null() {
    let fx = Fixture::new();
    let reg = fx.registry();
    let sample = reg
        .record("Sample")
        .property("Wide", TypeId::F64)
        .property("Narrow", TypeId::F32)
        .property("Maybe", ScalarKind::F64.nullable_type_id())
        .finish();
    let encode = compile(json_encoder(&fx.cx(), sample));
    let decode = compile(json_decoder(&fx.cx(), sample));

    let value = Value::Object(ObjectRef::new(
        sample,
        vec![
            Value::F64(f64::NAN),
            Value::F32(f32::NEG_INFINITY),
            Value::F64(f64::INFINITY),
        ],
    ));
    let text = encode.call(value).unwrap();
    assert_eq!(
        text,
        Value::string(r#"{"Wide":null,"Narrow":null,"Maybe":null}"#)
    );
    let back = decode.call(text).unwrap();
    assert_eq!(field(&back, 0), Value::F64(0.0));
    assert_eq!(field(&back, 1), Value::F32(0.0));
    assert_eq!(field(&back, 2), Value::Null);

    let finite = Value::Object(ObjectRef::new(
        sample,
        vec![Value::F64(-0.25), Value::F32(1.5), Value::F64(1e21)],
    ));
    assert_eq!(
        encode.call(finite).unwrap(),
        Value::string(r#"{"Wide":-0.25,"Narrow":1.5,"Maybe":1000000000000000000000}"#)
    );
}
