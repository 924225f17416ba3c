use super::*;
use pretty_assertions::assert_eq;

fn tokens(src: &str) -> Vec<JsonTokenType> {
    let mut reader = JsonReader::new(src);
    let mut out = Vec::new();
    while reader.read().unwrap() {
        out.push(reader.token_type());
    }
    out
}

#[test]
fn token_stream_for_nested_document() {
    use JsonTokenType::*;
    assert_eq!(
        tokens(r#"{"a":1,"b":[true,null],"c":{"d":"x"}}"#),
        vec![
            StartObject,
            PropertyName,
            Number,
            PropertyName,
            StartArray,
            True,
            Null,
            EndArray,
            PropertyName,
            StartObject,
            PropertyName,
            String,
            EndObject,
            EndObject,
        ]
    );
}

#[test]
fn empty_containers() {
    use JsonTokenType::*;
    assert_eq!(tokens("{}"), vec![StartObject, EndObject]);
    assert_eq!(tokens(" [ ] "), vec![StartArray, EndArray]);
}

#[test]
fn scalar_getters() {
    let mut reader = JsonReader::new(r#"[-12, 3.5, 18446744073709551615, false, "hé\n"]"#);
    reader.read().unwrap();
    reader.read().unwrap();
    assert_eq!(reader.get_i64().unwrap(), -12);
    reader.read().unwrap();
    assert_eq!(reader.get_f64().unwrap(), 3.5);
    assert!(reader.get_i64().is_err());
    reader.read().unwrap();
    assert_eq!(reader.get_u64().unwrap(), u64::MAX);
    reader.read().unwrap();
    assert_eq!(reader.get_bool().unwrap(), false);
    reader.read().unwrap();
    assert_eq!(reader.get_string().unwrap(), "hé\n");
}

#[test]
fn property_names_are_unescaped() {
    let mut reader = JsonReader::new(r#"{"a\"b":1}"#);
    reader.read().unwrap();
    reader.read().unwrap();
    assert_eq!(reader.token_type(), JsonTokenType::PropertyName);
    assert_eq!(reader.get_string().unwrap(), "a\"b");
}

#[test]
fn skip_property_with_container_value() {
    let mut reader = JsonReader::new(r#"{"x":{"y":[1,{"z":2}]},"w":3}"#);
    reader.read().unwrap();
    reader.read().unwrap();
    reader.skip().unwrap();
    assert_eq!(reader.token_type(), JsonTokenType::EndObject);
    reader.read().unwrap();
    assert_eq!(reader.get_string().unwrap(), "w");
    reader.read().unwrap();
    assert_eq!(reader.get_i64().unwrap(), 3);
}

#[test]
fn skip_scalar_property() {
    let mut reader = JsonReader::new(r#"{"x":"ignored","w":3}"#);
    reader.read().unwrap();
    reader.read().unwrap();
    reader.skip().unwrap();
    assert_eq!(reader.token_type(), JsonTokenType::String);
    reader.read().unwrap();
    assert_eq!(reader.get_string().unwrap(), "w");
}

#[test]
fn surrogate_pairs_decode() {
    let mut reader = JsonReader::new(r#""😀""#);
    reader.read().unwrap();
    assert_eq!(reader.get_string().unwrap(), "\u{1F600}");
}

fn read_all(src: &str) -> EvalResult<()> {
    let mut reader = JsonReader::new(src);
    while reader.read()? {}
    Ok(())
}

#[test]
fn malformed_documents_fail() {
    assert!(read_all("").is_err());
    assert!(read_all("{").is_err());
    assert!(read_all(r#"{"a" 1}"#).is_err());
    assert!(read_all("[1,]").is_err());
    assert!(read_all("[1 2]").is_err());
    assert!(read_all(r#"{"a":1,}"#).is_err());
    assert!(read_all("{} {}").is_err());
    assert!(read_all("[1}").is_err());
    assert!(read_all("@").is_err());
}

#[test]
fn errors_carry_offsets() {
    let err = read_all("[1, @]").unwrap_err();
    assert_eq!(
        err,
        crate::EvalError::Json {
            message: "unrecognized token".into(),
            offset: 4,
        }
    );
}

#[test]
fn getter_on_wrong_token_fails() {
    let mut reader = JsonReader::new("[1]");
    reader.read().unwrap();
    assert!(reader.get_string().is_err());
    assert!(reader.get_bool().is_err());
}
