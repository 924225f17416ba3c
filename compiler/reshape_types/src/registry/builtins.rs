//! Builtin type definitions and their native methods.

use chrono::format::{Item, StrftimeItems};

use super::{CtorDef, MethodDef, NativeFn, ParamDef, Receiver, TypeDef, TypeKind};
use crate::errors::{invalid_conversion, null_reference, type_mismatch, EvalError, EvalResult};
use crate::host::{HostObject, JsonReader, TextBuffer};
use crate::value::{parse_scalar, HostRef, ListRef, MapRef, DATETIME_FORMAT};
use crate::{ScalarKind, TypeId, Value};

fn method(name: &str, params: Vec<ParamDef>, ret: TypeId, imp: NativeFn) -> MethodDef {
    MethodDef {
        name: name.to_owned(),
        receiver: Receiver::Instance,
        params,
        ret,
        imp,
    }
}

fn params(list: &[(&str, TypeId)]) -> Vec<ParamDef> {
    list.iter().map(|&(name, ty)| ParamDef::new(name, ty)).collect()
}

fn static_method(name: &str, params: Vec<ParamDef>, ret: TypeId, imp: NativeFn) -> MethodDef {
    MethodDef {
        receiver: Receiver::Static,
        ..method(name, params, ret, imp)
    }
}

/// Builtin definitions in `TypeId` order.
pub(super) fn builtin_types() -> Vec<TypeDef> {
    let mut defs = vec![TypeDef::new(TypeId::VOID, "Void", TypeKind::Void)];

    for kind in ScalarKind::ALL {
        let mut def = TypeDef::new(kind.type_id(), kind.name(), TypeKind::Scalar(kind));
        def.methods.push(match kind {
            ScalarKind::DateTime => method(
                "ToString",
                vec![ParamDef::new("format", TypeId::STRING)
                    .with_default(Value::string(DATETIME_FORMAT))],
                TypeId::STRING,
                datetime_to_string,
            ),
            _ => method("ToString", vec![], TypeId::STRING, to_string),
        });
        if matches!(kind, ScalarKind::DateTime | ScalarKind::Char) {
            let text = params(&[("text", TypeId::STRING)]);
            def.methods.push(static_method("Parse", text, kind.type_id(), scalar_parse));
        }
        defs.push(def);
    }

    let mut string = TypeDef::new(TypeId::STRING, "String", TypeKind::String);
    string.methods = vec![
        method("ToString", vec![], TypeId::STRING, to_string),
        method("Length", vec![], TypeId::I32, string_length),
    ];
    defs.push(string);

    let mut object = TypeDef::new(TypeId::OBJECT, "Object", TypeKind::Object);
    object.methods = vec![method("ToString", vec![], TypeId::STRING, to_string)];
    defs.push(object);

    defs.push(text_buffer_type());
    defs.push(json_reader_type());

    // Nullable scalars carry no methods; generators convert a non-null
    // value to its scalar before calling anything on it.
    defs.extend(ScalarKind::ALL.into_iter().map(|kind| {
        TypeDef::new(
            kind.nullable_type_id(),
            format!("{}?", kind.name()),
            TypeKind::Nullable(kind),
        )
    }));
    defs
}

fn text_buffer_type() -> TypeDef {
    let mut def = TypeDef::new(TypeId::TEXT_BUFFER, "TextBuffer", TypeKind::Host);
    def.ctor = Some(CtorDef {
        params: vec![],
        imp: buffer_new,
    });
    let value = |ty: TypeId| params(&[("value", ty)]);
    def.methods = vec![
        method("Append", value(TypeId::STRING), TypeId::VOID, buffer_append),
        method("Append", value(TypeId::CHAR), TypeId::VOID, buffer_append),
        method("AppendJsonString", value(TypeId::STRING), TypeId::VOID, buffer_append_json_string),
        method("AppendJsonNumber", value(TypeId::F32), TypeId::VOID, buffer_append_json_number),
        method("AppendJsonNumber", value(TypeId::F64), TypeId::VOID, buffer_append_json_number),
        method(
            "Remove",
            params(&[("start", TypeId::I32), ("count", TypeId::I32)]),
            TypeId::VOID,
            buffer_remove,
        ),
        method("Length", vec![], TypeId::I32, buffer_length),
        method("ToString", vec![], TypeId::STRING, buffer_to_string),
    ];
    def
}

fn json_reader_type() -> TypeDef {
    let mut def = TypeDef::new(TypeId::JSON_READER, "JsonReader", TypeKind::Host);
    def.ctor = Some(CtorDef {
        params: params(&[("json", TypeId::STRING)]),
        imp: reader_new,
    });
    def.methods = vec![
        method("Read", vec![], TypeId::BOOL, reader_read),
        method("TokenType", vec![], TypeId::I32, reader_token_type),
        method("GetString", vec![], TypeId::STRING, reader_get_string),
        method("GetInt64", vec![], TypeId::I64, reader_get_i64),
        method("GetUInt64", vec![], TypeId::U64, reader_get_u64),
        method("GetDouble", vec![], TypeId::F64, reader_get_f64),
        method("GetBoolean", vec![], TypeId::BOOL, reader_get_bool),
        method("Skip", vec![], TypeId::VOID, reader_skip),
    ];
    def
}

/// Methods shared by lists, arrays and element collections.
pub(super) fn sequence_methods(element: TypeId) -> Vec<MethodDef> {
    let index = ("index", TypeId::I32);
    vec![
        method("Add", params(&[("item", element)]), TypeId::VOID, list_add),
        method("Count", vec![], TypeId::I32, list_count),
        method("get_Item", params(&[index]), element, list_get_item),
        method("set_Item", params(&[index, ("value", element)]), TypeId::VOID, list_set_item),
        method("RemoveAt", params(&[index]), TypeId::VOID, list_remove_at),
    ]
}

pub(super) fn dictionary_methods(key: TypeId, value: TypeId, keys: TypeId) -> Vec<MethodDef> {
    let key = ("key", key);
    vec![
        method("Count", vec![], TypeId::I32, map_count),
        method("Keys", vec![], keys, map_keys),
        method("get_Item", params(&[key]), value, map_get_item),
        method("set_Item", params(&[key, ("value", value)]), TypeId::VOID, map_set_item),
        method("ContainsKey", params(&[key]), TypeId::BOOL, map_contains_key),
    ]
}

// Argument helpers

fn arg(args: &[Value], index: usize) -> EvalResult<&Value> {
    args.get(index)
        .ok_or_else(|| type_mismatch(format!("argument {index}"), "nothing"))
}

fn receiver<'a>(args: &'a [Value], action: &str) -> EvalResult<&'a Value> {
    match arg(args, 0)? {
        Value::Null => Err(null_reference(action)),
        value => Ok(value),
    }
}

fn int_arg(args: &[Value], index: usize) -> EvalResult<i64> {
    let value = arg(args, index)?;
    value
        .as_i64()
        .ok_or_else(|| type_mismatch("integer", value.type_name()))
}

fn str_arg(args: &[Value], index: usize, action: &str) -> EvalResult<String> {
    match arg(args, index)? {
        Value::Str(s) => Ok(s.to_string()),
        Value::Null => Err(null_reference(action)),
        other => Err(type_mismatch("String", other.type_name())),
    }
}

fn count(len: usize) -> EvalResult {
    i32::try_from(len)
        .map(Value::I32)
        .map_err(|_| EvalError::IntegerOverflow { operation: "Count" })
}

// Scalars and strings

fn to_string(args: &[Value], _: TypeId) -> EvalResult {
    Ok(Value::string(receiver(args, "call ToString on null")?.to_text()))
}

fn string_length(args: &[Value], _: TypeId) -> EvalResult {
    match receiver(args, "read Length of null")? {
        Value::Str(s) => count(s.chars().count()),
        other => Err(type_mismatch("String", other.type_name())),
    }
}

fn datetime_to_string(args: &[Value], _: TypeId) -> EvalResult {
    let Value::DateTime(dt) = receiver(args, "call ToString on null")? else {
        return Err(type_mismatch("DateTime", arg(args, 0)?.type_name()));
    };
    let format = str_arg(args, 1, "format with a null pattern")?;
    if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid_conversion(format, "datetime format"));
    }
    Ok(Value::string(dt.format(&format).to_string()))
}

fn scalar_parse(args: &[Value], ret: TypeId) -> EvalResult {
    let kind =
        ScalarKind::from_type_id(ret).ok_or_else(|| type_mismatch("scalar", ret.to_string()))?;
    let text = str_arg(args, 0, "parse null text")?;
    parse_scalar(&text, kind)
}

// Text buffer

fn with_buffer<R>(
    args: &[Value],
    action: &str,
    f: impl FnOnce(&mut TextBuffer) -> EvalResult<R>,
) -> EvalResult<R> {
    let value = receiver(args, action)?;
    let host = value
        .as_host()
        .ok_or_else(|| type_mismatch("TextBuffer", value.type_name()))?;
    host.with(|object| match object {
        HostObject::TextBuffer(buffer) => f(buffer),
        other => Err(type_mismatch("TextBuffer", other.kind_name())),
    })
}

fn buffer_new(_: &[Value], _: TypeId) -> EvalResult {
    Ok(Value::Host(HostRef::new(HostObject::TextBuffer(
        TextBuffer::new(),
    ))))
}

fn buffer_append(args: &[Value], _: TypeId) -> EvalResult {
    let text = match arg(args, 1)? {
        Value::Null => String::new(),
        Value::Str(s) => s.to_string(),
        Value::Char(c) => c.to_string(),
        other => return Err(type_mismatch("String or Char", other.type_name())),
    };
    with_buffer(args, "append to a null buffer", |buf| {
        buf.append(&text);
        Ok(Value::Null)
    })
}

fn buffer_append_json_string(args: &[Value], _: TypeId) -> EvalResult {
    let text = match arg(args, 1)? {
        Value::Null => None,
        Value::Str(s) => Some(s.clone()),
        other => return Err(type_mismatch("String", other.type_name())),
    };
    with_buffer(args, "append to a null buffer", |buf| {
        match text {
            Some(s) => buf.append_json_string(&s),
            None => buf.append("null"),
        }
        Ok(Value::Null)
    })
}

fn buffer_append_json_number(args: &[Value], _: TypeId) -> EvalResult {
    let value = arg(args, 1)?;
    let finite = match *value {
        Value::F32(v) => v.is_finite(),
        Value::F64(v) => v.is_finite(),
        ref other => return Err(type_mismatch("F32 or F64", other.type_name())),
    };
    let text = if finite {
        value.to_text()
    } else {
        "null".to_owned()
    };
    with_buffer(args, "append to a null buffer", |buf| {
        buf.append(&text);
        Ok(Value::Null)
    })
}

fn buffer_remove(args: &[Value], _: TypeId) -> EvalResult {
    let (start, len) = (int_arg(args, 1)?, int_arg(args, 2)?);
    with_buffer(args, "remove from a null buffer", |buf| {
        let out_of_range = || EvalError::IndexOutOfRange {
            index: start,
            len: buf.len(),
        };
        let start = usize::try_from(start).map_err(|_| out_of_range())?;
        let len = usize::try_from(len).map_err(|_| out_of_range())?;
        buf.remove(start, len)?;
        Ok(Value::Null)
    })
}

fn buffer_length(args: &[Value], _: TypeId) -> EvalResult {
    with_buffer(args, "read Length of a null buffer", |buf| count(buf.len()))
}

fn buffer_to_string(args: &[Value], _: TypeId) -> EvalResult {
    with_buffer(args, "call ToString on a null buffer", |buf| {
        Ok(Value::string(buf.as_str()))
    })
}

// JSON reader

fn with_reader<R>(
    args: &[Value],
    f: impl FnOnce(&mut JsonReader) -> EvalResult<R>,
) -> EvalResult<R> {
    let value = receiver(args, "read from a null JSON reader")?;
    let host = value
        .as_host()
        .ok_or_else(|| type_mismatch("JsonReader", value.type_name()))?;
    host.with(|object| match object {
        HostObject::JsonReader(reader) => f(reader),
        other => Err(type_mismatch("JsonReader", other.kind_name())),
    })
}

fn reader_new(args: &[Value], _: TypeId) -> EvalResult {
    let json = str_arg(args, 0, "read null JSON text")?;
    Ok(Value::Host(HostRef::new(HostObject::JsonReader(
        JsonReader::new(json),
    ))))
}

fn reader_read(args: &[Value], _: TypeId) -> EvalResult {
    with_reader(args, |r| r.read().map(Value::Bool))
}

fn reader_token_type(args: &[Value], _: TypeId) -> EvalResult {
    with_reader(args, |r| Ok(Value::I32(r.token_type().code())))
}

fn reader_get_string(args: &[Value], _: TypeId) -> EvalResult {
    with_reader(args, |r| r.get_string().map(Value::from))
}

fn reader_get_i64(args: &[Value], _: TypeId) -> EvalResult {
    with_reader(args, |r| r.get_i64().map(Value::I64))
}

fn reader_get_u64(args: &[Value], _: TypeId) -> EvalResult {
    with_reader(args, |r| r.get_u64().map(Value::U64))
}

fn reader_get_f64(args: &[Value], _: TypeId) -> EvalResult {
    with_reader(args, |r| r.get_f64().map(Value::F64))
}

fn reader_get_bool(args: &[Value], _: TypeId) -> EvalResult {
    with_reader(args, |r| r.get_bool().map(Value::Bool))
}

fn reader_skip(args: &[Value], _: TypeId) -> EvalResult {
    with_reader(args, |r| r.skip().map(|()| Value::Null))
}

// Lists and dictionaries

fn list_receiver<'a>(args: &'a [Value], action: &str) -> EvalResult<&'a ListRef> {
    let value = receiver(args, action)?;
    value
        .as_list()
        .ok_or_else(|| type_mismatch("List", value.type_name()))
}

fn list_add(args: &[Value], _: TypeId) -> EvalResult {
    let list = list_receiver(args, "call Add on a null list")?;
    list.push(arg(args, 1)?.clone());
    Ok(Value::Null)
}

fn list_count(args: &[Value], _: TypeId) -> EvalResult {
    count(list_receiver(args, "read Count of a null list")?.len())
}

fn list_get_item(args: &[Value], _: TypeId) -> EvalResult {
    list_receiver(args, "index a null list")?.get(int_arg(args, 1)?)
}

fn list_set_item(args: &[Value], _: TypeId) -> EvalResult {
    let list = list_receiver(args, "index a null list")?;
    list.set(int_arg(args, 1)?, arg(args, 2)?.clone())?;
    Ok(Value::Null)
}

fn list_remove_at(args: &[Value], _: TypeId) -> EvalResult {
    list_receiver(args, "call RemoveAt on a null list")?.remove_at(int_arg(args, 1)?)?;
    Ok(Value::Null)
}

fn map_receiver<'a>(args: &'a [Value], action: &str) -> EvalResult<&'a MapRef> {
    let value = receiver(args, action)?;
    value
        .as_map()
        .ok_or_else(|| type_mismatch("Dictionary", value.type_name()))
}

fn map_count(args: &[Value], _: TypeId) -> EvalResult {
    count(map_receiver(args, "read Count of a null dictionary")?.len())
}

fn map_keys(args: &[Value], ret: TypeId) -> EvalResult {
    let map = map_receiver(args, "read Keys of a null dictionary")?;
    Ok(Value::List(ListRef::new(ret, map.keys())))
}

fn map_get_item(args: &[Value], _: TypeId) -> EvalResult {
    map_receiver(args, "index a null dictionary")?.get(arg(args, 1)?)
}

fn map_set_item(args: &[Value], _: TypeId) -> EvalResult {
    let map = map_receiver(args, "index a null dictionary")?;
    let key = arg(args, 1)?;
    if key.is_null() {
        return Err(null_reference("use a null dictionary key"));
    }
    map.insert(key.clone(), arg(args, 2)?.clone());
    Ok(Value::Null)
}

fn map_contains_key(args: &[Value], _: TypeId) -> EvalResult {
    let map = map_receiver(args, "call ContainsKey on a null dictionary")?;
    Ok(Value::Bool(map.contains_key(arg(args, 1)?)))
}
