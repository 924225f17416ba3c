//! Runtime conversions between builtin types.
//!
//! Supported: numeric to numeric (checked), char to and from integers, any
//! scalar to string, string to any scalar (parsed), and casts to and from
//! the top type. A nullable scalar converts like its scalar, with null
//! passing through to a nullable or string target. `supported` is the
//! lowering-time check; `convert` performs the conversion on a value.

use reshape_types::{
    integer_value, invalid_conversion, null_reference, parse_scalar, type_mismatch, EvalResult,
    ScalarKind, TypeId, Value,
};

/// Whether `from` converts to `to`.
pub fn supported(from: TypeId, to: TypeId) -> bool {
    if from == to || from == TypeId::OBJECT || to == TypeId::OBJECT {
        return true;
    }
    let (fk, tk) = (ScalarKind::underlying(from), ScalarKind::underlying(to));
    if fk.is_some() && fk == tk {
        return true;
    }
    match (fk, tk) {
        (Some(_), None) => to == TypeId::STRING,
        (None, Some(_)) => from == TypeId::STRING,
        (Some(f), Some(t)) => {
            (f.is_numeric() && t.is_numeric())
                || (f == ScalarKind::Char && t.is_integer())
                || (f.is_integer() && t == ScalarKind::Char)
        }
        (None, None) => false,
    }
}

/// Convert `value` to `target`. The pair must satisfy [`supported`] for the
/// static types involved.
pub fn convert(value: Value, target: TypeId) -> EvalResult {
    if target == TypeId::OBJECT {
        return Ok(value);
    }
    if target == TypeId::STRING {
        return match value {
            Value::Null | Value::Str(_) => Ok(value),
            v if v.scalar_kind().is_some() => Ok(Value::string(v.to_text())),
            v => Err(type_mismatch("String", v.type_name())),
        };
    }
    if let Some(kind) = ScalarKind::from_nullable_type_id(target) {
        return match value {
            Value::Null => Ok(value),
            v => convert(v, kind.type_id()),
        };
    }
    let Some(kind) = ScalarKind::from_type_id(target) else {
        return downcast(value, target);
    };
    if value.scalar_kind() == Some(kind) {
        return Ok(value);
    }
    match &value {
        Value::Null => Err(null_reference(format!("convert null to {}", kind.name()))),
        Value::Str(s) => parse_scalar(s, kind),
        Value::Char(c) if kind.is_integer() => from_i128(i128::from(u32::from(*c)), kind, &value),
        _ if kind == ScalarKind::Char => match value.as_i64() {
            Some(n) => from_i128(i128::from(n), kind, &value),
            None => Err(invalid_conversion(value.to_text(), "Char")),
        },
        _ => numeric(&value, kind),
    }
}

/// Reference-typed target reached from the top type: the runtime type must
/// match exactly. Null passes through.
fn downcast(value: Value, target: TypeId) -> EvalResult {
    let actual = match &value {
        Value::Null => return Ok(value),
        Value::Object(o) => o.ty(),
        Value::List(l) => l.ty(),
        Value::Map(m) => m.ty(),
        other => return Err(type_mismatch(target.to_string(), other.type_name())),
    };
    if actual == target {
        Ok(value)
    } else {
        Err(type_mismatch(target.to_string(), actual.to_string()))
    }
}

/// Numeric to numeric. Floats truncate toward zero when the target is an
/// integer; out-of-range results are errors.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "ranges are checked before narrowing"
)]
fn numeric(value: &Value, kind: ScalarKind) -> EvalResult {
    let float = match *value {
        Value::F32(v) => Some(f64::from(v)),
        Value::F64(v) => Some(v),
        _ => None,
    };
    if let Some(f) = float {
        return match kind {
            ScalarKind::F64 => Ok(Value::F64(f)),
            ScalarKind::F32 => {
                let narrowed = f as f32;
                if f.is_finite() && narrowed.is_infinite() {
                    Err(invalid_conversion(value.to_text(), kind.name()))
                } else {
                    Ok(Value::F32(narrowed))
                }
            }
            _ => {
                let t = f.trunc();
                // Integer targets span at most [i64::MIN, 2^64).
                if !t.is_finite() || t < i64::MIN as f64 || t >= u64::MAX as f64 {
                    return Err(invalid_conversion(value.to_text(), kind.name()));
                }
                from_i128(t as i128, kind, value)
            }
        };
    }
    let n: i128 = match *value {
        Value::U64(v) => i128::from(v),
        ref other => match other.as_i64() {
            Some(v) => i128::from(v),
            None => return Err(type_mismatch("numeric", other.type_name())),
        },
    };
    match kind {
        ScalarKind::F32 => Ok(Value::F32(n as f32)),
        ScalarKind::F64 => Ok(Value::F64(n as f64)),
        _ => from_i128(n, kind, value),
    }
}

fn from_i128(n: i128, kind: ScalarKind, original: &Value) -> EvalResult {
    integer_value(n, kind).ok_or_else(|| invalid_conversion(original.to_text(), kind.name()))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reshape_types::{EvalError, ObjectRef};

    #[test]
    fn support_matrix() {
        assert!(supported(TypeId::I32, TypeId::I64));
        assert!(supported(TypeId::F64, TypeId::U8));
        assert!(supported(TypeId::CHAR, TypeId::I32));
        assert!(supported(TypeId::DATETIME, TypeId::STRING));
        assert!(supported(TypeId::STRING, TypeId::DATETIME));
        assert!(!supported(TypeId::BOOL, TypeId::I32));
        assert!(!supported(TypeId::DATETIME, TypeId::I64));
        assert!(!supported(TypeId::new(40), TypeId::STRING));
        let (i32_or_null, i64_or_null) = (
            ScalarKind::I32.nullable_type_id(),
            ScalarKind::I64.nullable_type_id(),
        );
        assert!(supported(TypeId::I32, i32_or_null));
        assert!(supported(i32_or_null, TypeId::I32));
        assert!(supported(i32_or_null, i64_or_null));
        assert!(supported(TypeId::STRING, i32_or_null));
        assert!(supported(i32_or_null, TypeId::STRING));
        assert!(!supported(ScalarKind::Bool.nullable_type_id(), TypeId::I32));
    }

    #[test]
    fn nullable_scalars_pass_null_through() {
        let i32_or_null = ScalarKind::I32.nullable_type_id();
        assert_eq!(convert(Value::Null, i32_or_null), Ok(Value::Null));
        assert_eq!(convert(Value::I64(7), i32_or_null), Ok(Value::I32(7)));
        assert_eq!(convert(Value::I32(7), TypeId::I32), Ok(Value::I32(7)));
        assert!(matches!(
            convert(Value::Null, TypeId::I32),
            Err(EvalError::NullReference { .. })
        ));
        assert!(convert(Value::I64(i64::MAX), i32_or_null).is_err());
    }

    #[test]
    fn numeric_conversions_are_checked() {
        assert_eq!(convert(Value::I32(300), TypeId::I64), Ok(Value::I64(300)));
        assert_eq!(
            convert(Value::I32(300), TypeId::U8),
            Err(EvalError::InvalidConversion {
                value: "300".into(),
                target: "U8".into()
            })
        );
        assert_eq!(convert(Value::F64(-2.9), TypeId::I16), Ok(Value::I16(-2)));
        assert!(convert(Value::F64(f64::NAN), TypeId::I32).is_err());
        assert_eq!(convert(Value::U64(u64::MAX), TypeId::F64), Ok(Value::F64(u64::MAX as f64)));
    }

    #[test]
    fn chars_and_integers() {
        assert_eq!(convert(Value::Char('A'), TypeId::I32), Ok(Value::I32(65)));
        assert_eq!(convert(Value::I64(97), TypeId::CHAR), Ok(Value::Char('a')));
        assert!(convert(Value::I32(-1), TypeId::CHAR).is_err());
    }

    #[test]
    fn text_round_trips() {
        assert_eq!(convert(Value::I32(42), TypeId::STRING), Ok(Value::string("42")));
        assert_eq!(convert(Value::string(" 42 "), TypeId::I32), Ok(Value::I32(42)));
        assert_eq!(convert(Value::string("True"), TypeId::BOOL), Ok(Value::Bool(true)));
        assert_eq!(convert(Value::string("x"), TypeId::CHAR), Ok(Value::Char('x')));
        assert!(convert(Value::string("xy"), TypeId::CHAR).is_err());
        let dt = convert(Value::string("2024-02-29T10:30:00"), TypeId::DATETIME).unwrap();
        assert_eq!(dt.to_text(), "2024-02-29T10:30:00");
        assert_eq!(convert(Value::Null, TypeId::STRING), Ok(Value::Null));
        assert!(matches!(
            convert(Value::Null, TypeId::I32),
            Err(EvalError::NullReference { .. })
        ));
    }

    #[test]
    fn top_type_casts() {
        let record = TypeId::new(40);
        let obj = Value::Object(ObjectRef::new(record, vec![]));
        assert_eq!(convert(obj.clone(), TypeId::OBJECT), Ok(obj.clone()));
        assert_eq!(convert(obj.clone(), record), Ok(obj.clone()));
        assert!(convert(obj, TypeId::new(41)).is_err());
        assert_eq!(convert(Value::Null, record), Ok(Value::Null));
    }
}
