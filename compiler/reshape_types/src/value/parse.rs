//! Scalars from text.

use chrono::{NaiveDate, NaiveDateTime};

use super::{Value, DATETIME_FORMAT};
use crate::errors::{invalid_conversion, EvalResult};
use crate::ScalarKind;

/// Parse a datetime in the default text form, with a space separator, or
/// as a bare date (midnight).
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse `text` as a `kind` scalar. Surrounding whitespace is ignored
/// except for `Char`, which must be exactly one character.
pub fn parse_scalar(text: &str, kind: ScalarKind) -> EvalResult {
    let fail = || invalid_conversion(format!("{text:?}"), kind.name());
    let t = text.trim();
    match kind {
        ScalarKind::Bool => match t.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(fail()),
        },
        ScalarKind::Char => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Char(c)),
                _ => Err(fail()),
            }
        }
        ScalarKind::DateTime => parse_datetime(t).map(Value::DateTime).ok_or_else(fail),
        ScalarKind::F32 => t.parse().map(Value::F32).map_err(|_| fail()),
        ScalarKind::F64 => t.parse().map(Value::F64).map_err(|_| fail()),
        _ => {
            let n: i128 = t.parse().map_err(|_| fail())?;
            integer_value(n, kind).ok_or_else(fail)
        }
    }
}

/// `n` as an integer (or `Char` code point) of `kind`, if it fits.
pub fn integer_value(n: i128, kind: ScalarKind) -> Option<Value> {
    match kind {
        ScalarKind::I8 => i8::try_from(n).ok().map(Value::I8),
        ScalarKind::I16 => i16::try_from(n).ok().map(Value::I16),
        ScalarKind::I32 => i32::try_from(n).ok().map(Value::I32),
        ScalarKind::I64 => i64::try_from(n).ok().map(Value::I64),
        ScalarKind::U8 => u8::try_from(n).ok().map(Value::U8),
        ScalarKind::U16 => u16::try_from(n).ok().map(Value::U16),
        ScalarKind::U32 => u32::try_from(n).ok().map(Value::U32),
        ScalarKind::U64 => u64::try_from(n).ok().map(Value::U64),
        ScalarKind::Char => u32::try_from(n).ok().and_then(char::from_u32).map(Value::Char),
        _ => None,
    }
}
