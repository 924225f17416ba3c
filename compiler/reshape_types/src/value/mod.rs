//! Dynamic runtime values.
//!
//! Scalars are stored by value. Strings are shared immutable text. Records,
//! lists, dictionaries and host objects are shared references, so a shallow
//! copy aliases them and a deep copy does not.

mod heap;
mod parse;

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::{ScalarKind, TypeId};

pub use heap::{HostRef, ListRef, MapRef, ObjectRef};
pub use parse::{integer_value, parse_datetime, parse_scalar};

/// Default text form for datetimes (`ToString()` with no format argument).
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    DateTime(NaiveDateTime),
    Str(Arc<str>),
    Object(ObjectRef),
    List(ListRef),
    Map(MapRef),
    Host(HostRef),
}

impl Value {
    #[inline]
    pub fn string(s: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(s.as_ref()))
    }

    /// The zero value a freshly constructed field of type `ty` holds.
    pub fn default_for(ty: TypeId) -> Self {
        match ScalarKind::from_type_id(ty) {
            Some(ScalarKind::Bool) => Value::Bool(false),
            Some(ScalarKind::Char) => Value::Char('\0'),
            Some(ScalarKind::I8) => Value::I8(0),
            Some(ScalarKind::I16) => Value::I16(0),
            Some(ScalarKind::I32) => Value::I32(0),
            Some(ScalarKind::I64) => Value::I64(0),
            Some(ScalarKind::U8) => Value::U8(0),
            Some(ScalarKind::U16) => Value::U16(0),
            Some(ScalarKind::U32) => Value::U32(0),
            Some(ScalarKind::U64) => Value::U64(0),
            Some(ScalarKind::F32) => Value::F32(0.0),
            Some(ScalarKind::F64) => Value::F64(0.0),
            Some(ScalarKind::DateTime) => Value::DateTime(NaiveDateTime::default()),
            None => Value::Null,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Scalar kind carried by this value, if it is a scalar.
    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        Some(match self {
            Value::Bool(_) => ScalarKind::Bool,
            Value::Char(_) => ScalarKind::Char,
            Value::I8(_) => ScalarKind::I8,
            Value::I16(_) => ScalarKind::I16,
            Value::I32(_) => ScalarKind::I32,
            Value::I64(_) => ScalarKind::I64,
            Value::U8(_) => ScalarKind::U8,
            Value::U16(_) => ScalarKind::U16,
            Value::U32(_) => ScalarKind::U32,
            Value::U64(_) => ScalarKind::U64,
            Value::F32(_) => ScalarKind::F32,
            Value::F64(_) => ScalarKind::F64,
            Value::DateTime(_) => ScalarKind::DateTime,
            _ => return None,
        })
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Str(_) => "String",
            Value::Object(_) => "Object",
            Value::List(_) => "List",
            Value::Map(_) => "Dictionary",
            Value::Host(_) => "Host",
            scalar => scalar.scalar_kind().map_or("unknown", ScalarKind::name),
        }
    }

    /// Integer payload widened to `i64`. `U64` values above `i64::MAX` yield `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(v) => Some(i64::from(v)),
            Value::I16(v) => Some(i64::from(v)),
            Value::I32(v) => Some(i64::from(v)),
            Value::I64(v) => Some(v),
            Value::U8(v) => Some(i64::from(v)),
            Value::U16(v) => Some(i64::from(v)),
            Value::U32(v) => Some(i64::from(v)),
            Value::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_host(&self) -> Option<&HostRef> {
        match self {
            Value::Host(h) => Some(h),
            _ => None,
        }
    }

    /// Reference identity. Two nulls are the same (absent) reference;
    /// scalars and strings never are.
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
            (Value::Host(a), Value::Host(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Text form (`ToString()` semantics).
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Char(c) => c.to_string(),
            Value::I8(v) => v.to_string(),
            Value::I16(v) => v.to_string(),
            Value::I32(v) => v.to_string(),
            Value::I64(v) => v.to_string(),
            Value::U8(v) => v.to_string(),
            Value::U16(v) => v.to_string(),
            Value::U32(v) => v.to_string(),
            Value::U64(v) => v.to_string(),
            Value::F32(v) => v.to_string(),
            Value::F64(v) => v.to_string(),
            Value::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
            Value::Str(s) => s.to_string(),
            Value::Object(o) => format!("Object({})", o.ty()),
            Value::List(l) => format!("List({})", l.ty()),
            Value::Map(m) => format!("Dictionary({})", m.ty()),
            Value::Host(h) => h.with(|host| host.kind_name().to_owned()),
        }
    }
}

impl PartialEq for Value {
    /// Structural equality: records, lists and dictionaries compare by content.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                a.ptr_eq(b) || (a.ty() == b.ty() && a.fields() == b.fields())
            }
            (Value::List(a), Value::List(b)) => a.ptr_eq(b) || a.items() == b.items(),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b) || a.entries() == b.entries(),
            (Value::Host(a), Value::Host(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    /// Literal view used by IR dumps: strings and chars are quoted.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Char(c) => write!(f, "{c:?}"),
            other => write!(f, "{}", other.to_text()),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(Arc::from(v))
    }
}
