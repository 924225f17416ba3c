//! Interned type identifiers.

use std::fmt;

use crate::ScalarKind;

/// Interned type identifier.
///
/// Builtin types have known indices (0-30): the scalars and their nullable
/// forms, strings, the top type and the host objects. Records, generic
/// instantiations and custom collections are registered on first use.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[repr(transparent)]
pub struct TypeId(u32);

impl TypeId {
    pub const VOID: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const CHAR: TypeId = TypeId(2);
    pub const I8: TypeId = TypeId(3);
    pub const I16: TypeId = TypeId(4);
    pub const I32: TypeId = TypeId(5);
    pub const I64: TypeId = TypeId(6);
    pub const U8: TypeId = TypeId(7);
    pub const U16: TypeId = TypeId(8);
    pub const U32: TypeId = TypeId(9);
    pub const U64: TypeId = TypeId(10);
    pub const F32: TypeId = TypeId(11);
    pub const F64: TypeId = TypeId(12);
    pub const DATETIME: TypeId = TypeId(13);
    pub const STRING: TypeId = TypeId(14);
    /// Top type. Accepts any value; used for untyped nulls.
    pub const OBJECT: TypeId = TypeId(15);
    pub const TEXT_BUFFER: TypeId = TypeId(16);
    pub const JSON_READER: TypeId = TypeId(17);

    /// First nullable scalar; the rest follow in `ScalarKind::ALL` order.
    pub(crate) const NULLABLE_BASE: u32 = 18;

    /// First index handed out to registered types.
    pub const FIRST_REGISTERED: u32 = 31;

    #[inline]
    pub const fn new(index: u32) -> Self {
        TypeId(index)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn is_builtin(self) -> bool {
        self.0 < Self::FIRST_REGISTERED
    }
}

impl fmt::Debug for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::VOID => write!(f, "TypeId::VOID"),
            Self::BOOL => write!(f, "TypeId::BOOL"),
            Self::CHAR => write!(f, "TypeId::CHAR"),
            Self::I8 => write!(f, "TypeId::I8"),
            Self::I16 => write!(f, "TypeId::I16"),
            Self::I32 => write!(f, "TypeId::I32"),
            Self::I64 => write!(f, "TypeId::I64"),
            Self::U8 => write!(f, "TypeId::U8"),
            Self::U16 => write!(f, "TypeId::U16"),
            Self::U32 => write!(f, "TypeId::U32"),
            Self::U64 => write!(f, "TypeId::U64"),
            Self::F32 => write!(f, "TypeId::F32"),
            Self::F64 => write!(f, "TypeId::F64"),
            Self::DATETIME => write!(f, "TypeId::DATETIME"),
            Self::STRING => write!(f, "TypeId::STRING"),
            Self::OBJECT => write!(f, "TypeId::OBJECT"),
            Self::TEXT_BUFFER => write!(f, "TypeId::TEXT_BUFFER"),
            Self::JSON_READER => write!(f, "TypeId::JSON_READER"),
            _ => match ScalarKind::from_nullable_type_id(*self) {
                Some(kind) => write!(f, "TypeId::nullable({})", kind.name()),
                None => write!(f, "TypeId({})", self.0),
            },
        }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
