//! Scalar (by-value) kinds.

use crate::TypeId;

/// Kind of a by-value scalar type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    DateTime,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 13] = [
        ScalarKind::Bool,
        ScalarKind::Char,
        ScalarKind::I8,
        ScalarKind::I16,
        ScalarKind::I32,
        ScalarKind::I64,
        ScalarKind::U8,
        ScalarKind::U16,
        ScalarKind::U32,
        ScalarKind::U64,
        ScalarKind::F32,
        ScalarKind::F64,
        ScalarKind::DateTime,
    ];

    pub const fn type_id(self) -> TypeId {
        match self {
            ScalarKind::Bool => TypeId::BOOL,
            ScalarKind::Char => TypeId::CHAR,
            ScalarKind::I8 => TypeId::I8,
            ScalarKind::I16 => TypeId::I16,
            ScalarKind::I32 => TypeId::I32,
            ScalarKind::I64 => TypeId::I64,
            ScalarKind::U8 => TypeId::U8,
            ScalarKind::U16 => TypeId::U16,
            ScalarKind::U32 => TypeId::U32,
            ScalarKind::U64 => TypeId::U64,
            ScalarKind::F32 => TypeId::F32,
            ScalarKind::F64 => TypeId::F64,
            ScalarKind::DateTime => TypeId::DATETIME,
        }
    }

    pub fn from_type_id(ty: TypeId) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.type_id() == ty)
    }

    /// The nullable form of this scalar (`I32?`): either a value of the
    /// scalar or null.
    #[inline]
    pub const fn nullable_type_id(self) -> TypeId {
        TypeId::new(TypeId::NULLABLE_BASE + self as u32)
    }

    pub fn from_nullable_type_id(ty: TypeId) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.nullable_type_id() == ty)
    }

    /// The scalar carried by `ty`, nullable or not.
    pub fn underlying(ty: TypeId) -> Option<Self> {
        Self::from_type_id(ty).or_else(|| Self::from_nullable_type_id(ty))
    }

    pub const fn name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "Bool",
            ScalarKind::Char => "Char",
            ScalarKind::I8 => "I8",
            ScalarKind::I16 => "I16",
            ScalarKind::I32 => "I32",
            ScalarKind::I64 => "I64",
            ScalarKind::U8 => "U8",
            ScalarKind::U16 => "U16",
            ScalarKind::U32 => "U32",
            ScalarKind::U64 => "U64",
            ScalarKind::F32 => "F32",
            ScalarKind::F64 => "F64",
            ScalarKind::DateTime => "DateTime",
        }
    }

    #[inline]
    pub const fn is_signed_int(self) -> bool {
        matches!(
            self,
            ScalarKind::I8 | ScalarKind::I16 | ScalarKind::I32 | ScalarKind::I64
        )
    }

    #[inline]
    pub const fn is_unsigned_int(self) -> bool {
        matches!(
            self,
            ScalarKind::U8 | ScalarKind::U16 | ScalarKind::U32 | ScalarKind::U64
        )
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        self.is_signed_int() || self.is_unsigned_int()
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, ScalarKind::F32 | ScalarKind::F64)
    }

    #[inline]
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Scalars whose JSON form is a quoted string rather than a bare literal.
    #[inline]
    pub const fn is_quoted_in_json(self) -> bool {
        matches!(self, ScalarKind::Char | ScalarKind::DateTime)
    }
}
