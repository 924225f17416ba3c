//! Operators and their typing rules.
//!
//! The builder and the lowering backend share these rules: an operator is
//! supported for a pair of operand types exactly when `result_type`
//! returns `Some`.

use reshape_types::{ScalarKind, TypeId};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,

    // Comparison
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Logical (short-circuit)
    And,
    Or,
}

impl BinaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    #[inline]
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::NotEq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq
        )
    }

    /// Result type of `left op right`, or `None` if unsupported.
    pub fn result_type(self, left: TypeId, right: TypeId) -> Option<TypeId> {
        let (lk, rk) = (ScalarKind::from_type_id(left), ScalarKind::from_type_id(right));
        match self {
            // Concatenation with any text-convertible operand.
            Self::Add if left == TypeId::STRING || right == TypeId::STRING => {
                (is_textual(left) && is_textual(right)).then_some(TypeId::STRING)
            }
            Self::Add | Self::Sub | Self::Mul | Self::Div => match (lk, rk) {
                (Some(l), Some(r)) if l == r && l.is_numeric() => Some(left),
                _ => None,
            },
            Self::Eq | Self::NotEq => {
                let same = left == right;
                // Reference identity against the top type (e.g. a typed null).
                let by_ref = (left == TypeId::OBJECT && rk.is_none())
                    || (right == TypeId::OBJECT && lk.is_none());
                (same || by_ref).then_some(TypeId::BOOL)
            }
            Self::Lt | Self::LtEq | Self::Gt | Self::GtEq => {
                let ordered = match (lk, rk) {
                    (Some(l), Some(r)) => l == r && l != ScalarKind::Bool,
                    (None, None) => left == TypeId::STRING && right == TypeId::STRING,
                    _ => false,
                };
                ordered.then_some(TypeId::BOOL)
            }
            Self::And | Self::Or => {
                (left == TypeId::BOOL && right == TypeId::BOOL).then_some(TypeId::BOOL)
            }
        }
    }
}

fn is_textual(ty: TypeId) -> bool {
    ty == TypeId::STRING || ScalarKind::from_type_id(ty).is_some()
}

/// Value-level unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Neg => "-",
        }
    }

    pub fn result_type(self, operand: TypeId) -> Option<TypeId> {
        let kind = ScalarKind::from_type_id(operand)?;
        match self {
            Self::Not => (kind == ScalarKind::Bool).then_some(operand),
            Self::Neg => (kind.is_signed_int() || kind.is_float()).then_some(operand),
        }
    }
}

/// Increment/decrement of a local, yielding the old (post) or new (pre) value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum StepOp {
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl StepOp {
    #[inline]
    pub const fn is_increment(self) -> bool {
        matches!(self, Self::PreInc | Self::PostInc)
    }

    #[inline]
    pub const fn yields_new(self) -> bool {
        matches!(self, Self::PreInc | Self::PreDec)
    }

    pub fn supports(ty: TypeId) -> bool {
        ScalarKind::from_type_id(ty).is_some_and(ScalarKind::is_numeric)
    }
}
