//! Build-time errors.

use reshape_types::TypeId;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("type {0} is not registered")]
    UnknownType(TypeId),

    #[error("{owner} has no member `{name}`")]
    MemberNotFound { owner: String, name: String },

    #[error("no overload of {owner}.{name} accepts ({args})")]
    OverloadResolution {
        owner: String,
        name: String,
        args: String,
    },

    #[error("unsupported operation `{op}` on {operands}")]
    UnsupportedOperation { op: String, operands: String },

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
}
