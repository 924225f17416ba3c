//! Facade error type.

use reshape_codegen::GenError;
use reshape_lower::LowerError;
use reshape_shape::ShapeError;
use reshape_types::EvalError;
use thiserror::Error;

/// Any failure of an engine operation.
///
/// `Shape`, `Generate` and `Lower` come from building an artifact and are
/// reported on the first use of a signature; nothing is cached for it.
/// `Eval` is a runtime failure of one call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Shape(#[from] ShapeError),

    #[error(transparent)]
    Generate(#[from] GenError),

    #[error(transparent)]
    Lower(#[from] LowerError),

    #[error(transparent)]
    Eval(#[from] EvalError),

    /// A value crossing the typed boundary had the wrong form.
    #[error("expected {expected}, got {found}")]
    UnexpectedValue { expected: String, found: String },

    #[error("invalid value {value:?} for {variable}")]
    Config {
        variable: &'static str,
        value: String,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub(crate) fn unexpected(expected: impl Into<String>, found: &reshape_types::Value) -> Error {
    Error::UnexpectedValue {
        expected: expected.into(),
        found: found.type_name().to_owned(),
    }
}
