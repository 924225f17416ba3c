//! Runtime errors raised while a compiled artifact runs.
//!
//! These are scoped to a single invocation: they never reach the artifact
//! cache, and a later call with valid input succeeds.

use thiserror::Error;

/// Result of a runtime operation.
pub type EvalResult<T = crate::Value> = Result<T, EvalError>;

/// Runtime error category.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("null reference: cannot {action}")]
    NullReference { action: String },

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("cannot convert {value} to {target}")]
    InvalidConversion { value: String, target: String },

    #[error("integer overflow in {operation}")]
    IntegerOverflow { operation: &'static str },

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    #[error("invalid JSON at byte {offset}: {message}")]
    Json { message: String, offset: usize },

    #[error("{receiver} has no field at index {index}")]
    NoSuchField { receiver: String, index: usize },
}

pub fn null_reference(action: impl Into<String>) -> EvalError {
    EvalError::NullReference {
        action: action.into(),
    }
}

pub fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> EvalError {
    EvalError::TypeMismatch {
        expected: expected.into(),
        got: got.into(),
    }
}

pub fn invalid_conversion(value: impl Into<String>, target: impl Into<String>) -> EvalError {
    EvalError::InvalidConversion {
        value: value.into(),
        target: target.into(),
    }
}

pub fn json_error(message: impl Into<String>, offset: usize) -> EvalError {
    EvalError::Json {
        message: message.into(),
        offset,
    }
}
