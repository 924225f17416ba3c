//! Lowering errors and the control-flow signal compiled code unwinds with.

use reshape_ir::LabelId;
use reshape_types::{EvalError, Value};
use thiserror::Error;

/// IR the backend refuses to lower.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LowerError {
    #[error("unsupported operation `{op}` on {operands}")]
    UnsupportedOperation { op: String, operands: String },

    #[error("malformed IR: {0}")]
    InvalidIr(String),
}

/// Non-local exit out of a compiled node.
///
/// `Break`/`Continue` are caught by the loop owning the label, `Return` by
/// the function entry; `Error` always reaches the caller.
#[derive(Debug)]
pub enum Unwind {
    Break(LabelId),
    Continue(LabelId),
    Return(Value),
    Error(EvalError),
}

impl From<EvalError> for Unwind {
    fn from(err: EvalError) -> Self {
        Unwind::Error(err)
    }
}
