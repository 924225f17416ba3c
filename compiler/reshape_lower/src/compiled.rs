//! The callable artifact produced by lowering.

use std::fmt;

use reshape_types::{type_mismatch, EvalResult, ScalarKind, TypeId, Value};

use crate::error::Unwind;

/// Lowered node: evaluates against a frame.
pub(crate) type Code = Box<dyn Fn(&mut Frame) -> Result<Value, Unwind> + Send + Sync>;

/// Activation record of one call: the input and one slot per local.
pub(crate) struct Frame {
    pub(crate) param: Value,
    pub(crate) slots: Vec<Value>,
}

/// A compiled, immutable, thread-safe function of one argument.
pub struct CompiledFn {
    pub(crate) body: Code,
    pub(crate) slots: Vec<Value>,
    pub(crate) param_ty: TypeId,
    pub(crate) result_ty: TypeId,
    pub(crate) nodes: usize,
}

impl CompiledFn {
    /// Run the function on `param`. Errors are scoped to this call.
    pub fn call(&self, param: Value) -> EvalResult {
        check_param(self.param_ty, &param)?;
        let mut frame = Frame {
            param,
            slots: self.slots.clone(),
        };
        match (self.body)(&mut frame) {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Error(err)) => Err(err),
            Err(Unwind::Break(label) | Unwind::Continue(label)) => {
                unreachable!("jump to {label} escaped its loop; labels are checked at lowering")
            }
        }
    }

    #[inline]
    pub fn param_ty(&self) -> TypeId {
        self.param_ty
    }

    #[inline]
    pub fn result_ty(&self) -> TypeId {
        self.result_ty
    }

    /// Number of IR nodes the function was lowered from.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes
    }
}

/// Reject inputs whose runtime form cannot belong to a builtin parameter
/// type. Reference-typed parameters are checked by the code that reads them.
fn check_param(param_ty: TypeId, param: &Value) -> EvalResult<()> {
    let ok = match ScalarKind::from_type_id(param_ty) {
        Some(kind) => param.scalar_kind() == Some(kind),
        None if param_ty == TypeId::STRING => matches!(param, Value::Null | Value::Str(_)),
        None => true,
    };
    if ok {
        Ok(())
    } else {
        Err(type_mismatch(param_ty.to_string(), param.type_name()))
    }
}

impl fmt::Debug for CompiledFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledFn")
            .field("param_ty", &self.param_ty)
            .field("result_ty", &self.result_ty)
            .field("slots", &self.slots.len())
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}
