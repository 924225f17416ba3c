//! A finished IR function.

use reshape_types::TypeId;

use crate::arena::ExprArena;
use crate::expr::LocalDecl;
use crate::ids::{ExprId, LocalId};

/// One-parameter function: the unit the backend lowers.
///
/// `body` is a `Block` whose result (or an explicit `Return`) produces a
/// value of `result_ty`.
#[derive(Clone, Debug)]
pub struct Function {
    pub arena: ExprArena,
    pub body: ExprId,
    pub param_ty: TypeId,
    pub result_ty: TypeId,
    /// Frame slots, indexed by `LocalId`.
    pub locals: Vec<LocalDecl>,
}

impl Function {
    pub fn local(&self, id: LocalId) -> &LocalDecl {
        &self.locals[id.index()]
    }
}
