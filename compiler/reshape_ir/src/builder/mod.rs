//! Step-scoped IR builder.
//!
//! Statements accumulate in the innermost open scope. Entering a branch or
//! loop body opens a scope; leaving it folds the recorded statements into
//! the `Block` that becomes the branch or body. One builder serves exactly
//! one function and is passed by `&mut` through every generation step.
//!
//! # Scope discipline
//!
//! The structured helpers (`if_then`, `while_loop`, `foreach`, ...) open and
//! close scopes themselves. `enter_scope`/`exit_scope` are the raw
//! primitives; exiting the root scope, or finishing with scopes still open,
//! is a programming error and panics.

mod control;
mod members;

use reshape_types::{ScalarKind, TypeDef, TypeId, TypeRegistry, Value};
use std::sync::Arc;

use crate::arena::ExprArena;
use crate::error::BuildError;
use crate::expr::{ExprKind, LocalDecl};
use crate::function::Function;
use crate::ids::{ExprId, LabelId, LocalId};
use crate::ops::{BinaryOp, StepOp, UnaryOp};

/// Handle to a declared local.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Var {
    pub local: LocalId,
    pub ty: TypeId,
}

/// Statements and locals recorded for one block.
#[derive(Default)]
struct Scope {
    stmts: Vec<ExprId>,
    locals: Vec<LocalId>,
}

pub struct Builder<'r> {
    registry: &'r TypeRegistry,
    arena: ExprArena,
    locals: Vec<LocalDecl>,
    scopes: Vec<Scope>,
    next_label: u32,
    param_ty: TypeId,
    result_ty: TypeId,
}

impl<'r> Builder<'r> {
    /// Start a function from `param_ty` to `result_ty`.
    pub fn new(registry: &'r TypeRegistry, param_ty: TypeId, result_ty: TypeId) -> Self {
        Builder {
            registry,
            arena: ExprArena::new(),
            locals: Vec::new(),
            scopes: vec![Scope::default()],
            next_label: 0,
            param_ty,
            result_ty,
        }
    }

    #[inline]
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Result type of a built expression.
    #[inline]
    pub fn type_of(&self, expr: ExprId) -> TypeId {
        self.arena.ty(expr)
    }

    /// Number of open scopes, the root included.
    #[inline]
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub(crate) fn def(&self, ty: TypeId) -> Result<Arc<TypeDef>, BuildError> {
        self.registry.get(ty).ok_or(BuildError::UnknownType(ty))
    }

    pub(crate) fn type_name(&self, ty: TypeId) -> String {
        self.registry.name(ty)
    }

    fn push(&mut self, kind: ExprKind, ty: TypeId) -> ExprId {
        self.arena.push(kind, ty)
    }

    fn scope(&mut self) -> &mut Scope {
        // The root scope is only removed by `finish`, which consumes `self`.
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    // Leaves

    pub fn param(&mut self) -> ExprId {
        self.push(ExprKind::Param, self.param_ty)
    }

    pub fn constant(&mut self, value: Value, ty: TypeId) -> ExprId {
        self.push(ExprKind::Constant(value), ty)
    }

    pub fn int(&mut self, value: i32) -> ExprId {
        self.constant(Value::I32(value), TypeId::I32)
    }

    pub fn bool(&mut self, value: bool) -> ExprId {
        self.constant(Value::Bool(value), TypeId::BOOL)
    }

    pub fn str(&mut self, value: &str) -> ExprId {
        self.constant(Value::string(value), TypeId::STRING)
    }

    /// Null reference typed as `ty`.
    pub fn null(&mut self, ty: TypeId) -> ExprId {
        self.constant(Value::Null, ty)
    }

    // Locals

    /// Declare a local in the current scope. It holds the default value of
    /// `ty` each time the scope is entered.
    pub fn declare(&mut self, name: &str, ty: TypeId) -> Var {
        #[expect(clippy::cast_possible_truncation, reason = "local count fits in u32")]
        let local = LocalId::new(self.locals.len() as u32);
        self.locals.push(LocalDecl {
            name: name.to_owned(),
            ty,
        });
        self.scope().locals.push(local);
        Var { local, ty }
    }

    /// Declare a local typed after `init` and assign it.
    pub fn var(&mut self, name: &str, init: ExprId) -> Var {
        let var = self.declare(name, self.type_of(init));
        let assign = self.push(
            ExprKind::Assign {
                local: var.local,
                value: init,
            },
            TypeId::VOID,
        );
        self.emit(assign);
        var
    }

    pub fn local(&mut self, var: Var) -> ExprId {
        self.push(ExprKind::Local(var.local), var.ty)
    }

    pub fn assign(&mut self, var: Var, value: ExprId) -> Result<(), BuildError> {
        self.expect_assignable(self.type_of(value), var.ty)?;
        let assign = self.push(
            ExprKind::Assign {
                local: var.local,
                value,
            },
            TypeId::VOID,
        );
        self.emit(assign);
        Ok(())
    }

    /// Append a statement to the current scope.
    pub fn emit(&mut self, stmt: ExprId) {
        self.scope().stmts.push(stmt);
    }

    pub(crate) fn expect_assignable(&self, from: TypeId, to: TypeId) -> Result<(), BuildError> {
        if from == to || to == TypeId::OBJECT {
            Ok(())
        } else {
            Err(BuildError::TypeMismatch {
                expected: self.type_name(to),
                found: self.type_name(from),
            })
        }
    }

    // Operators

    /// Convert `value` to `target`. Identity conversions return `value`.
    pub fn convert(&mut self, value: ExprId, target: TypeId) -> ExprId {
        if self.type_of(value) == target {
            return value;
        }
        self.push(ExprKind::Convert { value, target }, target)
    }

    pub fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> Result<ExprId, BuildError> {
        let (lt, rt) = (self.type_of(left), self.type_of(right));
        let ty = op.result_type(lt, rt).ok_or_else(|| BuildError::UnsupportedOperation {
            op: op.as_symbol().to_owned(),
            operands: format!("{} and {}", self.type_name(lt), self.type_name(rt)),
        })?;
        Ok(self.push(ExprKind::Binary { op, left, right }, ty))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ExprId) -> Result<ExprId, BuildError> {
        let ot = self.type_of(operand);
        let ty = op.result_type(ot).ok_or_else(|| BuildError::UnsupportedOperation {
            op: op.as_symbol().to_owned(),
            operands: self.type_name(ot),
        })?;
        Ok(self.push(ExprKind::Unary { op, operand }, ty))
    }

    /// Pre/post increment or decrement of a numeric local.
    pub fn step(&mut self, op: StepOp, var: Var) -> Result<ExprId, BuildError> {
        if !StepOp::supports(var.ty) {
            return Err(BuildError::UnsupportedOperation {
                op: format!("{op:?}"),
                operands: self.type_name(var.ty),
            });
        }
        Ok(self.push(ExprKind::Step { op, local: var.local }, var.ty))
    }

    /// `value == null` for a reference-typed value.
    pub fn is_null(&mut self, value: ExprId) -> Result<ExprId, BuildError> {
        let ty = self.type_of(value);
        if ScalarKind::from_type_id(ty).is_some() {
            return Err(BuildError::UnsupportedOperation {
                op: "== null".to_owned(),
                operands: self.type_name(ty),
            });
        }
        let null = self.null(ty);
        self.binary(BinaryOp::Eq, value, null)
    }

    /// `value != null` for a reference-typed value.
    pub fn not_null(&mut self, value: ExprId) -> Result<ExprId, BuildError> {
        let is_null = self.is_null(value)?;
        self.unary(UnaryOp::Not, is_null)
    }

    // Scopes

    /// Open a recording scope.
    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the innermost scope and fold it into a `Block`.
    ///
    /// # Panics
    ///
    /// Panics when only the root scope is open.
    pub fn exit_scope(&mut self) -> ExprId {
        assert!(
            self.scopes.len() > 1,
            "exit_scope without a matching enter_scope"
        );
        let scope = self.scopes.pop().unwrap_or_default();
        self.block(scope, None)
    }

    fn block(&mut self, scope: Scope, result: Option<ExprId>) -> ExprId {
        let stmts = self.arena.push_list(&scope.stmts);
        let ty = result.map_or(TypeId::VOID, |r| self.type_of(r));
        self.push(
            ExprKind::Block {
                locals: scope.locals,
                stmts,
                result,
            },
            ty,
        )
    }

    /// Run `f` inside a fresh scope and return the resulting block. The
    /// scope is closed even when `f` fails.
    pub fn scoped<E>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<(), E>,
    ) -> Result<ExprId, E> {
        self.enter_scope();
        let outcome = f(self);
        let block = self.exit_scope();
        outcome.map(|()| block)
    }

    pub(crate) fn fresh_label(&mut self) -> LabelId {
        let label = LabelId::new(self.next_label);
        self.next_label += 1;
        label
    }

    /// Close the root scope with `result` as the function's value.
    ///
    /// # Panics
    ///
    /// Panics if any scope other than the root is still open.
    pub fn finish(mut self, result: ExprId) -> Result<Function, BuildError> {
        assert_eq!(
            self.scopes.len(),
            1,
            "finish called with {} unclosed scope(s)",
            self.scopes.len() - 1
        );
        self.expect_assignable(self.type_of(result), self.result_ty)?;
        let root = self.scopes.pop().unwrap_or_default();
        let body = self.block(root, Some(result));
        let function = Function {
            arena: self.arena,
            body,
            param_ty: self.param_ty,
            result_ty: self.result_ty,
            locals: self.locals,
        };
        tracing::trace!(nodes = function.arena.len(), "finished IR function\n{function}");
        Ok(function)
    }
}
