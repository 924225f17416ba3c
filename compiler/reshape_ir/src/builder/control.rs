//! Structured control flow.
//!
//! Every helper takes the body as a closure; statements the closure emits
//! land in a fresh scope that becomes the branch or loop body. Helpers are
//! generic over the closure's error type so generators can thread their own
//! errors through nested bodies.

use reshape_types::{Repr, TypeId};

use super::{Builder, Var};
use crate::error::BuildError;
use crate::expr::ExprKind;
use crate::ids::{ExprId, LoopLabels};
use crate::ops::{BinaryOp, StepOp, UnaryOp};

impl Builder<'_> {
    fn expect_bool(&self, cond: ExprId) -> Result<(), BuildError> {
        let ty = self.type_of(cond);
        if ty == TypeId::BOOL {
            Ok(())
        } else {
            Err(BuildError::TypeMismatch {
                expected: self.type_name(TypeId::BOOL),
                found: self.type_name(ty),
            })
        }
    }

    /// Emit `if cond { then }`.
    pub fn if_then<E: From<BuildError>>(
        &mut self,
        cond: ExprId,
        then: impl FnOnce(&mut Self) -> Result<(), E>,
    ) -> Result<(), E> {
        self.expect_bool(cond)?;
        let then_branch = self.scoped(then)?;
        let stmt = self.push(
            ExprKind::If {
                cond,
                then_branch,
                else_branch: None,
            },
            TypeId::VOID,
        );
        self.emit(stmt);
        Ok(())
    }

    /// Emit `if cond { then } else { otherwise }`.
    pub fn if_then_else<E: From<BuildError>>(
        &mut self,
        cond: ExprId,
        then: impl FnOnce(&mut Self) -> Result<(), E>,
        otherwise: impl FnOnce(&mut Self) -> Result<(), E>,
    ) -> Result<(), E> {
        self.expect_bool(cond)?;
        let then_branch = self.scoped(then)?;
        let else_branch = self.scoped(otherwise)?;
        let stmt = self.push(
            ExprKind::If {
                cond,
                then_branch,
                else_branch: Some(else_branch),
            },
            TypeId::VOID,
        );
        self.emit(stmt);
        Ok(())
    }

    /// Emit `while cond { body }`. The condition is built inside the loop
    /// and re-evaluated before every iteration, `continue` included.
    pub fn while_loop<E: From<BuildError>>(
        &mut self,
        cond: impl FnOnce(&mut Self) -> Result<ExprId, E>,
        body: impl FnOnce(&mut Self, LoopLabels) -> Result<(), E>,
    ) -> Result<(), E> {
        let labels = LoopLabels {
            break_label: self.fresh_label(),
            continue_label: self.fresh_label(),
        };
        let block = self.scoped(|b| {
            let cond = cond(b)?;
            b.expect_bool(cond)?;
            let stop = b.unary(UnaryOp::Not, cond)?;
            b.if_then(stop, |b| {
                b.brk(labels);
                Ok::<(), BuildError>(())
            })?;
            body(b, labels)
        })?;
        let stmt = self.push(
            ExprKind::Loop {
                body: block,
                break_label: labels.break_label,
                continue_label: labels.continue_label,
            },
            TypeId::VOID,
        );
        self.emit(stmt);
        Ok(())
    }

    /// Emit `for i in start..end { body }` over `I32` bounds. `end` is
    /// evaluated once. The counter advances before the body runs.
    pub fn for_range<E: From<BuildError>>(
        &mut self,
        name: &str,
        start: ExprId,
        end: ExprId,
        body: impl FnOnce(&mut Self, Var, LoopLabels) -> Result<(), E>,
    ) -> Result<(), E> {
        for bound in [start, end] {
            if self.type_of(bound) != TypeId::I32 {
                return Err(BuildError::TypeMismatch {
                    expected: self.type_name(TypeId::I32),
                    found: self.type_name(self.type_of(bound)),
                }
                .into());
            }
        }
        let next = self.var(&format!("{name}_next"), start);
        let end = self.var(&format!("{name}_end"), end);
        self.while_loop(
            |b| {
                let (n, e) = (b.local(next), b.local(end));
                Ok(b.binary(BinaryOp::Lt, n, e)?)
            },
            |b, labels| {
                let post = b.step(StepOp::PostInc, next)?;
                let current = b.var(name, post);
                body(b, current, labels)
            },
        )
    }

    /// Emit a loop over the elements of a list or array. `body` receives
    /// the current element; the element count is read once up front.
    pub fn foreach<E: From<BuildError>>(
        &mut self,
        name: &str,
        sequence: ExprId,
        body: impl FnOnce(&mut Self, Var, LoopLabels) -> Result<(), E>,
    ) -> Result<(), E> {
        let ty = self.type_of(sequence);
        if self.def(ty)?.repr() != Repr::Sequence {
            return Err(BuildError::UnsupportedOperation {
                op: "foreach".to_owned(),
                operands: self.type_name(ty),
            }
            .into());
        }
        let source = self.var(&format!("{name}_source"), sequence);
        let src = self.local(source);
        let count = self.call(src, "Count", &[])?;
        let zero = self.int(0);
        self.for_range(name, zero, count, |b, index, labels| {
            let src = b.local(source);
            let i = b.local(index);
            let item = b.index(src, i)?;
            let item = b.var(&format!("{name}_item"), item);
            body(b, item, labels)
        })
    }

    /// Emit a loop over the entries of a dictionary in insertion order.
    /// `body` receives the key and value.
    pub fn foreach_entry<E: From<BuildError>>(
        &mut self,
        name: &str,
        map: ExprId,
        body: impl FnOnce(&mut Self, Var, Var, LoopLabels) -> Result<(), E>,
    ) -> Result<(), E> {
        let ty = self.type_of(map);
        if self.def(ty)?.repr() != Repr::Map {
            return Err(BuildError::UnsupportedOperation {
                op: "foreach entry".to_owned(),
                operands: self.type_name(ty),
            }
            .into());
        }
        let source = self.var(&format!("{name}_map"), map);
        let src = self.local(source);
        let keys = self.call(src, "Keys", &[])?;
        self.foreach(&format!("{name}_key"), keys, |b, key, labels| {
            let src = b.local(source);
            let k = b.local(key);
            let value = b.index(src, k)?;
            let value = b.var(&format!("{name}_value"), value);
            body(b, key, value, labels)
        })
    }

    /// Emit `return value`.
    pub fn ret(&mut self, value: Option<ExprId>) -> Result<(), BuildError> {
        if let Some(v) = value {
            self.expect_assignable(self.type_of(v), self.result_ty)?;
        }
        let stmt = self.push(ExprKind::Return(value), TypeId::VOID);
        self.emit(stmt);
        Ok(())
    }

    /// Emit a `break` out of the loop owning `labels`.
    pub fn brk(&mut self, labels: LoopLabels) {
        let stmt = self.push(ExprKind::Break(labels.break_label), TypeId::VOID);
        self.emit(stmt);
    }

    /// Emit a `continue` of the loop owning `labels`.
    pub fn cont(&mut self, labels: LoopLabels) {
        let stmt = self.push(ExprKind::Continue(labels.continue_label), TypeId::VOID);
        self.emit(stmt);
    }
}
