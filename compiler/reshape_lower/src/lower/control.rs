//! Blocks, branches, loops and jumps.

use reshape_ir::{ExprId, LabelId, LocalId};
use reshape_types::{type_mismatch, TypeId, Value};

use super::Lowerer;
use crate::compiled::{Code, Frame};
use crate::error::{LowerError, Unwind};

impl Lowerer<'_> {
    pub(super) fn if_else(
        &mut self,
        cond: ExprId,
        then_branch: ExprId,
        else_branch: Option<ExprId>,
    ) -> Result<Code, LowerError> {
        if self.ty(cond) != TypeId::BOOL {
            return Err(LowerError::InvalidIr(format!(
                "condition typed {}",
                self.ty(cond)
            )));
        }
        let cond = self.lower(cond)?;
        let then_branch = self.lower(then_branch)?;
        let else_branch = else_branch.map(|e| self.lower(e)).transpose()?;
        Ok(Box::new(move |frame: &mut Frame| {
            match cond(frame)? {
                Value::Bool(true) => {
                    then_branch(frame)?;
                }
                Value::Bool(false) => {
                    if let Some(otherwise) = &else_branch {
                        otherwise(frame)?;
                    }
                }
                other => return Err(type_mismatch("Bool", other.type_name()).into()),
            }
            Ok(Value::Null)
        }))
    }

    pub(super) fn loop_(
        &mut self,
        body: ExprId,
        break_label: LabelId,
        continue_label: LabelId,
    ) -> Result<Code, LowerError> {
        self.loops.push((break_label, continue_label));
        let body = self.lower(body);
        self.loops.pop();
        let body = body?;
        Ok(Box::new(move |frame: &mut Frame| {
            loop {
                match body(frame) {
                    Ok(_) => {}
                    Err(Unwind::Break(label)) if label == break_label => break,
                    Err(Unwind::Continue(label)) if label == continue_label => {}
                    Err(other) => return Err(other),
                }
            }
            Ok(Value::Null)
        }))
    }

    pub(super) fn block(
        &mut self,
        locals: &[LocalId],
        stmts: &[ExprId],
        result: Option<ExprId>,
    ) -> Result<Code, LowerError> {
        let mut resets = Vec::with_capacity(locals.len());
        for local in locals {
            let slot = self.slot(local.index())?;
            resets.push((slot, Value::default_for(self.func.locals[slot].ty)));
        }
        let stmts = self.lower_all(stmts)?;
        let result = result.map(|r| self.lower(r)).transpose()?;
        Ok(Box::new(move |frame: &mut Frame| {
            for (slot, default) in &resets {
                frame.slots[*slot] = default.clone();
            }
            for stmt in &stmts {
                stmt(frame)?;
            }
            match &result {
                Some(result) => result(frame),
                None => Ok(Value::Null),
            }
        }))
    }

    pub(super) fn ret(&mut self, value: Option<ExprId>) -> Result<Code, LowerError> {
        if let Some(v) = value {
            let ty = self.ty(v);
            if ty != self.func.result_ty && self.func.result_ty != TypeId::OBJECT {
                return Err(LowerError::InvalidIr(format!(
                    "return of {ty} from a function returning {}",
                    self.func.result_ty
                )));
            }
        }
        let value = value.map(|v| self.lower(v)).transpose()?;
        Ok(Box::new(move |frame: &mut Frame| {
            let v = match &value {
                Some(value) => value(frame)?,
                None => Value::Null,
            };
            Err(Unwind::Return(v))
        }))
    }

    /// `Break` (`is_break`) or `Continue` to `label`, which must belong to
    /// an enclosing loop.
    pub(super) fn jump(&mut self, label: LabelId, is_break: bool) -> Result<Code, LowerError> {
        let known = self.loops.iter().any(|&(brk, cont)| {
            if is_break {
                brk == label
            } else {
                cont == label
            }
        });
        if !known {
            let kind = if is_break { "break" } else { "continue" };
            return Err(LowerError::InvalidIr(format!(
                "{kind} {label} outside its loop"
            )));
        }
        let code: Code = if is_break {
            Box::new(move |_: &mut Frame| Err(Unwind::Break(label)))
        } else {
            Box::new(move |_: &mut Frame| Err(Unwind::Continue(label)))
        };
        Ok(code)
    }
}
