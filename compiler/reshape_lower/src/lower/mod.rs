//! Closure compilation.
//!
//! Each IR node is visited exactly once and turned into a boxed closure
//! that evaluates it against a [`Frame`]; children are lowered first and
//! captured by the parent's closure. Operator, conversion and label checks
//! happen here, so a lowered function only fails on bad runtime input.

mod access;
mod control;

use reshape_ir::{BinaryOp, ExprId, ExprKind, Function, LabelId, StepOp};
use reshape_types::{type_mismatch, TypeId, Value};

use crate::compiled::{Code, CompiledFn, Frame};
use crate::convert;
use crate::error::LowerError;
use crate::operators::{concat, evaluate_binary, evaluate_unary, one_like};

/// Red zone before the stack is grown.
const RED_ZONE: usize = 100 * 1024;
/// Stack allocated per growth step.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Lower a finished IR function into a callable artifact.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = func.arena.len()))]
pub fn lower(func: &Function) -> Result<CompiledFn, LowerError> {
    let mut lowerer = Lowerer {
        func,
        loops: Vec::new(),
    };
    let body = lowerer.lower(func.body)?;
    let body_ty = func.arena.ty(func.body);
    if body_ty != func.result_ty && func.result_ty != TypeId::OBJECT && body_ty != TypeId::VOID {
        return Err(LowerError::InvalidIr(format!(
            "body yields {body_ty}, function returns {}",
            func.result_ty
        )));
    }
    let slots = func
        .locals
        .iter()
        .map(|decl| Value::default_for(decl.ty))
        .collect();
    tracing::debug!(locals = func.locals.len(), "lowered function");
    Ok(CompiledFn {
        body,
        slots,
        param_ty: func.param_ty,
        result_ty: func.result_ty,
        nodes: func.arena.len(),
    })
}

struct Lowerer<'f> {
    func: &'f Function,
    /// `(break, continue)` labels of the enclosing loops, innermost last.
    loops: Vec<(LabelId, LabelId)>,
}

impl<'f> Lowerer<'f> {
    fn lower(&mut self, id: ExprId) -> Result<Code, LowerError> {
        ensure_sufficient_stack(|| self.lower_node(id))
    }

    fn lower_all(&mut self, ids: &[ExprId]) -> Result<Vec<Code>, LowerError> {
        ids.iter().map(|&id| self.lower(id)).collect()
    }

    fn ty(&self, id: ExprId) -> TypeId {
        self.func.arena.ty(id)
    }

    fn unsupported(op: impl Into<String>, operands: String) -> LowerError {
        LowerError::UnsupportedOperation {
            op: op.into(),
            operands,
        }
    }

    fn lower_node(&mut self, id: ExprId) -> Result<Code, LowerError> {
        let func: &'f Function = self.func;
        match func.arena.kind(id) {
            ExprKind::Constant(value) => {
                let value = value.clone();
                Ok(Box::new(move |_: &mut Frame| Ok(value.clone())))
            }
            ExprKind::Param => Ok(Box::new(|frame: &mut Frame| Ok(frame.param.clone()))),
            ExprKind::Local(local) => {
                let slot = self.slot(local.index())?;
                Ok(Box::new(move |frame: &mut Frame| Ok(frame.slots[slot].clone())))
            }
            ExprKind::Assign { local, value } => {
                let slot = self.slot(local.index())?;
                let value = self.lower(*value)?;
                Ok(Box::new(move |frame: &mut Frame| {
                    let v = value(frame)?;
                    frame.slots[slot] = v;
                    Ok(Value::Null)
                }))
            }
            ExprKind::Field {
                target,
                index,
                name,
            } => self.field(*target, *index, name),
            ExprKind::SetField {
                target,
                index,
                name,
                value,
            } => self.set_field(*target, *index, name, *value),
            ExprKind::Call {
                receiver,
                method,
                args,
            } => self.call(*receiver, method, func.arena.list(*args)),
            ExprKind::Construct {
                ty,
                alloc,
                args,
                inits,
            } => self.construct(*ty, alloc, func.arena.list(*args), inits),
            ExprKind::Convert { value, target } => self.convert(*value, *target),
            ExprKind::Binary { op, left, right } => self.binary(id, *op, *left, *right),
            ExprKind::Unary { op, operand } => {
                let ot = self.ty(*operand);
                if op.result_type(ot).is_none() {
                    return Err(Self::unsupported(op.as_symbol(), ot.to_string()));
                }
                let op = *op;
                let operand = self.lower(*operand)?;
                Ok(Box::new(move |frame: &mut Frame| {
                    Ok(evaluate_unary(operand(frame)?, op)?)
                }))
            }
            ExprKind::Step { op, local } => self.step(*op, local.index()),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => self.if_else(*cond, *then_branch, *else_branch),
            ExprKind::Loop {
                body,
                break_label,
                continue_label,
            } => self.loop_(*body, *break_label, *continue_label),
            ExprKind::Block {
                locals,
                stmts,
                result,
            } => self.block(locals, func.arena.list(*stmts), *result),
            ExprKind::Return(value) => self.ret(*value),
            ExprKind::Break(label) => self.jump(*label, true),
            ExprKind::Continue(label) => self.jump(*label, false),
        }
    }

    fn slot(&self, index: usize) -> Result<usize, LowerError> {
        if index < self.func.locals.len() {
            Ok(index)
        } else {
            Err(LowerError::InvalidIr(format!("local ${index} is not declared")))
        }
    }

    fn convert(&mut self, value: ExprId, target: TypeId) -> Result<Code, LowerError> {
        let from = self.ty(value);
        if !convert::supported(from, target) {
            return Err(Self::unsupported("convert", format!("{from} to {target}")));
        }
        let value = self.lower(value)?;
        Ok(Box::new(move |frame: &mut Frame| {
            Ok(convert::convert(value(frame)?, target)?)
        }))
    }

    fn binary(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    ) -> Result<Code, LowerError> {
        let (lt, rt) = (self.ty(left), self.ty(right));
        let Some(result) = op.result_type(lt, rt) else {
            return Err(Self::unsupported(op.as_symbol(), format!("{lt} and {rt}")));
        };
        if result != self.ty(id) {
            return Err(LowerError::InvalidIr(format!(
                "`{}` node typed {} but yields {result}",
                op.as_symbol(),
                self.ty(id)
            )));
        }
        let left = self.lower(left)?;
        let right = self.lower(right)?;
        let code: Code = match op {
            BinaryOp::And | BinaryOp::Or => {
                let short = op == BinaryOp::Or;
                Box::new(move |frame: &mut Frame| match left(frame)? {
                    Value::Bool(b) if b == short => Ok(Value::Bool(short)),
                    Value::Bool(_) => match right(frame)? {
                        v @ Value::Bool(_) => Ok(v),
                        other => Err(type_mismatch("Bool", other.type_name()).into()),
                    },
                    other => Err(type_mismatch("Bool", other.type_name()).into()),
                })
            }
            BinaryOp::Add if result == TypeId::STRING => Box::new(move |frame: &mut Frame| {
                let l = left(frame)?;
                let r = right(frame)?;
                Ok(concat(&l, &r))
            }),
            _ => Box::new(move |frame: &mut Frame| {
                let l = left(frame)?;
                let r = right(frame)?;
                Ok(evaluate_binary(l, r, op)?)
            }),
        };
        Ok(code)
    }

    fn step(&mut self, op: StepOp, index: usize) -> Result<Code, LowerError> {
        let slot = self.slot(index)?;
        let ty = self.func.locals[slot].ty;
        if !StepOp::supports(ty) {
            return Err(Self::unsupported(format!("{op:?}"), ty.to_string()));
        }
        let arith = if op.is_increment() {
            BinaryOp::Add
        } else {
            BinaryOp::Sub
        };
        Ok(Box::new(move |frame: &mut Frame| {
            let old = frame.slots[slot].clone();
            let one = one_like(&old)?;
            let new = evaluate_binary(old.clone(), one, arith)?;
            frame.slots[slot] = new.clone();
            Ok(if op.yields_new() { new } else { old })
        }))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
