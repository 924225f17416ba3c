//! Field access, calls and construction.

use reshape_ir::{Alloc, ExprId, FieldInit, MethodRef};
use reshape_types::{null_reference, type_mismatch, ListRef, MapRef, ObjectRef, TypeId, Value};

use super::Lowerer;
use crate::compiled::{Code, Frame};
use crate::error::{LowerError, Unwind};

/// The record behind `value`, or a null-reference error naming `action`.
fn object_of<'v>(value: &'v Value, action: &str) -> Result<&'v ObjectRef, Unwind> {
    match value {
        Value::Object(o) => Ok(o),
        Value::Null => Err(null_reference(action).into()),
        other => Err(type_mismatch("Object", other.type_name()).into()),
    }
}

impl Lowerer<'_> {
    pub(super) fn field(
        &mut self,
        target: ExprId,
        index: usize,
        name: &str,
    ) -> Result<Code, LowerError> {
        let target = self.lower(target)?;
        let action = format!("read {name}");
        Ok(Box::new(move |frame: &mut Frame| {
            let value = target(frame)?;
            Ok(object_of(&value, &action)?.field(index)?)
        }))
    }

    pub(super) fn set_field(
        &mut self,
        target: ExprId,
        index: usize,
        name: &str,
        value: ExprId,
    ) -> Result<Code, LowerError> {
        let target = self.lower(target)?;
        let value = self.lower(value)?;
        let action = format!("write {name}");
        Ok(Box::new(move |frame: &mut Frame| {
            let obj = target(frame)?;
            let v = value(frame)?;
            object_of(&obj, &action)?.set_field(index, v)?;
            Ok(Value::Null)
        }))
    }

    pub(super) fn call(
        &mut self,
        receiver: Option<ExprId>,
        method: &MethodRef,
        args: &[ExprId],
    ) -> Result<Code, LowerError> {
        let receiver = receiver.map(|r| self.lower(r)).transpose()?;
        let args = self.lower_all(args)?;
        let (imp, ret) = (method.imp, method.ret);
        let action = format!("call {}", method.name);
        Ok(Box::new(move |frame: &mut Frame| {
            let mut values = Vec::with_capacity(args.len() + 1);
            if let Some(receiver) = &receiver {
                let this = receiver(frame)?;
                if this.is_null() {
                    return Err(null_reference(action.as_str()).into());
                }
                values.push(this);
            }
            for arg in &args {
                values.push(arg(frame)?);
            }
            Ok(imp(&values, ret)?)
        }))
    }

    pub(super) fn construct(
        &mut self,
        ty: TypeId,
        alloc: &Alloc,
        args: &[ExprId],
        inits: &[FieldInit],
    ) -> Result<Code, LowerError> {
        let args = self.lower_all(args)?;
        let mut lowered = Vec::with_capacity(inits.len());
        for init in inits {
            lowered.push((init.index, self.lower(init.value)?));
        }
        let inits = lowered;

        let record_inits = |defaults: &[Value]| -> Result<(), LowerError> {
            match inits.iter().find(|(index, _)| *index >= defaults.len()) {
                Some((index, _)) => Err(LowerError::InvalidIr(format!(
                    "initializer for slot {index} of {ty}, which has {} fields",
                    defaults.len()
                ))),
                None => Ok(()),
            }
        };

        let code: Code = match alloc {
            Alloc::Record { defaults } => {
                record_inits(defaults)?;
                let defaults = defaults.clone();
                Box::new(move |frame: &mut Frame| {
                    let obj = ObjectRef::new(ty, defaults.clone());
                    for (index, init) in &inits {
                        obj.set_field(*index, init(frame)?)?;
                    }
                    Ok(Value::Object(obj))
                })
            }
            _ if !inits.is_empty() => {
                return Err(LowerError::InvalidIr(format!(
                    "member initializers on non-record {ty}"
                )))
            }
            Alloc::Sequence => {
                Box::new(move |_: &mut Frame| Ok(Value::List(ListRef::new(ty, Vec::new()))))
            }
            Alloc::Map => Box::new(move |_: &mut Frame| Ok(Value::Map(MapRef::new(ty)))),
            Alloc::Host { imp } => {
                let imp = *imp;
                Box::new(move |frame: &mut Frame| {
                    let values = args
                        .iter()
                        .map(|arg| arg(frame))
                        .collect::<Result<Vec<_>, Unwind>>()?;
                    Ok(imp(&values, ty)?)
                })
            }
        };
        Ok(code)
    }
}
