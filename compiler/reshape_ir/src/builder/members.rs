//! Member access, calls and construction.

use reshape_types::{MethodDef, Receiver, Repr, TypeDef, TypeId, Value};

use super::Builder;
use crate::error::BuildError;
use crate::expr::{Alloc, ExprKind, FieldInit, MethodRef};
use crate::ids::ExprId;

/// Key of an indexer-style member name (`[0]`, `[Name]`), if `name` is one.
/// Integer keys become `I32` constants, anything else a string.
fn indexer_key(name: &str) -> Option<Value> {
    let key = name.strip_prefix('[')?.strip_suffix(']')?;
    Some(match key.parse::<i32>() {
        Ok(n) => Value::I32(n),
        Err(_) => Value::string(key),
    })
}

impl Builder<'_> {
    /// Read member `name` of `target`: a property, an indexer element
    /// (`[key]`), or the result of a zero-argument method.
    pub fn member(&mut self, target: ExprId, name: &str) -> Result<ExprId, BuildError> {
        if let Some(key) = indexer_key(name) {
            let key = self.indexer_constant(key);
            return self.index(target, key);
        }
        let def = self.def(self.type_of(target))?;
        if let Some((index, prop)) = def.property(name) {
            return Ok(self.push(
                ExprKind::Field {
                    target,
                    index,
                    name: prop.name.clone(),
                },
                prop.ty,
            ));
        }
        if def.methods_named(name).any(|m| m.receiver == Receiver::Instance) {
            return self.call(target, name, &[]);
        }
        Err(BuildError::MemberNotFound {
            owner: def.name.clone(),
            name: name.to_owned(),
        })
    }

    /// Emit a write of member `name` (a property or `[key]`) of `target`.
    pub fn set_member(&mut self, target: ExprId, name: &str, value: ExprId) -> Result<(), BuildError> {
        if let Some(key) = indexer_key(name) {
            let key = self.indexer_constant(key);
            return self.set_index(target, key, value);
        }
        let def = self.def(self.type_of(target))?;
        let (index, prop) = def.property(name).ok_or_else(|| BuildError::MemberNotFound {
            owner: def.name.clone(),
            name: name.to_owned(),
        })?;
        self.expect_assignable(self.type_of(value), prop.ty)?;
        let write = self.push(
            ExprKind::SetField {
                target,
                index,
                name: prop.name.clone(),
                value,
            },
            TypeId::VOID,
        );
        self.emit(write);
        Ok(())
    }

    fn indexer_constant(&mut self, key: Value) -> ExprId {
        let ty = match key {
            Value::I32(_) => TypeId::I32,
            _ => TypeId::STRING,
        };
        self.constant(key, ty)
    }

    /// `target[key]` through `get_Item`.
    pub fn index(&mut self, target: ExprId, key: ExprId) -> Result<ExprId, BuildError> {
        self.call(target, "get_Item", &[key])
    }

    /// Emit `target[key] = value` through `set_Item`.
    pub fn set_index(&mut self, target: ExprId, key: ExprId, value: ExprId) -> Result<(), BuildError> {
        let call = self.call(target, "set_Item", &[key, value])?;
        self.emit(call);
        Ok(())
    }

    /// Instance method call. The call is an expression; `emit` it to use it
    /// as a statement.
    pub fn call(&mut self, target: ExprId, name: &str, args: &[ExprId]) -> Result<ExprId, BuildError> {
        let def = self.def(self.type_of(target))?;
        let (method, args) = self.resolve(&def, name, Receiver::Instance, args)?;
        let ret = method.ret;
        let args = self.arena.push_list(&args);
        Ok(self.push(
            ExprKind::Call {
                receiver: Some(target),
                method,
                args,
            },
            ret,
        ))
    }

    pub fn call_static(&mut self, ty: TypeId, name: &str, args: &[ExprId]) -> Result<ExprId, BuildError> {
        let def = self.def(ty)?;
        let (method, args) = self.resolve(&def, name, Receiver::Static, args)?;
        let ret = method.ret;
        let args = self.arena.push_list(&args);
        Ok(self.push(
            ExprKind::Call {
                receiver: None,
                method,
                args,
            },
            ret,
        ))
    }

    /// Pick the overload of `name` for `args`: an exact positional type
    /// match first, then a prefix match whose missing trailing parameters
    /// all have defaults (supplied as constants).
    fn resolve(
        &mut self,
        def: &TypeDef,
        name: &str,
        receiver: Receiver,
        args: &[ExprId],
    ) -> Result<(MethodRef, Vec<ExprId>), BuildError> {
        let arg_types: Vec<TypeId> = args.iter().map(|&a| self.type_of(a)).collect();
        let candidates: Vec<&MethodDef> = def
            .methods_named(name)
            .filter(|m| m.receiver == receiver)
            .collect();
        if candidates.is_empty() {
            return Err(BuildError::MemberNotFound {
                owner: def.name.clone(),
                name: name.to_owned(),
            });
        }

        let accepts = |param: TypeId, arg: TypeId| param == arg || param == TypeId::OBJECT;

        if let Some(exact) = candidates.iter().find(|m| {
            m.params.len() == arg_types.len()
                && m.params.iter().zip(&arg_types).all(|(p, &a)| accepts(p.ty, a))
        }) {
            return Ok((MethodRef::new(def.id, exact), args.to_vec()));
        }

        let with_defaults = candidates.iter().find(|m| {
            m.params.len() > arg_types.len()
                && m.params.iter().zip(&arg_types).all(|(p, &a)| accepts(p.ty, a))
                && m.params[arg_types.len()..].iter().all(|p| p.default.is_some())
        });
        if let Some(method) = with_defaults {
            let mut full = args.to_vec();
            for param in &method.params[args.len()..] {
                let value = param.default.clone().unwrap_or(Value::Null);
                full.push(self.constant(value, param.ty));
            }
            return Ok((MethodRef::new(def.id, method), full));
        }

        Err(BuildError::OverloadResolution {
            owner: def.name.clone(),
            name: name.to_owned(),
            args: arg_types
                .iter()
                .map(|&t| self.type_name(t))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Construct a `ty` with positional constructor `args` and named member
    /// initializers.
    pub fn construct(
        &mut self,
        ty: TypeId,
        args: &[ExprId],
        inits: &[(&str, ExprId)],
    ) -> Result<ExprId, BuildError> {
        let def = self.def(ty)?;
        let alloc = match def.repr() {
            Repr::Record => Alloc::Record {
                defaults: def.properties.iter().map(|p| Value::default_for(p.ty)).collect(),
            },
            Repr::Sequence => Alloc::Sequence,
            Repr::Map => Alloc::Map,
            Repr::Host => {
                let ctor = def.ctor.as_ref().ok_or_else(|| BuildError::MemberNotFound {
                    owner: def.name.clone(),
                    name: "constructor".to_owned(),
                })?;
                let arg_types: Vec<TypeId> = args.iter().map(|&a| self.type_of(a)).collect();
                let matches = ctor.params.len() == arg_types.len()
                    && ctor.params.iter().zip(&arg_types).all(|(p, &a)| p.ty == a);
                if !matches {
                    return Err(BuildError::OverloadResolution {
                        owner: def.name.clone(),
                        name: "constructor".to_owned(),
                        args: arg_types
                            .iter()
                            .map(|&t| self.type_name(t))
                            .collect::<Vec<_>>()
                            .join(", "),
                    });
                }
                Alloc::Host { imp: ctor.imp }
            }
            Repr::Void | Repr::Scalar(_) | Repr::Nullable(_) | Repr::Str | Repr::Any => {
                return Err(BuildError::UnsupportedOperation {
                    op: "new".to_owned(),
                    operands: def.name.clone(),
                })
            }
        };
        if !matches!(alloc, Alloc::Host { .. }) && !args.is_empty() {
            return Err(BuildError::OverloadResolution {
                owner: def.name.clone(),
                name: "constructor".to_owned(),
                args: format!("{} argument(s)", args.len()),
            });
        }

        let mut field_inits = Vec::with_capacity(inits.len());
        for &(name, value) in inits {
            let (index, prop) = def.property(name).ok_or_else(|| BuildError::MemberNotFound {
                owner: def.name.clone(),
                name: name.to_owned(),
            })?;
            self.expect_assignable(self.type_of(value), prop.ty)?;
            field_inits.push(FieldInit {
                index,
                name: prop.name.clone(),
                value,
            });
        }

        let args = self.arena.push_list(args);
        Ok(self.push(
            ExprKind::Construct {
                ty,
                alloc,
                args,
                inits: field_inits,
            },
            ty,
        ))
    }
}
