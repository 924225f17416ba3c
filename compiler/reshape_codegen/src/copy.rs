//! Shallow and deep copies.
//!
//! A shallow copy allocates a new instance of the top-level value and
//! shares everything it references. A deep copy recurses into every
//! non-scalar member, guarding each nested reference against null.

use reshape_ir::{Builder, ExprId, Function};
use reshape_shape::ShapeKind;
use reshape_types::TypeId;

use crate::context::GenCx;
use crate::error::GenError;

/// IR for `copy(value: ty) -> ty`.
#[tracing::instrument(level = "debug", skip(cx))]
pub fn copier(cx: &GenCx<'_>, ty: TypeId, deep: bool) -> Result<Function, GenError> {
    let mut b = Builder::new(cx.registry(), ty, ty);
    let source = b.param();
    let copy = emit_copy(cx, &mut b, source, ty, deep)?;
    Ok(b.finish(copy)?)
}

/// Emit a copy of `value` (of type `ty`) and return an expression for it.
/// Members of the copy are copied recursively when `deep`.
pub(crate) fn emit_copy(
    cx: &GenCx<'_>,
    b: &mut Builder<'_>,
    value: ExprId,
    ty: TypeId,
    deep: bool,
) -> Result<ExprId, GenError> {
    let shape = cx.shape(ty)?;
    if shape.is_leaf() {
        return Ok(value);
    }
    let source = b.var("copy_source", value);
    let out = b.declare("copy", ty);
    let src = b.local(source);
    let present = b.not_null(src)?;
    b.if_then(present, |b| {
        let created = match &shape.kind {
            ShapeKind::Object { properties } => {
                let mut inits = Vec::with_capacity(properties.len());
                for prop in properties {
                    let src = b.local(source);
                    let read = b.member(src, &prop.name)?;
                    let value = if deep {
                        cx.nested(prop.ty, || emit_copy(cx, b, read, prop.ty, true))?
                    } else {
                        read
                    };
                    inits.push((prop.name.as_str(), value));
                }
                b.construct(ty, &[], &inits)?
            }
            ShapeKind::List { element } | ShapeKind::Array { element } => {
                let element = *element;
                let list = b.construct(ty, &[], &[])?;
                let list = b.var("copy_list", list);
                let src = b.local(source);
                b.foreach("copy_item", src, |b, item, _| {
                    let item = b.local(item);
                    let item = if deep {
                        cx.nested(element, || emit_copy(cx, b, item, element, true))?
                    } else {
                        item
                    };
                    let target = b.local(list);
                    let add = b.call(target, "Add", &[item])?;
                    b.emit(add);
                    Ok::<(), GenError>(())
                })?;
                b.local(list)
            }
            ShapeKind::Dictionary { value, .. } => {
                let value_ty = *value;
                let map = b.construct(ty, &[], &[])?;
                let map = b.var("copy_map", map);
                let src = b.local(source);
                b.foreach_entry("copy_entry", src, |b, key, value, _| {
                    let value = b.local(value);
                    let value = if deep {
                        cx.nested(value_ty, || emit_copy(cx, b, value, value_ty, true))?
                    } else {
                        value
                    };
                    let target = b.local(map);
                    let key = b.local(key);
                    b.set_index(target, key, value)?;
                    Ok::<(), GenError>(())
                })?;
                b.local(map)
            }
            // Leaves returned above.
            ShapeKind::Scalar(_) | ShapeKind::Nullable(_) | ShapeKind::String => b.local(source),
        };
        b.assign(out, created)?;
        Ok::<(), GenError>(())
    })?;
    Ok(b.local(out))
}
