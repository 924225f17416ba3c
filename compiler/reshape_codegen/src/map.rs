//! Object-to-object mapping.
//!
//! Destination properties are matched to source properties by exact name.
//! Matching leaves are assigned (with a conversion when the types differ),
//! matching records are mapped recursively behind a null check, and
//! same-typed collections are shared (`shallow`) or deep-copied.
//! Everything else keeps its default.

use reshape_ir::{Builder, ExprId, Function, Var};
use reshape_shape::{Shape, ShapeKind};
use reshape_types::TypeId;

use crate::context::GenCx;
use crate::copy::emit_copy;
use crate::error::GenError;

/// IR for `map(source: from) -> to`.
#[tracing::instrument(level = "debug", skip(cx))]
pub fn mapper(cx: &GenCx<'_>, from: TypeId, to: TypeId, shallow: bool) -> Result<Function, GenError> {
    let mut b = Builder::new(cx.registry(), from, to);
    let source = b.param();
    let mapped = emit_map(cx, &mut b, source, from, to, shallow)?;
    Ok(b.finish(mapped)?)
}

fn mismatch(from: &Shape, to: &Shape) -> GenError {
    GenError::ShapeMismatch {
        from: from.name.clone(),
        to: to.name.clone(),
    }
}

/// Emit the mapping of `value` (of type `from`) onto a `to`.
pub(crate) fn emit_map(
    cx: &GenCx<'_>,
    b: &mut Builder<'_>,
    value: ExprId,
    from: TypeId,
    to: TypeId,
    shallow: bool,
) -> Result<ExprId, GenError> {
    let (src, dst) = (cx.shape(from)?, cx.shape(to)?);
    if src.is_leaf() && dst.is_leaf() {
        return Ok(b.convert(value, to));
    }
    if from == to && !src.is_object() {
        return if shallow {
            Ok(value)
        } else {
            emit_copy(cx, b, value, to, true)
        };
    }
    let (ShapeKind::Object { .. }, ShapeKind::Object { properties }) = (&src.kind, &dst.kind)
    else {
        return Err(mismatch(&src, &dst));
    };

    let source = b.var("map_source", value);
    let out = b.declare("mapped", to);
    let s = b.local(source);
    let present = b.not_null(s)?;
    b.if_then(present, |b| {
        let mut inits = Vec::new();
        for target in properties {
            let Some(origin) = src.property(&target.name) else {
                continue;
            };
            let Some(value) = map_member(cx, b, source, origin.ty, target.ty, &target.name, shallow)?
            else {
                continue;
            };
            inits.push((target.name.as_str(), value));
        }
        let created = b.construct(to, &[], &inits)?;
        b.assign(out, created)?;
        Ok::<(), GenError>(())
    })?;
    Ok(b.local(out))
}

/// Value for one matched property, or `None` when the pair is skipped.
fn map_member(
    cx: &GenCx<'_>,
    b: &mut Builder<'_>,
    source: Var,
    from: TypeId,
    to: TypeId,
    name: &str,
    shallow: bool,
) -> Result<Option<ExprId>, GenError> {
    let (src, dst) = (cx.shape(from)?, cx.shape(to)?);
    let s = b.local(source);
    let read = b.member(s, name)?;
    let value = match (&src.kind, &dst.kind) {
        _ if src.is_leaf() && dst.is_leaf() => b.convert(read, to),
        (ShapeKind::Object { .. }, ShapeKind::Object { .. }) => {
            cx.nested(to, || emit_map(cx, b, read, from, to, shallow))?
        }
        _ if from == to && shallow => read,
        _ if from == to => cx.nested(to, || emit_copy(cx, b, read, to, true))?,
        _ => {
            tracing::trace!(property = name, %from, %to, "skipping incompatible property");
            return Ok(None);
        }
    };
    Ok(Some(value))
}
