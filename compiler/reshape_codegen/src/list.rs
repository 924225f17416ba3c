//! Element-wise list variants of the mapper, copier and projector.
//!
//! Each takes a `List<source>` and produces a new `List<result>` with one
//! entry per source element, in order. A null list maps to null.

use reshape_ir::{Builder, ExprId, Function};
use reshape_types::TypeId;

use crate::context::GenCx;
use crate::copy::emit_copy;
use crate::error::GenError;
use crate::map::emit_map;
use crate::project::{emit_projection, projection_type};

/// IR for `map_list(items: List<from>) -> List<to>`.
#[tracing::instrument(level = "debug", skip(cx))]
pub fn list_mapper(
    cx: &GenCx<'_>,
    from: TypeId,
    to: TypeId,
    shallow: bool,
) -> Result<Function, GenError> {
    each(cx, from, to, |b, item| emit_map(cx, b, item, from, to, shallow))
}

/// IR for `copy_list(items: List<ty>) -> List<ty>`. The list itself is
/// always new; `deep` controls whether the elements are copied too.
#[tracing::instrument(level = "debug", skip(cx))]
pub fn list_copier(cx: &GenCx<'_>, ty: TypeId, deep: bool) -> Result<Function, GenError> {
    each(cx, ty, ty, |b, item| {
        if deep {
            emit_copy(cx, b, item, ty, true)
        } else {
            Ok(item)
        }
    })
}

/// IR for `project_list(items: List<ty>) -> List<Dictionary<String, String>>`.
#[tracing::instrument(level = "debug", skip(cx))]
pub fn list_projector(cx: &GenCx<'_>, ty: TypeId) -> Result<Function, GenError> {
    each(cx, ty, projection_type(cx), |b, item| {
        emit_projection(cx, b, item, ty)
    })
}

fn each(
    cx: &GenCx<'_>,
    from: TypeId,
    to: TypeId,
    mut element: impl FnMut(&mut Builder<'_>, ExprId) -> Result<ExprId, GenError>,
) -> Result<Function, GenError> {
    let registry = cx.registry();
    let (source_ty, result_ty) = (registry.list_of(from), registry.list_of(to));
    let mut b = Builder::new(registry, source_ty, result_ty);
    let source = b.param();
    let source = b.var("items", source);
    let out = b.declare("results", result_ty);
    let s = b.local(source);
    let present = b.not_null(s)?;
    b.if_then(present, |b| {
        let list = b.construct(result_ty, &[], &[])?;
        b.assign(out, list)?;
        let items = b.local(source);
        b.foreach("item", items, |b, item, _| {
            let item = b.local(item);
            let mapped = cx.nested(from, || element(b, item))?;
            let target = b.local(out);
            let add = b.call(target, "Add", &[mapped])?;
            b.emit(add);
            Ok::<(), GenError>(())
        })
    })?;
    let result = b.local(out);
    Ok(b.finish(result)?)
}
