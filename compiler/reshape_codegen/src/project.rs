//! Projection of a record onto an ordered string map.
//!
//! Keys are the property names wrapped in brackets (`[Name]`), in
//! declaration order. Leaf values are stringified; records and collections
//! are rendered as JSON. A null string or nullable scalar property keeps
//! its entry with a null value.

use reshape_ir::{Builder, ExprId, Function};
use reshape_shape::ShapeKind;
use reshape_types::TypeId;

use crate::context::GenCx;
use crate::error::GenError;
use crate::json::emit_json_text;

/// Result type of a projection: `Dictionary<String, String>`.
pub fn projection_type(cx: &GenCx<'_>) -> TypeId {
    cx.registry().dictionary_of(TypeId::STRING, TypeId::STRING)
}

/// IR for `project(value: ty) -> Dictionary<String, String>`.
#[tracing::instrument(level = "debug", skip(cx))]
pub fn projector(cx: &GenCx<'_>, ty: TypeId) -> Result<Function, GenError> {
    let result_ty = projection_type(cx);
    let mut b = Builder::new(cx.registry(), ty, result_ty);
    let source = b.param();
    let projected = emit_projection(cx, &mut b, source, ty)?;
    Ok(b.finish(projected)?)
}

/// Emit the projection of the record `value`. Projecting null is a
/// runtime null-reference error.
pub(crate) fn emit_projection(
    cx: &GenCx<'_>,
    b: &mut Builder<'_>,
    value: ExprId,
    ty: TypeId,
) -> Result<ExprId, GenError> {
    let shape = cx.shape(ty)?;
    let ShapeKind::Object { properties } = &shape.kind else {
        return Err(GenError::ShapeMismatch {
            from: shape.name.clone(),
            to: cx.registry().name(projection_type(cx)),
        });
    };
    let source = b.var("project_source", value);
    let map = b.construct(projection_type(cx), &[], &[])?;
    let map = b.var("projection", map);
    for prop in properties {
        let s = b.local(source);
        let read = b.member(s, &prop.name)?;
        let text = emit_text(cx, b, read, prop.ty)?;
        let target = b.local(map);
        let key = b.str(&format!("[{}]", prop.name));
        b.set_index(target, key, text)?;
    }
    Ok(b.local(map))
}

/// String form of a property value.
fn emit_text(
    cx: &GenCx<'_>,
    b: &mut Builder<'_>,
    value: ExprId,
    ty: TypeId,
) -> Result<ExprId, GenError> {
    let shape = cx.shape(ty)?;
    Ok(match shape.kind {
        ShapeKind::String => value,
        ShapeKind::Scalar(_) => b.call(value, "ToString", &[])?,
        ShapeKind::Nullable(kind) => {
            let value = b.var("project_value", value);
            let text = b.declare("project_text", TypeId::STRING);
            let v = b.local(value);
            let present = b.not_null(v)?;
            b.if_then(present, |b| {
                let v = b.local(value);
                let scalar = b.convert(v, kind.type_id());
                let s = b.call(scalar, "ToString", &[])?;
                b.assign(text, s)?;
                Ok::<(), GenError>(())
            })?;
            b.local(text)
        }
        _ => cx.nested(ty, || emit_json_text(cx, b, value, ty))?,
    })
}
