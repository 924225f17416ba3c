//! JSON encoding.
//!
//! Null references encode as `null`, strings (and chars and datetimes, via
//! their text form) as escaped string literals, other scalars as bare
//! literals. Non-finite floats have no JSON literal and encode as `null`. Records list their declared properties in order; collections
//! and dictionaries write a separator after every element and trim the
//! last one, so empty containers encode as `[]` and `{}`.

use reshape_ir::{BinaryOp, Builder, ExprId, Function, StepOp, Var};
use reshape_shape::ShapeKind;
use reshape_types::{ScalarKind, TypeId};

use super::{append, append_literal, quoted};
use crate::context::GenCx;
use crate::error::GenError;

/// IR for `encode(value: ty) -> String`.
#[tracing::instrument(level = "debug", skip(cx))]
pub fn json_encoder(cx: &GenCx<'_>, ty: TypeId) -> Result<Function, GenError> {
    let mut b = Builder::new(cx.registry(), ty, TypeId::STRING);
    let value = b.param();
    let text = emit_json_text(cx, &mut b, value, ty)?;
    Ok(b.finish(text)?)
}

/// Emit the JSON text of `value` into a fresh buffer and return the text.
pub(crate) fn emit_json_text(
    cx: &GenCx<'_>,
    b: &mut Builder<'_>,
    value: ExprId,
    ty: TypeId,
) -> Result<ExprId, GenError> {
    let buf = b.construct(TypeId::TEXT_BUFFER, &[], &[])?;
    let buf = b.var("json", buf);
    emit_value(cx, b, buf, value, ty)?;
    let target = b.local(buf);
    Ok(b.call(target, "ToString", &[])?)
}

fn emit_value(
    cx: &GenCx<'_>,
    b: &mut Builder<'_>,
    buf: Var,
    value: ExprId,
    ty: TypeId,
) -> Result<(), GenError> {
    let shape = cx.shape(ty)?;
    match &shape.kind {
        ShapeKind::String => append(b, buf, "AppendJsonString", value),
        ShapeKind::Scalar(kind) => emit_scalar(b, buf, value, *kind),
        ShapeKind::Nullable(kind) => {
            let kind = *kind;
            let value = b.var("json_value", value);
            emit_null_or(b, buf, value, |b| {
                let v = b.local(value);
                let scalar = b.convert(v, kind.type_id());
                emit_scalar(b, buf, scalar, kind)
            })
        }
        ShapeKind::Object { properties } => {
            let value = b.var("json_object", value);
            emit_null_or(b, buf, value, |b| {
                append_literal(b, buf, "{")?;
                for (i, prop) in properties.iter().enumerate() {
                    let sep = if i == 0 { "" } else { "," };
                    append_literal(b, buf, &format!("{sep}{}:", quoted(&prop.name)))?;
                    let target = b.local(value);
                    let field = b.member(target, &prop.name)?;
                    cx.nested(prop.ty, || emit_value(cx, b, buf, field, prop.ty))?;
                }
                append_literal(b, buf, "}")
            })
        }
        ShapeKind::List { element } | ShapeKind::Array { element } => {
            let element = *element;
            let value = b.var("json_list", value);
            emit_null_or(b, buf, value, |b| {
                append_literal(b, buf, "[")?;
                let count = b.declare("json_count", TypeId::I32);
                let items = b.local(value);
                b.foreach("json_item", items, |b, item, _| {
                    let item = b.local(item);
                    cx.nested(element, || emit_value(cx, b, buf, item, element))?;
                    append_literal(b, buf, ",")?;
                    let step = b.step(StepOp::PreInc, count)?;
                    b.emit(step);
                    Ok::<(), GenError>(())
                })?;
                trim_separator(b, buf, count)?;
                append_literal(b, buf, "]")
            })
        }
        ShapeKind::Dictionary { key, value: value_ty } => {
            if *key != TypeId::STRING {
                return Err(GenError::UnsupportedKeyType {
                    dictionary: shape.name.clone(),
                    key: cx.registry().name(*key),
                });
            }
            let value_ty = *value_ty;
            let value = b.var("json_map", value);
            emit_null_or(b, buf, value, |b| {
                append_literal(b, buf, "{")?;
                let count = b.declare("json_count", TypeId::I32);
                let map = b.local(value);
                b.foreach_entry("json_entry", map, |b, key, item, _| {
                    let key = b.local(key);
                    append(b, buf, "AppendJsonString", key)?;
                    append_literal(b, buf, ":")?;
                    let item = b.local(item);
                    cx.nested(value_ty, || emit_value(cx, b, buf, item, value_ty))?;
                    append_literal(b, buf, ",")?;
                    let step = b.step(StepOp::PreInc, count)?;
                    b.emit(step);
                    Ok::<(), GenError>(())
                })?;
                trim_separator(b, buf, count)?;
                append_literal(b, buf, "}")
            })
        }
    }
}

fn emit_scalar(
    b: &mut Builder<'_>,
    buf: Var,
    value: ExprId,
    kind: ScalarKind,
) -> Result<(), GenError> {
    if kind.is_float() {
        return append(b, buf, "AppendJsonNumber", value);
    }
    let text = b.call(value, "ToString", &[])?;
    let method = if kind.is_quoted_in_json() {
        "AppendJsonString"
    } else {
        "Append"
    };
    append(b, buf, method, text)
}

/// `if value == null { "null" } else { body }`.
fn emit_null_or<'r>(
    b: &mut Builder<'r>,
    buf: Var,
    value: Var,
    body: impl FnOnce(&mut Builder<'r>) -> Result<(), GenError>,
) -> Result<(), GenError> {
    let v = b.local(value);
    let is_null = b.is_null(v)?;
    b.if_then_else(is_null, |b| append_literal(b, buf, "null"), body)
}

/// Drop the trailing separator once at least one element was written.
fn trim_separator(b: &mut Builder<'_>, buf: Var, count: Var) -> Result<(), GenError> {
    let n = b.local(count);
    let zero = b.int(0);
    let any = b.binary(BinaryOp::Gt, n, zero)?;
    b.if_then(any, |b| {
        let target = b.local(buf);
        let len = b.call(target, "Length", &[])?;
        let one = b.int(1);
        let last = b.binary(BinaryOp::Sub, len, one)?;
        let one = b.int(1);
        let target = b.local(buf);
        let remove = b.call(target, "Remove", &[last, one])?;
        b.emit(remove);
        Ok::<(), GenError>(())
    })
}
