//! JSON decoding.
//!
//! The generated decoder keeps one `JsonReader` and a simple contract for
//! every nested value: it starts on the value's first token and ends on its
//! last one. A `null` token leaves the target at its default. A record or
//! collection target facing some other token kind skips the value; leaf
//! getters reject a mismatched token at run time. Unknown properties are
//! skipped.

use reshape_ir::{BinaryOp, Builder, ExprId, Function, LoopLabels, Var};
use reshape_shape::ShapeKind;
use reshape_types::host::JsonTokenType;
use reshape_types::{ScalarKind, TypeId};

use crate::context::GenCx;
use crate::error::GenError;

/// IR for `decode(json: String) -> ty`.
#[tracing::instrument(level = "debug", skip(cx))]
pub fn json_decoder(cx: &GenCx<'_>, ty: TypeId) -> Result<Function, GenError> {
    let mut b = Builder::new(cx.registry(), TypeId::STRING, ty);
    let json = b.param();
    let reader = b.construct(TypeId::JSON_READER, &[json], &[])?;
    let reader = b.var("reader", reader);
    read(&mut b, reader)?;
    let decoded = decode_value(cx, &mut b, reader, ty)?;
    Ok(b.finish(decoded)?)
}

/// Emit `reader.Read()` as a statement.
fn read(b: &mut Builder<'_>, reader: Var) -> Result<(), GenError> {
    call_on(b, reader, "Read")
}

fn skip(b: &mut Builder<'_>, reader: Var) -> Result<(), GenError> {
    call_on(b, reader, "Skip")
}

fn call_on(b: &mut Builder<'_>, reader: Var, method: &str) -> Result<(), GenError> {
    let target = b.local(reader);
    let call = b.call(target, method, &[])?;
    b.emit(call);
    Ok(())
}

/// `reader.TokenType() <op> token`.
fn token_is(
    b: &mut Builder<'_>,
    reader: Var,
    op: BinaryOp,
    token: JsonTokenType,
) -> Result<ExprId, GenError> {
    let target = b.local(reader);
    let current = b.call(target, "TokenType", &[])?;
    let code = b.int(token.code());
    Ok(b.binary(op, current, code)?)
}

/// `reader.Read(); if reader.TokenType() == end { break }`.
fn advance_or_break(
    b: &mut Builder<'_>,
    reader: Var,
    end: JsonTokenType,
    labels: LoopLabels,
) -> Result<(), GenError> {
    read(b, reader)?;
    let done = token_is(b, reader, BinaryOp::Eq, end)?;
    b.if_then(done, |b| {
        b.brk(labels);
        Ok::<(), GenError>(())
    })
}

/// Emit the decoding of the value under the reader into a fresh local of
/// type `ty` and return an expression for it.
fn decode_value(
    cx: &GenCx<'_>,
    b: &mut Builder<'_>,
    reader: Var,
    ty: TypeId,
) -> Result<ExprId, GenError> {
    let shape = cx.shape(ty)?;
    let out = b.declare("decoded", ty);
    match &shape.kind {
        ShapeKind::String | ShapeKind::Scalar(_) | ShapeKind::Nullable(_) => {
            let present = token_is(b, reader, BinaryOp::NotEq, JsonTokenType::Null)?;
            b.if_then(present, |b| {
                let value = read_leaf(b, reader, ty)?;
                b.assign(out, value)?;
                Ok::<(), GenError>(())
            })?;
        }
        ShapeKind::Object { properties } => {
            container(b, reader, JsonTokenType::StartObject, |b| {
                let created = b.construct(ty, &[], &[])?;
                b.assign(out, created)?;
                b.while_loop(
                    |b| Ok::<ExprId, GenError>(b.bool(true)),
                    |b, labels| {
                        advance_or_break(b, reader, JsonTokenType::EndObject, labels)?;
                        let target = b.local(reader);
                        let name = b.call(target, "GetString", &[])?;
                        let name = b.var("property", name);
                        for prop in properties {
                            let n = b.local(name);
                            let wanted = b.str(&prop.name);
                            let matched = b.binary(BinaryOp::Eq, n, wanted)?;
                            b.if_then(matched, |b| {
                                read(b, reader)?;
                                let value =
                                    cx.nested(prop.ty, || decode_value(cx, b, reader, prop.ty))?;
                                let target = b.local(out);
                                b.set_member(target, &prop.name, value)?;
                                b.cont(labels);
                                Ok::<(), GenError>(())
                            })?;
                        }
                        skip(b, reader)
                    },
                )
            })?;
        }
        ShapeKind::List { element } | ShapeKind::Array { element } => {
            let element = *element;
            container(b, reader, JsonTokenType::StartArray, |b| {
                let created = b.construct(ty, &[], &[])?;
                b.assign(out, created)?;
                b.while_loop(
                    |b| Ok::<ExprId, GenError>(b.bool(true)),
                    |b, labels| {
                        advance_or_break(b, reader, JsonTokenType::EndArray, labels)?;
                        let item = cx.nested(element, || decode_value(cx, b, reader, element))?;
                        let target = b.local(out);
                        let add = b.call(target, "Add", &[item])?;
                        b.emit(add);
                        Ok::<(), GenError>(())
                    },
                )
            })?;
        }
        ShapeKind::Dictionary { key, value } => {
            if *key != TypeId::STRING {
                return Err(GenError::UnsupportedKeyType {
                    dictionary: shape.name.clone(),
                    key: cx.registry().name(*key),
                });
            }
            let value_ty = *value;
            container(b, reader, JsonTokenType::StartObject, |b| {
                let created = b.construct(ty, &[], &[])?;
                b.assign(out, created)?;
                b.while_loop(
                    |b| Ok::<ExprId, GenError>(b.bool(true)),
                    |b, labels| {
                        advance_or_break(b, reader, JsonTokenType::EndObject, labels)?;
                        let target = b.local(reader);
                        let key = b.call(target, "GetString", &[])?;
                        let key = b.var("key", key);
                        read(b, reader)?;
                        let item = cx.nested(value_ty, || decode_value(cx, b, reader, value_ty))?;
                        let target = b.local(out);
                        let key = b.local(key);
                        b.set_index(target, key, item)?;
                        Ok::<(), GenError>(())
                    },
                )
            })?;
        }
    }
    Ok(b.local(out))
}

/// `if token == start { body } else if token != null { reader.Skip() }`.
fn container<'r>(
    b: &mut Builder<'r>,
    reader: Var,
    start: JsonTokenType,
    body: impl FnOnce(&mut Builder<'r>) -> Result<(), GenError>,
) -> Result<(), GenError> {
    let opened = token_is(b, reader, BinaryOp::Eq, start)?;
    b.if_then_else(opened, body, |b| {
        let present = token_is(b, reader, BinaryOp::NotEq, JsonTokenType::Null)?;
        b.if_then(present, |b| skip(b, reader))
    })
}

/// Read the scalar under the reader as a `ty`.
fn read_leaf(b: &mut Builder<'_>, reader: Var, ty: TypeId) -> Result<ExprId, GenError> {
    let getter = match ScalarKind::underlying(ty) {
        Some(ScalarKind::Bool) => "GetBoolean",
        Some(k) if k.is_signed_int() => "GetInt64",
        Some(k) if k.is_unsigned_int() => "GetUInt64",
        Some(k) if k.is_float() => "GetDouble",
        // String, Char and DateTime travel as JSON strings.
        _ => "GetString",
    };
    let target = b.local(reader);
    let raw = b.call(target, getter, &[])?;
    Ok(b.convert(raw, ty))
}
