//! JSON encoder and decoder generators.
//!
//! The encoder writes into a `TextBuffer` host object; the decoder drives a
//! forward-only `JsonReader`. Both walk the same shapes, so the property
//! order of an encoded record is the order the decoder expects to see.

mod decode;
mod encode;

pub use decode::json_decoder;
pub use encode::json_encoder;
pub(crate) use encode::emit_json_text;

use reshape_ir::{Builder, ExprId, Var};
use reshape_types::host::TextBuffer;

use crate::error::GenError;

/// `text` as a JSON string literal, computed at build time.
fn quoted(text: &str) -> String {
    let mut buf = TextBuffer::new();
    buf.append_json_string(text);
    buf.as_str().to_owned()
}

fn append_literal(b: &mut Builder<'_>, buf: Var, text: &str) -> Result<(), GenError> {
    let text = b.str(text);
    append(b, buf, "Append", text)
}

/// Emit `buf.<method>(value)` as a statement.
fn append(b: &mut Builder<'_>, buf: Var, method: &str, value: ExprId) -> Result<(), GenError> {
    let target = b.local(buf);
    let call = b.call(target, method, &[value])?;
    b.emit(call);
    Ok(())
}
