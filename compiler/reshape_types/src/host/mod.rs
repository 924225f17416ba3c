//! Host objects: runtime helpers that generated code drives through
//! method calls rather than property access.

mod json_reader;
mod text_buffer;

pub use json_reader::{JsonReader, JsonTokenType};
pub use text_buffer::TextBuffer;

/// Closed set of host object kinds.
#[derive(Debug)]
pub enum HostObject {
    TextBuffer(TextBuffer),
    JsonReader(JsonReader),
}

impl HostObject {
    pub fn kind_name(&self) -> &'static str {
        match self {
            HostObject::TextBuffer(_) => "TextBuffer",
            HostObject::JsonReader(_) => "JsonReader",
        }
    }
}
