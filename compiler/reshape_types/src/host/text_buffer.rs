//! Growable text buffer used by the JSON encoder.

use crate::errors::{EvalError, EvalResult};

/// Append-only text buffer with tail removal.
///
/// Lengths and positions are counted in chars, not bytes.
#[derive(Clone, Debug, Default)]
pub struct TextBuffer {
    text: String,
    chars: usize,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, s: &str) {
        self.text.push_str(s);
        self.chars += s.chars().count();
    }

    pub fn append_char(&mut self, c: char) {
        self.text.push(c);
        self.chars += 1;
    }

    /// Append `s` as a quoted JSON string literal.
    pub fn append_json_string(&mut self, s: &str) {
        self.append_char('"');
        for c in s.chars() {
            match c {
                '"' => self.append("\\\""),
                '\\' => self.append("\\\\"),
                '\n' => self.append("\\n"),
                '\r' => self.append("\\r"),
                '\t' => self.append("\\t"),
                '\u{08}' => self.append("\\b"),
                '\u{0C}' => self.append("\\f"),
                c if u32::from(c) < 0x20 => self.append(&format!("\\u{:04x}", u32::from(c))),
                c => self.append_char(c),
            }
        }
        self.append_char('"');
    }

    /// Remove `count` chars starting at char position `start`.
    pub fn remove(&mut self, start: usize, count: usize) -> EvalResult<()> {
        let end = start
            .checked_add(count)
            .filter(|&end| end <= self.chars)
            .ok_or(EvalError::IndexOutOfRange {
                index: i64::try_from(start).unwrap_or(i64::MAX),
                len: self.chars,
            })?;
        let (from, to) = (self.byte_offset(start), self.byte_offset(end));
        self.text.replace_range(from..to, "");
        self.chars -= count;
        Ok(())
    }

    /// Byte offset of char position `pos`, walking from whichever end is
    /// closer so tail edits stay cheap.
    fn byte_offset(&self, pos: usize) -> usize {
        let from_end = self.chars.saturating_sub(pos);
        if from_end == 0 {
            self.text.len()
        } else if from_end <= pos {
            self.text
                .char_indices()
                .rev()
                .nth(from_end - 1)
                .map_or(0, |(i, _)| i)
        } else {
            self.text
                .char_indices()
                .nth(pos)
                .map_or(self.text.len(), |(i, _)| i)
        }
    }

    /// Length in chars.
    #[inline]
    pub fn len(&self) -> usize {
        self.chars
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chars == 0
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_and_remove_tail() {
        let mut buf = TextBuffer::new();
        buf.append("[1,2,");
        buf.remove(buf.len() - 1, 1).unwrap();
        buf.append_char(']');
        assert_eq!(buf.as_str(), "[1,2]");
        assert_eq!(buf.len(), 5);
    }

    #[test]
    fn remove_counts_chars_not_bytes() {
        let mut buf = TextBuffer::new();
        buf.append("héllo");
        buf.remove(1, 1).unwrap();
        assert_eq!(buf.as_str(), "hllo");
        assert_eq!(buf.len(), 4);
    }

    #[test]
    fn remove_near_the_tail_of_multibyte_text() {
        let mut buf = TextBuffer::new();
        buf.append("aé€b,ü");
        buf.remove(4, 1).unwrap();
        assert_eq!(buf.as_str(), "aé€bü");
        buf.remove(buf.len() - 1, 1).unwrap();
        assert_eq!(buf.as_str(), "aé€b");
        buf.remove(0, 2).unwrap();
        assert_eq!(buf.as_str(), "€b");
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn remove_past_end_is_an_error() {
        let mut buf = TextBuffer::new();
        buf.append("ab");
        assert!(buf.remove(1, 2).is_err());
        assert!(buf.remove(usize::MAX, 1).is_err());
        assert_eq!(buf.as_str(), "ab");
    }

    #[test]
    fn json_strings_are_escaped() {
        let mut buf = TextBuffer::new();
        buf.append_json_string("say \"hi\"\n\\\u{01}");
        assert_eq!(buf.as_str(), r#""say \"hi\"\n\\\u0001""#);
    }
}
