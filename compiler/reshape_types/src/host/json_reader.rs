//! Forward-only JSON token reader.
//!
//! The source is lexed up front with logos; structure (nesting, commas,
//! colons) is validated lazily as `read` walks the token list, so a
//! malformed document fails at the first offending token.

use std::ops::Range;

use logos::Logos;

use crate::errors::{json_error, EvalResult};

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,
    #[regex(r#""([^"\\\x00-\x1F]|\\(["\\/bfnrt]|u[0-9a-fA-F]{4}))*""#)]
    Str,
    #[regex(r"-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,
}

/// Token the reader is positioned on.
///
/// Generated decoders compare against `code()` as an `I32` constant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum JsonTokenType {
    None = 0,
    StartObject = 1,
    EndObject = 2,
    StartArray = 3,
    EndArray = 4,
    PropertyName = 5,
    String = 6,
    Number = 7,
    True = 8,
    False = 9,
    Null = 10,
}

impl JsonTokenType {
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

/// What the next structural token may be.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Expect {
    Value,
    ValueOrEnd,
    Key,
    KeyOrEnd,
    Colon,
    CommaOrEnd,
    Done,
}

pub struct JsonReader {
    source: String,
    /// Lexed tokens; `None` marks input logos could not match.
    tokens: Vec<(Option<RawToken>, Range<usize>)>,
    pos: usize,
    current: JsonTokenType,
    span: Range<usize>,
    stack: Vec<Container>,
    expect: Expect,
}

impl JsonReader {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut tokens = Vec::new();
        let mut lexer = RawToken::lexer(&source);
        while let Some(result) = lexer.next() {
            tokens.push((result.ok(), lexer.span()));
        }
        JsonReader {
            source,
            tokens,
            pos: 0,
            current: JsonTokenType::None,
            span: 0..0,
            stack: Vec::new(),
            expect: Expect::Value,
        }
    }

    #[inline]
    pub fn token_type(&self) -> JsonTokenType {
        self.current
    }

    /// Advance to the next token. Returns `false` once the top-level value
    /// has been fully read and no input remains.
    pub fn read(&mut self) -> EvalResult<bool> {
        loop {
            let Some((tok, span)) = self.tokens.get(self.pos).cloned() else {
                if self.expect == Expect::Done {
                    self.current = JsonTokenType::None;
                    return Ok(false);
                }
                return Err(json_error("unexpected end of input", self.source.len()));
            };
            self.pos += 1;
            let Some(tok) = tok else {
                return Err(json_error("unrecognized token", span.start));
            };
            let top = self.stack.last().copied();

            match (tok, self.expect) {
                (RawToken::Comma, Expect::CommaOrEnd) => {
                    self.expect = if top == Some(Container::Object) {
                        Expect::Key
                    } else {
                        Expect::Value
                    };
                }
                (RawToken::Colon, Expect::Colon) => self.expect = Expect::Value,
                (RawToken::RBrace, Expect::KeyOrEnd | Expect::CommaOrEnd)
                    if top == Some(Container::Object) =>
                {
                    self.stack.pop();
                    return Ok(self.finish_value(JsonTokenType::EndObject, span));
                }
                (RawToken::RBracket, Expect::ValueOrEnd | Expect::CommaOrEnd)
                    if top == Some(Container::Array) =>
                {
                    self.stack.pop();
                    return Ok(self.finish_value(JsonTokenType::EndArray, span));
                }
                (RawToken::Str, Expect::Key | Expect::KeyOrEnd) => {
                    self.expect = Expect::Colon;
                    return Ok(self.land(JsonTokenType::PropertyName, span));
                }
                (RawToken::LBrace, Expect::Value | Expect::ValueOrEnd) => {
                    self.stack.push(Container::Object);
                    self.expect = Expect::KeyOrEnd;
                    return Ok(self.land(JsonTokenType::StartObject, span));
                }
                (RawToken::LBracket, Expect::Value | Expect::ValueOrEnd) => {
                    self.stack.push(Container::Array);
                    self.expect = Expect::ValueOrEnd;
                    return Ok(self.land(JsonTokenType::StartArray, span));
                }
                (scalar, Expect::Value | Expect::ValueOrEnd) if scalar.is_scalar() => {
                    let kind = match scalar {
                        RawToken::Str => JsonTokenType::String,
                        RawToken::Number => JsonTokenType::Number,
                        RawToken::True => JsonTokenType::True,
                        RawToken::False => JsonTokenType::False,
                        _ => JsonTokenType::Null,
                    };
                    return Ok(self.finish_value(kind, span));
                }
                (other, _) => {
                    return Err(json_error(
                        format!("unexpected {}", other.describe()),
                        span.start,
                    ));
                }
            }
        }
    }

    fn land(&mut self, kind: JsonTokenType, span: Range<usize>) -> bool {
        self.current = kind;
        self.span = span;
        true
    }

    /// Land on a token that completes a value.
    fn finish_value(&mut self, kind: JsonTokenType, span: Range<usize>) -> bool {
        self.expect = if self.stack.is_empty() {
            Expect::Done
        } else {
            Expect::CommaOrEnd
        };
        self.land(kind, span)
    }

    fn slice(&self) -> &str {
        &self.source[self.span.clone()]
    }

    fn expect_current(&self, wanted: &[JsonTokenType], what: &str) -> EvalResult<()> {
        if wanted.contains(&self.current) {
            Ok(())
        } else {
            Err(json_error(
                format!("expected {what}, found {:?}", self.current),
                self.span.start,
            ))
        }
    }

    /// Unescaped text of the current string or property name.
    pub fn get_string(&self) -> EvalResult<String> {
        self.expect_current(
            &[JsonTokenType::String, JsonTokenType::PropertyName],
            "a string",
        )?;
        let raw = self.slice();
        unescape(&raw[1..raw.len() - 1], self.span.start)
    }

    pub fn get_i64(&self) -> EvalResult<i64> {
        self.expect_current(&[JsonTokenType::Number], "a number")?;
        self.slice()
            .parse()
            .map_err(|_| json_error("number is not a signed 64-bit integer", self.span.start))
    }

    pub fn get_u64(&self) -> EvalResult<u64> {
        self.expect_current(&[JsonTokenType::Number], "a number")?;
        self.slice()
            .parse()
            .map_err(|_| json_error("number is not an unsigned 64-bit integer", self.span.start))
    }

    pub fn get_f64(&self) -> EvalResult<f64> {
        self.expect_current(&[JsonTokenType::Number], "a number")?;
        self.slice()
            .parse()
            .map_err(|_| json_error("number is not a float", self.span.start))
    }

    pub fn get_bool(&self) -> EvalResult<bool> {
        match self.current {
            JsonTokenType::True => Ok(true),
            JsonTokenType::False => Ok(false),
            other => Err(json_error(
                format!("expected a boolean, found {other:?}"),
                self.span.start,
            )),
        }
    }

    /// Skip the current value. On a property name, skips the property's
    /// value; on a container start, skips to the matching end.
    pub fn skip(&mut self) -> EvalResult<()> {
        if self.current == JsonTokenType::PropertyName {
            self.read()?;
        }
        if matches!(
            self.current,
            JsonTokenType::StartObject | JsonTokenType::StartArray
        ) {
            let depth = self.stack.len();
            while self.stack.len() >= depth {
                if !self.read()? {
                    break;
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for JsonReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonReader")
            .field("current", &self.current)
            .field("offset", &self.span.start)
            .field("depth", &self.stack.len())
            .finish_non_exhaustive()
    }
}

impl RawToken {
    fn is_scalar(self) -> bool {
        matches!(
            self,
            RawToken::Str | RawToken::Number | RawToken::True | RawToken::False | RawToken::Null
        )
    }

    fn describe(self) -> &'static str {
        match self {
            RawToken::LBrace => "'{'",
            RawToken::RBrace => "'}'",
            RawToken::LBracket => "'['",
            RawToken::RBracket => "']'",
            RawToken::Colon => "':'",
            RawToken::Comma => "','",
            RawToken::True | RawToken::False => "boolean",
            RawToken::Null => "null",
            RawToken::Str => "string",
            RawToken::Number => "number",
        }
    }
}

/// Decode JSON escapes. `body` excludes the surrounding quotes; `offset` is
/// the byte position of the opening quote, for error reporting.
fn unescape(body: &str, offset: usize) -> EvalResult<String> {
    if !body.contains('\\') {
        return Ok(body.to_owned());
    }
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('b') => out.push('\u{08}'),
            Some('f') => out.push('\u{0C}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let high = hex4(&mut chars, offset)?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    // Surrogate pair: expect a `\uXXXX` low half.
                    let rest = chars.as_str();
                    if rest.starts_with("\\u") {
                        chars.nth(1);
                        let low = hex4(&mut chars, offset)?;
                        0x10000 + ((high - 0xD800) << 10) + (low.wrapping_sub(0xDC00) & 0x3FF)
                    } else {
                        high
                    }
                } else {
                    high
                };
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            _ => return Err(json_error("invalid escape sequence", offset)),
        }
    }
    Ok(out)
}

fn hex4(chars: &mut std::str::Chars<'_>, offset: usize) -> EvalResult<u32> {
    let digits: String = chars.by_ref().take(4).collect();
    if digits.len() != 4 {
        return Err(json_error("truncated unicode escape", offset));
    }
    u32::from_str_radix(&digits, 16).map_err(|_| json_error("invalid unicode escape", offset))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "tests use unwrap for brevity")]
mod tests;
