//! Incremental JSON tokenizer
//!
//! Bytes are pushed in arbitrary chunks with [`JsonTokenizer::feed`]; events
//! are pulled with [`JsonTokenizer::next_event`], which returns `None` as soon
//! as the buffered input does not contain a complete token.

use serde_json::Number;
use std::str::FromStr;

use super::error::{JsonLdError, JsonLdErrorCode, JsonLdResult, TextPosition};

/// A JSON scalar
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
}

impl From<Scalar> for serde_json::Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => serde_json::Value::Null,
            Scalar::Bool(b) => serde_json::Value::Bool(b),
            Scalar::Number(n) => serde_json::Value::Number(n),
            Scalar::String(s) => serde_json::Value::String(s),
        }
    }
}

/// Tokenizer event
#[derive(Debug, Clone, PartialEq)]
pub enum JsonEvent {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    Key(String),
    Value(Scalar),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Root value, after `:` or after `,` in an array
    Value,
    /// Right after `[`
    ValueOrEnd,
    /// Right after `{`
    KeyOrEnd,
    /// After `,` in an object
    Key,
    Colon,
    CommaOrEnd,
    Finished,
}

/// Resumable scan over a partially received string
#[derive(Debug, Clone, Copy, Default)]
struct StringScan {
    offset: usize,
    escaped: bool,
}

pub struct JsonTokenizer {
    buffer: Vec<u8>,
    pos: usize,
    position: TextPosition,
    stack: Vec<Container>,
    state: State,
    scan: StringScan,
    eof: bool,
    bom_checked: bool,
}

impl Default for JsonTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonTokenizer {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            pos: 0,
            position: TextPosition { line: 1, column: 1, offset: 0 },
            stack: Vec::new(),
            state: State::Value,
            scan: StringScan::default(),
            eof: false,
            bom_checked: false,
        }
    }

    /// Append a chunk of input
    pub fn feed(&mut self, chunk: &[u8]) {
        if self.pos > 0 {
            self.buffer.drain(..self.pos);
            self.pos = 0;
        }
        self.buffer.extend_from_slice(chunk);
    }

    /// Mark the end of input
    pub fn end(&mut self) {
        self.eof = true;
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Check that a complete document was read; call after `end` and draining events
    pub fn finish(&self) -> JsonLdResult<()> {
        if self.state == State::Finished {
            return Ok(());
        }
        if self.stack.is_empty() && self.state == State::Value {
            return Err(self.error(JsonLdErrorCode::SyntaxError, "empty document"));
        }
        Err(self.error(
            JsonLdErrorCode::UnclosedDocument,
            format!("input ended inside {} open structure(s)", self.stack.len().max(1)),
        ))
    }

    /// Next event, or `None` when more input is needed (or the document is complete)
    pub fn next_event(&mut self) -> JsonLdResult<Option<(JsonEvent, TextPosition)>> {
        if !self.bom_checked {
            if self.buffer.len() - self.pos < 3 && !self.eof {
                return Ok(None);
            }
            if self.buffer[self.pos..].starts_with(&[0xEF, 0xBB, 0xBF]) {
                self.pos += 3;
                self.position.offset += 3;
            }
            self.bom_checked = true;
        }
        loop {
            self.skip_whitespace();
            let Some(&byte) = self.buffer.get(self.pos) else {
                return Ok(None);
            };
            let start = self.position;
            match self.state {
                State::Finished => {
                    return Err(self.error(JsonLdErrorCode::SyntaxError, "trailing content after document"));
                }
                State::Colon => {
                    if byte != b':' {
                        return Err(self.unexpected(byte, "':'"));
                    }
                    self.advance(1);
                    self.state = State::Value;
                }
                State::CommaOrEnd => match (byte, self.stack.last()) {
                    (b',', Some(Container::Object)) => {
                        self.advance(1);
                        self.state = State::Key;
                    }
                    (b',', Some(Container::Array)) => {
                        self.advance(1);
                        self.state = State::Value;
                    }
                    (b'}', Some(Container::Object)) => {
                        self.advance(1);
                        self.close();
                        return Ok(Some((JsonEvent::EndObject, start)));
                    }
                    (b']', Some(Container::Array)) => {
                        self.advance(1);
                        self.close();
                        return Ok(Some((JsonEvent::EndArray, start)));
                    }
                    _ => return Err(self.unexpected(byte, "',' or a closing bracket")),
                },
                State::KeyOrEnd | State::Key => {
                    if byte == b'}' && self.state == State::KeyOrEnd {
                        self.advance(1);
                        self.close();
                        return Ok(Some((JsonEvent::EndObject, start)));
                    }
                    if byte != b'"' {
                        return Err(self.unexpected(byte, "an object key"));
                    }
                    let Some(key) = self.read_string()? else {
                        return Ok(None);
                    };
                    self.state = State::Colon;
                    return Ok(Some((JsonEvent::Key(key), start)));
                }
                State::Value | State::ValueOrEnd => {
                    if byte == b']' && self.state == State::ValueOrEnd {
                        self.advance(1);
                        self.close();
                        return Ok(Some((JsonEvent::EndArray, start)));
                    }
                    let event = match byte {
                        b'{' => {
                            self.advance(1);
                            self.stack.push(Container::Object);
                            self.state = State::KeyOrEnd;
                            return Ok(Some((JsonEvent::StartObject, start)));
                        }
                        b'[' => {
                            self.advance(1);
                            self.stack.push(Container::Array);
                            self.state = State::ValueOrEnd;
                            return Ok(Some((JsonEvent::StartArray, start)));
                        }
                        b'"' => match self.read_string()? {
                            Some(s) => Scalar::String(s),
                            None => return Ok(None),
                        },
                        b'-' | b'0'..=b'9' => match self.read_number()? {
                            Some(n) => Scalar::Number(n),
                            None => return Ok(None),
                        },
                        b't' => match self.read_literal(b"true")? {
                            true => Scalar::Bool(true),
                            false => return Ok(None),
                        },
                        b'f' => match self.read_literal(b"false")? {
                            true => Scalar::Bool(false),
                            false => return Ok(None),
                        },
                        b'n' => match self.read_literal(b"null")? {
                            true => Scalar::Null,
                            false => return Ok(None),
                        },
                        _ => return Err(self.unexpected(byte, "a value")),
                    };
                    self.after_value();
                    return Ok(Some((JsonEvent::Value(event), start)));
                }
            }
        }
    }

    fn close(&mut self) {
        self.stack.pop();
        self.after_value();
    }

    fn after_value(&mut self) {
        self.state = if self.stack.is_empty() {
            State::Finished
        } else {
            State::CommaOrEnd
        };
    }

    fn skip_whitespace(&mut self) {
        while let Some(&b) = self.buffer.get(self.pos) {
            if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                self.advance(1);
            } else {
                break;
            }
        }
    }

    fn advance(&mut self, n: usize) {
        for &b in &self.buffer[self.pos..self.pos + n] {
            self.position.offset += 1;
            if b == b'\n' {
                self.position.line += 1;
                self.position.column = 1;
            } else if b & 0xC0 != 0x80 {
                self.position.column += 1;
            }
        }
        self.pos += n;
    }

    fn read_string(&mut self) -> JsonLdResult<Option<String>> {
        let body_start = self.pos + 1;
        let mut i = body_start + self.scan.offset;
        let mut escaped = self.scan.escaped;
        let end = loop {
            let Some(&b) = self.buffer.get(i) else {
                if self.eof {
                    return Err(self.error(JsonLdErrorCode::UnclosedDocument, "unterminated string"));
                }
                self.scan = StringScan { offset: i - body_start, escaped };
                return Ok(None);
            };
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                break i;
            } else if b < 0x20 {
                return Err(self.error(JsonLdErrorCode::SyntaxError, "control character in string"));
            }
            i += 1;
        };
        self.scan = StringScan::default();
        let decoded = unescape(&self.buffer[body_start..end])
            .map_err(|message| self.error(JsonLdErrorCode::SyntaxError, message))?;
        self.advance(end + 1 - self.pos);
        Ok(Some(decoded))
    }

    fn read_number(&mut self) -> JsonLdResult<Option<Number>> {
        let mut end = self.pos;
        while let Some(&b) = self.buffer.get(end) {
            if b.is_ascii_digit() || matches!(b, b'-' | b'+' | b'.' | b'e' | b'E') {
                end += 1;
            } else {
                break;
            }
        }
        if end == self.buffer.len() && !self.eof {
            return Ok(None);
        }
        let lexeme = std::str::from_utf8(&self.buffer[self.pos..end])
            .map_err(|_| self.error(JsonLdErrorCode::SyntaxError, "invalid number"))?;
        let number = Number::from_str(lexeme).map_err(|_| {
            self.error(JsonLdErrorCode::SyntaxError, format!("invalid number '{}'", lexeme))
        })?;
        self.advance(end - self.pos);
        Ok(Some(number))
    }

    fn read_literal(&mut self, expected: &[u8]) -> JsonLdResult<bool> {
        let available = &self.buffer[self.pos..];
        let n = available.len().min(expected.len());
        if available[..n] != expected[..n] {
            return Err(self.error(JsonLdErrorCode::SyntaxError, "invalid literal"));
        }
        if n < expected.len() {
            if self.eof {
                return Err(self.error(JsonLdErrorCode::UnclosedDocument, "truncated literal"));
            }
            return Ok(false);
        }
        self.advance(expected.len());
        Ok(true)
    }

    fn unexpected(&self, byte: u8, expected: &str) -> JsonLdError {
        self.error(
            JsonLdErrorCode::SyntaxError,
            format!("unexpected '{}', expected {}", char::from(byte).escape_default(), expected),
        )
    }

    fn error(&self, code: JsonLdErrorCode, message: impl Into<String>) -> JsonLdError {
        JsonLdError::new(code, message).at(Some(self.position))
    }
}

fn unescape(raw: &[u8]) -> Result<String, String> {
    if !raw.contains(&b'\\') {
        return String::from_utf8(raw.to_vec()).map_err(|_| "invalid UTF-8 in string".to_owned());
    }
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }
        let Some(&escape) = raw.get(i + 1) else {
            return Err("dangling escape".to_owned());
        };
        i += 2;
        let c = match escape {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let high = hex4(raw, i)?;
                i += 4;
                if (0xD800..0xDC00).contains(&high) {
                    if raw.get(i) != Some(&b'\\') || raw.get(i + 1) != Some(&b'u') {
                        return Err("unpaired surrogate".to_owned());
                    }
                    let low = hex4(raw, i + 2)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err("invalid low surrogate".to_owned());
                    }
                    i += 6;
                    let code = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
                    char::from_u32(code).ok_or("invalid code point")?
                } else {
                    char::from_u32(high).ok_or("unpaired surrogate")?
                }
            }
            other => return Err(format!("invalid escape '\\{}'", char::from(other))),
        };
        let mut utf8 = [0; 4];
        out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }
    String::from_utf8(out).map_err(|_| "invalid UTF-8 in string".to_owned())
}

fn hex4(raw: &[u8], at: usize) -> Result<u32, String> {
    let digits = raw.get(at..at + 4).ok_or("truncated unicode escape")?;
    let text = std::str::from_utf8(digits).map_err(|_| "invalid unicode escape")?;
    u32::from_str_radix(text, 16).map_err(|_| "invalid unicode escape".to_owned())
}

/// Tokenize a complete document; used by the synchronous entry points
pub fn tokenize_all(input: &[u8]) -> JsonLdResult<Vec<(JsonEvent, TextPosition)>> {
    let mut tokenizer = JsonTokenizer::new();
    tokenizer.feed(input);
    tokenizer.end();
    let mut events = Vec::new();
    while let Some(event) = tokenizer.next_event()? {
        events.push(event);
    }
    tokenizer.finish()?;
    Ok(events)
}
