//! Token markup: the text message syntax exchanged with grammars
//!
//! The tokenizer/classifier grammar emits a sequence of
//! `tokens { ... }` messages and the default serializer prints a token's
//! payload in the same syntax for the verbalizer grammar:
//!
//! ```text
//! tokens { name: "5,7m" measure { decimal { integer_part: "5" } units: "meter" } }
//! tokens { name: "," pause_length: PAUSE_SHORT phrase_break: true type: PUNCT }
//! ```
//!
//! Scalars are either quoted strings (`\"`, `\\`, `\n` and `\t` escapes) or
//! bare symbols. A colon before a nested message is optional.

use super::token::{Field, Payload, Token, TokenType, Value};
use thiserror::Error;

/// Markup could not be parsed or printed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason} at byte {position}")]
pub struct MarkupError {
    /// Byte offset of the failure
    pub position: usize,
    /// What went wrong
    pub reason: String,
}

impl MarkupError {
    fn new(position: usize, reason: impl Into<String>) -> Self {
        Self {
            position,
            reason: reason.into(),
        }
    }
}

/// Parse a `tokens { ... }` sequence into classified tokens
///
/// The token type comes from an explicit `type` field if present; otherwise
/// a payload or verbatim reading makes it `SEMIOTIC_CLASS`, a word id makes
/// it `WORD`, and anything else is `PUNCT`.
pub fn parse_tokens(markup: &str) -> Result<Vec<Token>, MarkupError> {
    let mut parser = Parser::new(markup);
    let mut tokens = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.at_end() {
            break;
        }
        let start = parser.pos;
        let key = parser.identifier()?;
        if key != "tokens" {
            return Err(MarkupError::new(
                start,
                format!("expected `tokens`, found `{key}`"),
            ));
        }
        parser.open_message()?;
        let fields = parser.message_body()?;
        tokens.push(token_from_fields(fields, start)?);
    }
    Ok(tokens)
}

/// Parse a bare message body (no surrounding `tokens { }`) into a payload
pub fn parse_payload(markup: &str) -> Result<Payload, MarkupError> {
    let mut parser = Parser::new(markup);
    let payload = parser.fields_until(None)?;
    Ok(payload)
}

fn token_from_fields(fields: Payload, position: usize) -> Result<Token, MarkupError> {
    let mut token = Token::new(TokenType::Punct, "");
    let mut explicit_type = None;

    for (key, field) in fields.fields() {
        match key {
            "name" => token.name = scalar(key, field, position)?.to_string(),
            "wordid" => token.word_id = Some(scalar(key, field, position)?.to_string()),
            "verbatim" => token.verbatim = Some(scalar(key, field, position)?.to_string()),
            "pause_length" => {
                token.pause_length = Some(scalar(key, field, position)?.to_string())
            }
            "phrase_break" => token.phrase_break = boolean(key, field, position)?,
            "skip" => token.skip = boolean(key, field, position)?,
            "next_space" => token.next_space = Some(boolean(key, field, position)?),
            "type" => {
                let symbol = scalar(key, field, position)?;
                explicit_type = Some(TokenType::from_symbol(symbol).ok_or_else(|| {
                    MarkupError::new(position, format!("unknown token type `{symbol}`"))
                })?);
            }
            _ => token.payload.push(key, field.clone()),
        }
    }

    token.token_type = explicit_type.unwrap_or(if !token.payload.is_empty() || token.verbatim.is_some() {
        TokenType::SemioticClass
    } else if token.word_id.is_some() {
        TokenType::Word
    } else {
        TokenType::Punct
    });
    Ok(token)
}

fn scalar<'a>(key: &str, field: &'a Field, position: usize) -> Result<&'a str, MarkupError> {
    match field {
        Field::Scalar(value) => Ok(value.as_str()),
        Field::Message(_) => Err(MarkupError::new(
            position,
            format!("field `{key}` must be a scalar"),
        )),
    }
}

fn boolean(key: &str, field: &Field, position: usize) -> Result<bool, MarkupError> {
    match scalar(key, field, position)? {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(MarkupError::new(
            position,
            format!("field `{key}` expects a boolean, found `{other}`"),
        )),
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.bump();
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), MarkupError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            Some(ch) => Err(MarkupError::new(
                self.pos,
                format!("expected `{expected}`, found `{ch}`"),
            )),
            None => Err(MarkupError::new(
                self.pos,
                format!("expected `{expected}`, found end of input"),
            )),
        }
    }

    fn open_message(&mut self) -> Result<(), MarkupError> {
        self.skip_whitespace();
        if self.peek() == Some(':') {
            self.bump();
        }
        self.expect('{')
    }

    fn identifier(&mut self) -> Result<&'a str, MarkupError> {
        self.skip_whitespace();
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphanumeric() || ch == '_') {
            self.bump();
        }
        if start == self.pos {
            return Err(MarkupError::new(start, "expected a field name"));
        }
        Ok(&self.input[start..self.pos])
    }

    /// Fields up to the closing brace, which is consumed
    fn message_body(&mut self) -> Result<Payload, MarkupError> {
        self.fields_until(Some('}'))
    }

    fn fields_until(&mut self, close: Option<char>) -> Result<Payload, MarkupError> {
        let mut payload = Payload::new();
        loop {
            self.skip_whitespace();
            match (self.peek(), close) {
                (None, None) => return Ok(payload),
                (None, Some(c)) => {
                    return Err(MarkupError::new(
                        self.pos,
                        format!("unterminated message, expected `{c}`"),
                    ))
                }
                (Some(ch), Some(c)) if ch == c => {
                    self.bump();
                    return Ok(payload);
                }
                _ => {}
            }

            let name = self.identifier()?;
            self.skip_whitespace();
            match self.peek() {
                Some('{') => {
                    self.bump();
                    let inner = self.message_body()?;
                    payload.push(name, Field::Message(inner));
                }
                Some(':') => {
                    self.bump();
                    self.skip_whitespace();
                    if self.peek() == Some('{') {
                        self.bump();
                        let inner = self.message_body()?;
                        payload.push(name, Field::Message(inner));
                    } else {
                        let value = self.value()?;
                        payload.push(name, Field::Scalar(value));
                    }
                }
                _ => {
                    return Err(MarkupError::new(
                        self.pos,
                        format!("expected `:` or `{{` after `{name}`"),
                    ))
                }
            }
        }
    }

    fn value(&mut self) -> Result<Value, MarkupError> {
        if self.peek() == Some('"') {
            self.bump();
            return self.quoted().map(Value::Text);
        }
        let start = self.pos;
        while matches!(self.peek(), Some(ch) if ch.is_ascii_alphanumeric() || "_.+-".contains(ch))
        {
            self.bump();
        }
        if start == self.pos {
            return Err(MarkupError::new(start, "expected a value"));
        }
        Ok(Value::Symbol(self.input[start..self.pos].to_string()))
    }

    /// Quoted string body; the opening quote is already consumed
    fn quoted(&mut self) -> Result<String, MarkupError> {
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(value),
                Some('\\') => match self.bump() {
                    Some('n') => value.push('\n'),
                    Some('t') => value.push('\t'),
                    Some(ch) => value.push(ch),
                    None => break,
                },
                Some(ch) => value.push(ch),
                None => break,
            }
        }
        Err(MarkupError::new(self.pos, "unterminated string"))
    }
}

/// Print a payload as a message body
///
/// Fails if a field name is not an identifier, since such a name could not
/// be read back.
pub fn format_payload(payload: &Payload) -> Result<String, MarkupError> {
    let mut out = String::new();
    write_fields(payload, &mut out)?;
    Ok(out)
}

/// Print a token as a single `tokens { ... }` message, for diagnostics
pub fn format_token(token: &Token) -> String {
    let mut out = String::from("tokens {");
    out.push_str(&format!(" type: {}", token.token_type));
    out.push_str(" name: ");
    push_quoted(&token.name, &mut out);
    if let Some(id) = &token.word_id {
        out.push_str(" wordid: ");
        push_quoted(id, &mut out);
    }
    if let Some(verbatim) = &token.verbatim {
        out.push_str(" verbatim: ");
        push_quoted(verbatim, &mut out);
    }
    if token.phrase_break {
        out.push_str(" phrase_break: true");
    }
    if token.skip {
        out.push_str(" skip: true");
    }
    if !token.payload.is_empty() {
        out.push(' ');
        match format_payload(&token.payload) {
            Ok(body) => out.push_str(&body),
            Err(_) => out.push_str(&format!("{:?}", token.payload)),
        }
    }
    out.push_str(" }");
    out
}

fn write_fields(payload: &Payload, out: &mut String) -> Result<(), MarkupError> {
    for (i, (name, field)) in payload.fields().enumerate() {
        if !is_identifier(name) {
            return Err(MarkupError::new(
                out.len(),
                format!("field name `{name}` is not representable"),
            ));
        }
        if i > 0 {
            out.push(' ');
        }
        out.push_str(name);
        match field {
            Field::Scalar(Value::Text(text)) => {
                out.push_str(": ");
                push_quoted(text, out);
            }
            Field::Scalar(Value::Symbol(symbol)) => {
                out.push_str(": ");
                out.push_str(symbol);
            }
            Field::Message(inner) => {
                out.push_str(" { ");
                write_fields(inner, out)?;
                if !inner.is_empty() {
                    out.push(' ');
                }
                out.push('}');
            }
        }
    }
    Ok(())
}

/// Append `value` in double quotes with escapes
pub fn push_quoted(value: &str, out: &mut String) {
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
