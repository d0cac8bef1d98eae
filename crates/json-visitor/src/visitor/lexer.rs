//! Incremental JSON lexer over any `BufRead`.
//!
//! Reads one byte at a time from the underlying buffer, so a document never
//! has to be held in memory as text. Structural punctuation (`,` and `:`) is
//! validated here and never surfaces as a token.

use super::token::{Token, TokenSource};
use super::VisitError;
use serde_json::Number;
use std::io::{self, BufRead};
use tracing::trace;

/// What the lexer is positioned inside of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    EmptyArray,
    NonEmptyArray,
    EmptyObject,
    /// A member name was read, its value is next.
    DanglingName,
    NonEmptyObject,
}

pub struct Lexer<R> {
    reader: R,
    offset: usize,
    scopes: Vec<Scope>,
    root_seen: bool,
}

impl<R: BufRead> Lexer<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            offset: 0,
            scopes: Vec::new(),
            root_seen: false,
        }
    }

    /// Byte offset of the next unread character.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn peek(&mut self) -> Result<Option<u8>, VisitError> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn bump(&mut self) {
        self.reader.consume(1);
        self.offset += 1;
    }

    fn next_byte(&mut self) -> Result<u8, VisitError> {
        match self.peek()? {
            Some(ch) => {
                self.bump();
                Ok(ch)
            }
            None => Err(self.syntax("unexpected end of input")),
        }
    }

    fn skip_whitespace(&mut self) -> Result<(), VisitError> {
        while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.peek()? {
            self.bump();
        }
        Ok(())
    }

    /// Skip whitespace and require more input.
    fn expect_more(&mut self) -> Result<u8, VisitError> {
        self.skip_whitespace()?;
        self.peek()?
            .ok_or_else(|| self.syntax("unexpected end of input"))
    }

    fn syntax(&self, message: &str) -> VisitError {
        VisitError::Syntax {
            offset: self.offset,
            message: message.to_string(),
        }
    }

    fn set_scope(&mut self, scope: Scope) {
        if let Some(top) = self.scopes.last_mut() {
            *top = scope;
        }
    }

    fn lex(&mut self) -> Result<Token, VisitError> {
        self.skip_whitespace()?;
        let Some(ch) = self.peek()? else {
            if self.scopes.is_empty() {
                return Ok(Token::EndOfInput);
            }
            return Err(self.syntax("unexpected end of input"));
        };

        match self.scopes.last().copied() {
            None => {
                if self.root_seen {
                    return Err(self.syntax("trailing characters"));
                }
                self.root_seen = true;
                self.read_value(ch)
            }
            Some(Scope::EmptyArray) => {
                if ch == b']' {
                    return Ok(self.close());
                }
                self.set_scope(Scope::NonEmptyArray);
                self.read_value(ch)
            }
            Some(Scope::NonEmptyArray) => match ch {
                b']' => Ok(self.close()),
                b',' => {
                    self.bump();
                    let ch = self.expect_more()?;
                    self.read_value(ch)
                }
                _ => Err(self.syntax("expected ',' or ']'")),
            },
            Some(Scope::EmptyObject) => {
                if ch == b'}' {
                    return Ok(self.close());
                }
                self.read_name(ch)
            }
            Some(Scope::NonEmptyObject) => match ch {
                b'}' => Ok(self.close()),
                b',' => {
                    self.bump();
                    let ch = self.expect_more()?;
                    self.read_name(ch)
                }
                _ => Err(self.syntax("expected ',' or '}'")),
            },
            Some(Scope::DanglingName) => {
                if ch != b':' {
                    return Err(self.syntax("expected ':'"));
                }
                self.bump();
                self.set_scope(Scope::NonEmptyObject);
                let ch = self.expect_more()?;
                self.read_value(ch)
            }
        }
    }

    fn close(&mut self) -> Token {
        self.bump();
        match self.scopes.pop() {
            Some(Scope::EmptyArray | Scope::NonEmptyArray) => Token::EndArray,
            _ => Token::EndObject,
        }
    }

    fn read_name(&mut self, ch: u8) -> Result<Token, VisitError> {
        if ch != b'"' {
            return Err(self.syntax("expected member name"));
        }
        let name = self.read_str()?;
        self.set_scope(Scope::DanglingName);
        Ok(Token::Name(name))
    }

    fn read_value(&mut self, ch: u8) -> Result<Token, VisitError> {
        match ch {
            b'{' => {
                self.bump();
                self.scopes.push(Scope::EmptyObject);
                Ok(Token::BeginObject)
            }
            b'[' => {
                self.bump();
                self.scopes.push(Scope::EmptyArray);
                Ok(Token::BeginArray)
            }
            b'"' => Ok(Token::String(self.read_str()?)),
            b't' => self.read_literal(b"true", Token::Bool(true)),
            b'f' => self.read_literal(b"false", Token::Bool(false)),
            b'n' => self.read_literal(b"null", Token::Null),
            b'-' | b'0'..=b'9' => self.read_num(),
            _ => Err(self.syntax("unexpected character")),
        }
    }

    fn read_literal(&mut self, word: &[u8], token: Token) -> Result<Token, VisitError> {
        let start = self.offset;
        for &expected in word {
            if self.next_byte()? != expected {
                return Err(VisitError::Syntax {
                    offset: start,
                    message: format!("expected '{}'", String::from_utf8_lossy(word)),
                });
            }
        }
        Ok(token)
    }

    fn read_num(&mut self) -> Result<Token, VisitError> {
        let start = self.offset;
        let mut raw = Vec::new();
        while let Some(ch @ (b'0'..=b'9' | b'-' | b'+' | b'.' | b'e' | b'E')) = self.peek()? {
            raw.push(ch);
            self.bump();
        }
        serde_json::from_slice::<Number>(&raw)
            .map(Token::Number)
            .map_err(|_| VisitError::Syntax {
                offset: start,
                message: format!("invalid number '{}'", String::from_utf8_lossy(&raw)),
            })
    }

    /// Read a quoted string, the cursor sitting on the opening quote.
    fn read_str(&mut self) -> Result<String, VisitError> {
        let start = self.offset;
        self.bump();
        let mut raw = Vec::new();
        let mut escaped = false;
        loop {
            match self.next_byte()? {
                b'"' => break,
                b'\\' => {
                    escaped = true;
                    raw.push(b'\\');
                    raw.push(self.next_byte()?);
                }
                ch => raw.push(ch),
            }
        }
        decode_str(raw, escaped).map_err(|message| VisitError::Syntax {
            offset: start,
            message,
        })
    }
}

/// Decode the bytes between the quotes of a JSON string.
fn decode_str(raw: Vec<u8>, escaped: bool) -> Result<String, String> {
    if !escaped {
        if raw.iter().any(|&b| b < 0x20) {
            return Err("control character in string".to_string());
        }
        return String::from_utf8(raw).map_err(|_| "invalid UTF-8 in string".to_string());
    }
    let mut quoted = Vec::with_capacity(raw.len() + 2);
    quoted.push(b'"');
    quoted.extend_from_slice(&raw);
    quoted.push(b'"');
    serde_json::from_slice::<String>(&quoted).map_err(|e| e.to_string())
}

impl<R: BufRead> TokenSource for Lexer<R> {
    fn next_token(&mut self) -> Result<Token, VisitError> {
        let token = self.lex()?;
        trace!(offset = self.offset, token = token.name(), "lexed");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::super::token::Tokens;
    use super::*;
    use serde_json::json;

    fn lex_all(input: &str) -> Result<Vec<Token>, VisitError> {
        let mut lexer = Lexer::new(input.as_bytes());
        let mut out = Vec::new();
        loop {
            match lexer.next_token()? {
                Token::EndOfInput => return Ok(out),
                token => out.push(token),
            }
        }
    }

    fn syntax_offset(input: &str) -> usize {
        match lex_all(input) {
            Err(VisitError::Syntax { offset, .. }) => offset,
            other => panic!("expected syntax error for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn lexes_nested_document() {
        let tokens = lex_all(r#" {"a": [1, -2.5e3, true], "b": {"c": null}, "d": "x"} "#).unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::BeginObject,
                Token::Name("a".into()),
                Token::BeginArray,
                Token::Number(1.into()),
                Token::Number(serde_json::Number::from_f64(-2500.0).unwrap()),
                Token::Bool(true),
                Token::EndArray,
                Token::Name("b".into()),
                Token::BeginObject,
                Token::Name("c".into()),
                Token::Null,
                Token::EndObject,
                Token::Name("d".into()),
                Token::String("x".into()),
                Token::EndObject,
            ]
        );
    }

    #[test]
    fn decodes_escapes() {
        let tokens = lex_all(r#"["a\"b", "\u00e9\n", "caf\u00e9 ok", "plain é"]"#).unwrap();
        assert_eq!(tokens[1], Token::String("a\"b".into()));
        assert_eq!(tokens[2], Token::String("é\n".into()));
        assert_eq!(tokens[3], Token::String("café ok".into()));
        assert_eq!(tokens[4], Token::String("plain é".into()));
    }

    #[test]
    fn scalars_at_top_level() {
        assert_eq!(lex_all("42").unwrap(), vec![Token::Number(42.into())]);
        assert_eq!(lex_all("\"s\"").unwrap(), vec![Token::String("s".into())]);
        assert_eq!(lex_all("[]").unwrap(), vec![Token::BeginArray, Token::EndArray]);
        assert_eq!(lex_all("{}").unwrap(), vec![Token::BeginObject, Token::EndObject]);
    }

    #[test]
    fn empty_input_ends_immediately() {
        assert!(lex_all("").unwrap().is_empty());
        assert!(lex_all("  \n").unwrap().is_empty());
    }

    #[test]
    fn reports_syntax_offsets() {
        assert_eq!(syntax_offset("[1,]"), 3);
        assert_eq!(syntax_offset("[1 2]"), 3);
        assert_eq!(syntax_offset(r#"{"a" 1}"#), 5);
        assert_eq!(syntax_offset(r#"{1: 2}"#), 1);
        assert_eq!(syntax_offset("1 2"), 2);
        assert_eq!(syntax_offset("[tru]"), 1);
        assert_eq!(syntax_offset("-"), 0);
        assert_eq!(syntax_offset("[1"), 2);
        assert_eq!(syntax_offset("\"abc"), 4);
    }

    #[test]
    fn rejects_raw_control_characters() {
        assert!(matches!(lex_all("\"a\tb\""), Err(VisitError::Syntax { offset: 0, .. })));
    }

    #[test]
    fn agrees_with_value_flattening() {
        let doc = json!({"k": [1, {"x": "y"}, [], {}], "n": null});
        let text = serde_json::to_string(&doc).unwrap();
        let mut flat = Tokens::from_value(&doc);
        let mut lexer = Lexer::new(text.as_bytes());
        loop {
            let expected = flat.next_token().unwrap();
            assert_eq!(lexer.next_token().unwrap(), expected);
            if expected == Token::EndOfInput {
                break;
            }
        }
    }
}
