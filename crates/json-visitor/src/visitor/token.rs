//! Structural JSON tokens consumed by the stream-driven front-end.

use super::VisitError;
use serde_json::{Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    /// An object member name.
    Name(String),
    String(String),
    Number(Number),
    Bool(bool),
    Null,
    EndOfInput,
}

impl Token {
    pub fn name(&self) -> &'static str {
        match self {
            Token::BeginObject => "begin of object",
            Token::EndObject => "end of object",
            Token::BeginArray => "begin of array",
            Token::EndArray => "end of array",
            Token::Name(_) => "member name",
            Token::String(_) => "string",
            Token::Number(_) => "number",
            Token::Bool(_) => "boolean",
            Token::Null => "null",
            Token::EndOfInput => "end of input",
        }
    }
}

/// Pull-based supplier of tokens. Must keep returning
/// [`Token::EndOfInput`] once the input is exhausted.
pub trait TokenSource {
    fn next_token(&mut self) -> Result<Token, VisitError>;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    fn next_token(&mut self) -> Result<Token, VisitError> {
        (**self).next_token()
    }
}

/// Adapts any token iterator into a [`TokenSource`].
#[derive(Debug, Clone)]
pub struct Tokens<I> {
    iter: I,
}

impl<I: Iterator<Item = Token>> Tokens<I> {
    pub fn new(iter: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            iter: iter.into_iter(),
        }
    }
}

impl Tokens<std::vec::IntoIter<Token>> {
    /// Flatten an existing document into the token sequence a lexer would
    /// produce for it.
    pub fn from_value(value: &Value) -> Self {
        let mut out = Vec::new();
        push_value(value, &mut out);
        Tokens::new(out)
    }
}

impl<I: Iterator<Item = Token>> TokenSource for Tokens<I> {
    fn next_token(&mut self) -> Result<Token, VisitError> {
        Ok(self.iter.next().unwrap_or(Token::EndOfInput))
    }
}

fn push_value(value: &Value, out: &mut Vec<Token>) {
    match value {
        Value::Null => out.push(Token::Null),
        Value::Bool(b) => out.push(Token::Bool(*b)),
        Value::Number(n) => out.push(Token::Number(n.clone())),
        Value::String(s) => out.push(Token::String(s.clone())),
        Value::Array(items) => {
            out.push(Token::BeginArray);
            for item in items {
                push_value(item, out);
            }
            out.push(Token::EndArray);
        }
        Value::Object(map) => {
            out.push(Token::BeginObject);
            for (key, item) in map {
                out.push(Token::Name(key.clone()));
                push_value(item, out);
            }
            out.push(Token::EndObject);
        }
    }
}
