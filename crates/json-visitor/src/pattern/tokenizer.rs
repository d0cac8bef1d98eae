//! First compilation pass: split a pattern into delimiter and value tokens.

use super::error::PatternError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `.`
    Dot,
    /// `@`
    At,
    /// `*`
    Wildcard,
    /// Anything else, escapes resolved.
    Value,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Dot => f.write_str("'.'"),
            TokenKind::At => f.write_str("'@'"),
            TokenKind::Wildcard => f.write_str("'*'"),
            TokenKind::Value => f.write_str("name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Literal text for [`TokenKind::Value`], empty otherwise.
    pub value: String,
    /// Character offset of the token's first character.
    pub offset: usize,
}

impl Token {
    fn delimiter(kind: TokenKind, offset: usize) -> Self {
        Self {
            kind,
            value: String::new(),
            offset,
        }
    }
}

/// Tokenize a pattern. Offsets are counted in characters, not bytes.
pub fn tokenize(pattern: &str) -> Result<Vec<Token>, PatternError> {
    let mut tokens = Vec::new();
    let mut value = String::new();
    let mut value_start = 0;
    let mut escape_at: Option<usize> = None;

    for (i, ch) in pattern.chars().enumerate() {
        if escape_at.take().is_some() {
            if value.is_empty() {
                value_start = i - 1;
            }
            value.push(ch);
            continue;
        }

        let kind = match ch {
            '\\' => {
                escape_at = Some(i);
                continue;
            }
            '.' => TokenKind::Dot,
            '@' => TokenKind::At,
            '*' => TokenKind::Wildcard,
            _ => {
                if value.is_empty() {
                    value_start = i;
                }
                value.push(ch);
                continue;
            }
        };

        if !value.is_empty() {
            tokens.push(Token {
                kind: TokenKind::Value,
                value: std::mem::take(&mut value),
                offset: value_start,
            });
        }
        tokens.push(Token::delimiter(kind, i));
    }

    if let Some(offset) = escape_at {
        return Err(PatternError::DanglingEscape { offset });
    }
    if !value.is_empty() {
        tokens.push(Token {
            kind: TokenKind::Value,
            value,
            offset: value_start,
        });
    }

    Ok(tokens)
}
