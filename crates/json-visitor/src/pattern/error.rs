use super::tokenizer::TokenKind;
use thiserror::Error;

/// Pattern compilation failure. Every variant carries the character offset
/// of the offending input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Unexpected {found} at offset {offset}, expected {}", describe(.expected))]
    UnexpectedToken {
        found: TokenKind,
        expected: Vec<TokenKind>,
        offset: usize,
    },
    #[error("Expected array index after '@' at offset {offset}, got {value:?}")]
    InvalidIndex { value: String, offset: usize },
    #[error("Unexpected end of pattern at offset {offset}")]
    UnexpectedEnd { offset: usize },
    #[error("Dangling escape character at offset {offset}")]
    DanglingEscape { offset: usize },
    #[error("Wildcard at offset {offset} is not allowed in a concrete path")]
    WildcardInPath { offset: usize },
}

impl PatternError {
    /// Character offset of the offending input.
    pub fn offset(&self) -> usize {
        match self {
            PatternError::UnexpectedToken { offset, .. }
            | PatternError::InvalidIndex { offset, .. }
            | PatternError::UnexpectedEnd { offset }
            | PatternError::DanglingEscape { offset }
            | PatternError::WildcardInPath { offset } => *offset,
        }
    }
}

fn describe(kinds: &[TokenKind]) -> String {
    kinds
        .iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}
