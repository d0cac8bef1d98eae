//! Second compilation pass: an expected-token-set state machine over the
//! token list.

use super::error::PatternError;
use super::tokenizer::{Token, TokenKind};
use super::{Element, Literal};

const ATOM_START: &[TokenKind] = &[TokenKind::Wildcard, TokenKind::Value, TokenKind::At];
const AFTER_AT: &[TokenKind] = &[TokenKind::Value];
const AFTER_ATOM: &[TokenKind] = &[TokenKind::Dot];
const AFTER_WILDCARD: &[TokenKind] = &[TokenKind::Wildcard, TokenKind::Dot];

/// Build the element list. `end_offset` is reported when the pattern stops
/// in the middle of an atom.
pub(crate) fn parse(tokens: &[Token], end_offset: usize) -> Result<Vec<Element>, PatternError> {
    let mut elements: Vec<Element> = Vec::new();
    let mut expected = ATOM_START;
    // Wildcards since the last literal; they all get bound to the next one.
    let mut awaiting_terminal: Vec<usize> = Vec::new();
    let mut index_marker = false;
    let mut open_wildcard = false;

    for token in tokens {
        if !expected.contains(&token.kind) {
            return Err(PatternError::UnexpectedToken {
                found: token.kind,
                expected: expected.to_vec(),
                offset: token.offset,
            });
        }

        match token.kind {
            TokenKind::At => {
                index_marker = true;
                expected = AFTER_AT;
            }
            TokenKind::Dot => {
                if open_wildcard {
                    open_wildcard = false;
                    awaiting_terminal.push(elements.len());
                    elements.push(Element::AnyOne { terminal: None });
                }
                expected = ATOM_START;
            }
            TokenKind::Value => {
                let literal = if index_marker {
                    Literal::Index(parse_index(token)?)
                } else {
                    Literal::Property(token.value.clone())
                };
                index_marker = false;
                for i in awaiting_terminal.drain(..) {
                    elements[i].bind_terminal(literal.clone());
                }
                elements.push(literal.into());
                expected = AFTER_ATOM;
            }
            TokenKind::Wildcard => {
                if open_wildcard {
                    open_wildcard = false;
                    awaiting_terminal.push(elements.len());
                    elements.push(Element::AnyDepth { terminal: None });
                    expected = AFTER_ATOM;
                } else {
                    open_wildcard = true;
                    expected = AFTER_WILDCARD;
                }
            }
        }
    }

    if expected == AFTER_AT || (expected == ATOM_START && !tokens.is_empty()) {
        return Err(PatternError::UnexpectedEnd { offset: end_offset });
    }

    // A trailing wildcard run never gets a terminal and cannot reject
    // anything: a fully satisfied pattern accepts any suffix.
    while elements.last().is_some_and(Element::is_wildcard) {
        elements.pop();
    }

    Ok(elements)
}

fn parse_index(token: &Token) -> Result<usize, PatternError> {
    let invalid = || PatternError::InvalidIndex {
        value: token.value.clone(),
        offset: token.offset,
    };
    if !token.value.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    token.value.parse::<usize>().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::super::tokenizer::tokenize;
    use super::*;

    fn compile(pattern: &str) -> Result<Vec<Element>, PatternError> {
        parse(&tokenize(pattern)?, pattern.chars().count())
    }

    #[test]
    fn binds_terminal_to_preceding_wildcards() {
        let elements = compile("**.x").unwrap();
        assert_eq!(
            elements,
            vec![
                Element::AnyDepth {
                    terminal: Some(Literal::Property("x".into()))
                },
                Element::Property("x".into()),
            ]
        );

        let elements = compile("a.*.**.@2").unwrap();
        assert_eq!(elements.len(), 4);
        assert_eq!(elements[1].terminal(), Some(&Literal::Index(2)));
        assert_eq!(elements[2].terminal(), Some(&Literal::Index(2)));
    }

    #[test]
    fn strips_trailing_wildcards() {
        assert_eq!(compile("foo.*").unwrap(), vec![Element::Property("foo".into())]);
        assert_eq!(compile("foo.**").unwrap(), vec![Element::Property("foo".into())]);
        assert_eq!(compile("foo.*.**").unwrap(), vec![Element::Property("foo".into())]);
        assert!(compile("**").unwrap().is_empty());
        assert!(compile("*").unwrap().is_empty());
    }

    #[test]
    fn reports_offsets() {
        assert_eq!(compile(".x").unwrap_err().offset(), 0);
        assert_eq!(compile("a..b").unwrap_err().offset(), 2);
        assert_eq!(compile("@@").unwrap_err().offset(), 1);
        assert_eq!(compile("@4@2").unwrap_err().offset(), 2);
        assert_eq!(compile("a.***").unwrap_err().offset(), 4);
        assert_eq!(compile("foo*").unwrap_err().offset(), 3);
    }

    #[test]
    fn rejects_non_numeric_index() {
        assert_eq!(
            compile("a.@x1"),
            Err(PatternError::InvalidIndex {
                value: "x1".into(),
                offset: 3
            })
        );
        assert!(matches!(compile("@+1"), Err(PatternError::InvalidIndex { .. })));
    }

    #[test]
    fn rejects_unfinished_atoms() {
        assert_eq!(compile("foo."), Err(PatternError::UnexpectedEnd { offset: 4 }));
        assert_eq!(compile("a.@"), Err(PatternError::UnexpectedEnd { offset: 3 }));
    }
}
