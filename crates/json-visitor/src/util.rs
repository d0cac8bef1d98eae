//! Path formatting and parsing helpers.

use crate::path::{Path, PathSegment};
use crate::pattern::tokenizer::{tokenize, TokenKind};
use crate::pattern::{parser, Element, PatternError};
use serde_json::Value;

/// Characters with a meaning in pattern syntax.
const SPECIAL: [char; 4] = ['\\', '.', '@', '*'];

/// Convert a path to its dotted textual form, e.g. `a.@0.c`.
///
/// The root path renders as the empty string. Property names are escaped so
/// the result compiles back into a pattern matching exactly this path.
pub fn format_path(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push('.');
        }
        match segment {
            PathSegment::Property(name) => out.push_str(&escape_property(name)),
            PathSegment::Index(index) => {
                out.push('@');
                out.push_str(&index.to_string());
            }
        }
    }
    out
}

/// Parse a dotted path such as `a.@0.c` back into segments.
///
/// Wildcards are rejected: a path names exactly one location.
pub fn parse_path(input: &str) -> Result<Path, PatternError> {
    let tokens = tokenize(input)?;
    if let Some(token) = tokens.iter().find(|t| t.kind == TokenKind::Wildcard) {
        return Err(PatternError::WildcardInPath {
            offset: token.offset,
        });
    }
    let elements = parser::parse(&tokens, input.chars().count())?;
    Ok(elements
        .into_iter()
        .filter_map(|element| match element {
            Element::Property(name) => Some(PathSegment::Property(name)),
            Element::Index(index) => Some(PathSegment::Index(index)),
            Element::AnyOne { .. } | Element::AnyDepth { .. } => None,
        })
        .collect())
}

/// Escape pattern syntax characters in a property name.
pub fn escape_property(name: &str) -> String {
    if !name.contains(SPECIAL) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 2);
    for ch in name.chars() {
        if SPECIAL.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Replace the element at `index` of a JSON array in place, returning the
/// previous element. `None` if `array` is not an array or `index` is out of
/// bounds; the array is left unchanged then.
pub fn array_set(array: &mut Value, index: usize, value: Value) -> Option<Value> {
    let slot = array.as_array_mut()?.get_mut(index)?;
    Some(std::mem::replace(slot, value))
}
