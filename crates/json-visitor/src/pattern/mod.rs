//! Path patterns.
//!
//! A pattern is a dot separated list of atoms:
//!
//! | atom    | matches                                  |
//! |---------|------------------------------------------|
//! | `name`  | the object member `name`                 |
//! | `@3`    | the array element at position 3          |
//! | `*`     | exactly one segment of any kind          |
//! | `**`    | zero or more segments of any kind        |
//!
//! `\` escapes the next character, so `a\.b` names the member `a.b`.
//!
//! Patterns are prefix constraints: once every atom has been satisfied the
//! remaining depth of the path is accepted. The empty pattern matches every
//! path, including the root.
//!
//! ```
//! use json_visitor::{Pattern, PathSegment};
//!
//! let pattern = Pattern::compile("store.**.price").unwrap();
//! let path = [
//!     PathSegment::property("store"),
//!     PathSegment::property("book"),
//!     PathSegment::index(0),
//!     PathSegment::property("price"),
//! ];
//! assert!(pattern.matches(&path));
//! ```

mod error;
pub(crate) mod parser;
pub mod tokenizer;

pub use error::PatternError;

use crate::path::PathSegment;
use std::fmt;
use std::str::FromStr;

/// A literal requirement on one path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Property(String),
    Index(usize),
}

impl Literal {
    pub fn accepts(&self, segment: &PathSegment) -> bool {
        match (self, segment) {
            (Literal::Property(expected), PathSegment::Property(name)) => expected == name,
            (Literal::Index(expected), PathSegment::Index(index)) => expected == index,
            _ => false,
        }
    }
}

impl From<Literal> for Element {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Property(name) => Element::Property(name),
            Literal::Index(index) => Element::Index(index),
        }
    }
}

/// One compiled pattern atom.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Element {
    Property(String),
    Index(usize),
    /// `*`: exactly one segment.
    AnyOne { terminal: Option<Literal> },
    /// `**`: zero or more segments, ended by `terminal`.
    AnyDepth { terminal: Option<Literal> },
}

/// Outcome of testing one element against one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Advance(usize),
    Stay,
    Fail,
}

impl Element {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Element::AnyOne { .. } | Element::AnyDepth { .. })
    }

    /// The literal a wildcard is bound to, if any.
    pub fn terminal(&self) -> Option<&Literal> {
        match self {
            Element::AnyOne { terminal } | Element::AnyDepth { terminal } => terminal.as_ref(),
            Element::Property(_) | Element::Index(_) => None,
        }
    }

    fn bind_terminal(&mut self, literal: Literal) {
        if let Element::AnyOne { terminal } | Element::AnyDepth { terminal } = self {
            *terminal = Some(literal);
        }
    }

    fn step(&self, segment: &PathSegment) -> Step {
        match self {
            Element::Property(name) => match segment {
                PathSegment::Property(other) if other == name => Step::Advance(1),
                _ => Step::Fail,
            },
            Element::Index(index) => match segment {
                PathSegment::Index(other) if other == index => Step::Advance(1),
                _ => Step::Fail,
            },
            // The terminal is not consulted here: `*` takes this segment and
            // the literal after it is checked against the next one.
            Element::AnyOne { .. } => Step::Advance(1),
            Element::AnyDepth { terminal } => match terminal {
                Some(literal) if literal.accepts(segment) => Step::Advance(2),
                _ => Step::Stay,
            },
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Property(name) => f.write_str(&crate::util::escape_property(name)),
            Element::Index(index) => write!(f, "@{}", index),
            Element::AnyOne { .. } => f.write_str("*"),
            Element::AnyDepth { .. } => f.write_str("**"),
        }
    }
}

/// A compiled pattern. Immutable and free of per-match state, so one value
/// can be shared by any number of threads and traversals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Pattern {
    elements: Vec<Element>,
}

impl Pattern {
    /// Compile a pattern string.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        let tokens = tokenizer::tokenize(pattern)?;
        let elements = parser::parse(&tokens, pattern.chars().count())?;
        tracing::debug!(pattern, elements = elements.len(), "compiled pattern");
        Ok(Self { elements })
    }

    /// The pattern that matches every path.
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Test a root-to-node path against this pattern.
    ///
    /// A single forward walk: a literal mismatch fails the whole match, there
    /// is no backtracking.
    pub fn matches(&self, path: &[PathSegment]) -> bool {
        let mut cursor = 0;
        for segment in path {
            let Some(element) = self.elements.get(cursor) else {
                return true;
            };
            match element.step(segment) {
                Step::Advance(n) => cursor += n,
                Step::Stay => {}
                Step::Fail => return false,
            }
        }
        cursor >= self.elements.len()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pattern::compile(s)
    }
}

impl TryFrom<&str> for Pattern {
    type Error = PatternError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Pattern::compile(value)
    }
}

/// Compile `pattern` and test `path` against it in one call.
pub fn matches(path: &[PathSegment], pattern: &str) -> Result<bool, PatternError> {
    Ok(Pattern::compile(pattern)?.matches(path))
}
