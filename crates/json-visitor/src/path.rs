//! Path model: the location of a node inside a JSON document.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One step from a parent node to a child node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathSegment {
    /// Object member access by name.
    Property(String),
    /// Array element access by position.
    Index(usize),
}

impl PathSegment {
    /// Create a property segment.
    pub fn property(name: impl Into<String>) -> Self {
        PathSegment::Property(name.into())
    }

    /// Create an index segment.
    pub fn index(index: usize) -> Self {
        PathSegment::Index(index)
    }

    pub fn as_property(&self) -> Option<&str> {
        match self {
            PathSegment::Property(name) => Some(name),
            PathSegment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Index(index) => Some(*index),
            PathSegment::Property(_) => None,
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Property(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Property(name)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Renders the segment in pattern syntax: `name` (escaped) or `@3`.
impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Property(name) => f.write_str(&crate::util::escape_property(name)),
            PathSegment::Index(index) => write!(f, "@{}", index),
        }
    }
}

/// An owned root-to-node path. The root node has the empty path.
pub type Path = Vec<PathSegment>;
