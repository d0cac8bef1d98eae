//! Depth-first enter/exit traversal.
//!
//! Both front-ends fire the same events:
//!
//! * [`TreeVisitor`] walks a `serde_json::Value` that already exists and can
//!   rewrite it in place;
//! * [`StreamVisitor`] drives the walk off a [`TokenSource`] and builds the
//!   document while it goes.
//!
//! Every node gets an enter event when it is reached and an exit event after
//! all of its children. Object members are reported as a synthetic
//! [`NodeKind::Property`] node wrapping the member value; the property node
//! and its value share the same path.
//!
//! ```text
//! {"a":{"b":1}}
//!
//! enter Object   []
//! enter Property [a]
//! enter Object   [a]
//! enter Property [a, b]
//! enter Number   [a, b]
//! exit  Number   [a, b]
//! exit  Property [a, b]
//! exit  Object   [a]
//! exit  Property [a]
//! exit  Object   []
//! ```
//!
//! Contexts handed to a [`Listener`] borrow the traversal's internal state and
//! are only valid for the duration of the callback.

mod error;
pub mod lexer;
pub mod stream;
pub mod token;
pub mod tree;

pub use error::VisitError;
pub use lexer::Lexer;
pub use stream::StreamVisitor;
pub use token::{Token, TokenSource, Tokens};
pub use tree::TreeVisitor;

use crate::path::PathSegment;
use crate::util::format_path;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    String,
    Number,
    Boolean,
    Null,
    Array,
    Object,
    /// An object member, wrapping the member value.
    Property,
}

impl NodeKind {
    /// Kind of a value node. Never returns [`NodeKind::Property`].
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => NodeKind::Null,
            Value::Bool(_) => NodeKind::Boolean,
            Value::Number(_) => NodeKind::Number,
            Value::String(_) => NodeKind::String,
            Value::Array(_) => NodeKind::Array,
            Value::Object(_) => NodeKind::Object,
        }
    }

    pub fn is_composite(self) -> bool {
        matches!(self, NodeKind::Array | NodeKind::Object)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Null => "null",
            NodeKind::Array => "array",
            NodeKind::Object => "object",
            NodeKind::Property => "property",
        };
        f.write_str(name)
    }
}

/// View of a node as it is entered.
#[derive(Debug)]
pub struct Entry<'a> {
    kind: NodeKind,
    path: &'a [PathSegment],
    skipped: bool,
}

impl<'a> Entry<'a> {
    pub(crate) fn new(kind: NodeKind, path: &'a [PathSegment]) -> Self {
        Self {
            kind,
            path,
            skipped: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn path(&self) -> &'a [PathSegment] {
        self.path
    }

    /// The path in dotted form, e.g. `a.@0.c`.
    pub fn path_string(&self) -> String {
        format_path(self.path)
    }

    /// Suppress every further event for this node and its descendants,
    /// including this node's own exit. The content is still consumed.
    pub fn skip(&mut self) -> Result<(), VisitError> {
        if self.skipped {
            return Err(VisitError::InvalidOperation("skip() called twice for one node"));
        }
        self.skipped = true;
        Ok(())
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped
    }
}

/// View of a node after all of its children have been processed.
#[derive(Debug)]
pub struct Exit<'a> {
    kind: NodeKind,
    path: &'a [PathSegment],
    value: &'a mut Value,
    property: Option<&'a str>,
    position: Option<usize>,
    detached: bool,
}

impl<'a> Exit<'a> {
    pub(crate) fn new(
        kind: NodeKind,
        path: &'a [PathSegment],
        value: &'a mut Value,
        property: Option<&'a str>,
        position: Option<usize>,
    ) -> Self {
        Self {
            kind,
            path,
            value,
            property,
            position,
            detached: false,
        }
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn path(&self) -> &'a [PathSegment] {
        self.path
    }

    pub fn path_string(&self) -> String {
        format_path(self.path)
    }

    /// The fully built node. For a property node this is the member value.
    pub fn value(&self) -> &Value {
        &*self.value
    }

    /// Name of the member this node belongs to: the member itself for a
    /// property node, the owning member for a member value, `None` otherwise.
    pub fn property_name(&self) -> Option<&'a str> {
        self.property
    }

    /// Position inside the owning array, `None` if the parent is not an array.
    pub fn array_position(&self) -> Option<usize> {
        self.position
    }

    /// Remove this node from its parent and hand back the original value.
    ///
    /// Array elements and member values are replaced by `null`; a property
    /// node is dropped from its object together with its key; the root
    /// document becomes `null`.
    pub fn detach(&mut self) -> Result<Value, VisitError> {
        if self.detached {
            return Err(VisitError::InvalidOperation("detach() called twice for one node"));
        }
        self.detached = true;
        Ok(std::mem::take(&mut *self.value))
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }

    /// Deserialize the built value into `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, VisitError> {
        Ok(T::deserialize(&*self.value)?)
    }
}

/// Receives traversal events. Returning an error aborts the traversal and
/// propagates the error to the caller.
pub trait Listener {
    fn on_enter(&mut self, entry: &mut Entry<'_>) -> Result<(), VisitError> {
        let _ = entry;
        Ok(())
    }

    fn on_exit(&mut self, exit: &mut Exit<'_>) -> Result<(), VisitError> {
        let _ = exit;
        Ok(())
    }
}

impl<L: Listener + ?Sized> Listener for &mut L {
    fn on_enter(&mut self, entry: &mut Entry<'_>) -> Result<(), VisitError> {
        (**self).on_enter(entry)
    }

    fn on_exit(&mut self, exit: &mut Exit<'_>) -> Result<(), VisitError> {
        (**self).on_exit(exit)
    }
}

/// A [`Listener`] made of two closures, see [`listener_fn`].
pub struct FnListener<E, X> {
    enter: E,
    exit: X,
}

impl<E, X> Listener for FnListener<E, X>
where
    E: FnMut(&mut Entry<'_>) -> Result<(), VisitError>,
    X: FnMut(&mut Exit<'_>) -> Result<(), VisitError>,
{
    fn on_enter(&mut self, entry: &mut Entry<'_>) -> Result<(), VisitError> {
        (self.enter)(entry)
    }

    fn on_exit(&mut self, exit: &mut Exit<'_>) -> Result<(), VisitError> {
        (self.exit)(exit)
    }
}

/// Build a listener from an enter closure and an exit closure.
pub fn listener_fn<E, X>(enter: E, exit: X) -> FnListener<E, X>
where
    E: FnMut(&mut Entry<'_>) -> Result<(), VisitError>,
    X: FnMut(&mut Exit<'_>) -> Result<(), VisitError>,
{
    FnListener { enter, exit }
}
