//! Stream-driven front-end: builds the document from a token source while
//! firing events.

use super::lexer::Lexer;
use super::token::{Token, TokenSource};
use super::{Entry, Exit, Listener, NodeKind, VisitError};
use crate::config::StreamConfig;
use crate::path::PathSegment;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::{BufReader, Read};
use tracing::debug;

/// A node under construction.
#[derive(Debug)]
struct Frame {
    kind: NodeKind,
    /// Partially built value; the member value for a property frame.
    value: Value,
    property: Option<String>,
    position: Option<usize>,
    pushed_segment: bool,
    skipped: bool,
    /// Member names seen so far, detached ones included; objects only.
    names: HashSet<String>,
}

/// Pulls tokens, assembles the document bottom-up and reports every node as
/// soon as it is complete.
///
/// Skipped nodes receive no further events but are still built, so the
/// returned document is complete unless a listener detached something.
#[derive(Debug, Default)]
pub struct StreamVisitor {
    config: StreamConfig,
    frames: Vec<Frame>,
    path: Vec<PathSegment>,
    depth: usize,
}

impl StreamVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreamConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Traverse the document produced by `source` and return it.
    pub fn visit<S, L>(&mut self, mut source: S, listener: &mut L) -> Result<Value, VisitError>
    where
        S: TokenSource,
        L: Listener + ?Sized,
    {
        self.frames.clear();
        self.path.clear();
        self.depth = 0;
        debug!(max_depth = self.config.max_depth, "stream traversal");

        let mut root: Option<Value> = None;
        let mut consumed = 0usize;
        loop {
            let token = source.next_token()?;
            consumed += 1;
            let found = token.name();
            match token {
                Token::EndOfInput => {
                    if self.frames.is_empty() {
                        if let Some(document) = root.take() {
                            debug!(tokens = consumed, "stream traversal finished");
                            return Ok(document);
                        }
                    }
                    return Err(self.unexpected(found));
                }
                Token::Name(name) => {
                    if self.top_kind() != Some(NodeKind::Object) {
                        return Err(self.unexpected(found));
                    }
                    self.open_property(name, listener)?;
                }
                Token::EndObject => {
                    if self.top_kind() != Some(NodeKind::Object) {
                        return Err(self.unexpected(found));
                    }
                    self.close(listener, &mut root)?;
                }
                Token::EndArray => {
                    if self.top_kind() != Some(NodeKind::Array) {
                        return Err(self.unexpected(found));
                    }
                    self.close(listener, &mut root)?;
                }
                Token::BeginObject => {
                    self.expect_value(found, &root)?;
                    self.open_value(NodeKind::Object, Value::Object(Map::new()), listener)?;
                }
                Token::BeginArray => {
                    self.expect_value(found, &root)?;
                    self.open_value(NodeKind::Array, Value::Array(Vec::new()), listener)?;
                }
                Token::String(s) => self.scalar(found, Value::String(s), &mut root, listener)?,
                Token::Number(n) => self.scalar(found, Value::Number(n), &mut root, listener)?,
                Token::Bool(b) => self.scalar(found, Value::Bool(b), &mut root, listener)?,
                Token::Null => self.scalar(found, Value::Null, &mut root, listener)?,
            }
        }
    }

    /// Lex `json` incrementally and traverse it.
    pub fn visit_str<L: Listener + ?Sized>(
        &mut self,
        json: &str,
        listener: &mut L,
    ) -> Result<Value, VisitError> {
        self.visit(Lexer::new(json.as_bytes()), listener)
    }

    /// Traverse a document read from `reader`, buffered per the config.
    ///
    /// A `read_buffer` of 0 is treated as 1: an empty buffer would look like
    /// the end of input to the lexer.
    pub fn visit_reader<R: Read, L: Listener + ?Sized>(
        &mut self,
        reader: R,
        listener: &mut L,
    ) -> Result<Value, VisitError> {
        let reader = BufReader::with_capacity(self.config.read_buffer.max(1), reader);
        self.visit(Lexer::new(reader), listener)
    }

    fn top_kind(&self) -> Option<NodeKind> {
        self.frames.last().map(|frame| frame.kind)
    }

    fn unexpected(&self, found: &'static str) -> VisitError {
        VisitError::Structural {
            found,
            within: self.top_kind(),
        }
    }

    /// A value may start the document, fill an array slot or follow a
    /// member name.
    fn expect_value(&self, found: &'static str, root: &Option<Value>) -> Result<(), VisitError> {
        let allowed = match self.top_kind() {
            None => root.is_none(),
            Some(kind) => matches!(kind, NodeKind::Array | NodeKind::Property),
        };
        if allowed {
            Ok(())
        } else {
            Err(self.unexpected(found))
        }
    }

    fn scalar<L: Listener + ?Sized>(
        &mut self,
        found: &'static str,
        value: Value,
        root: &mut Option<Value>,
        listener: &mut L,
    ) -> Result<(), VisitError> {
        self.expect_value(found, root)?;
        self.open_value(NodeKind::of(&value), value, listener)?;
        self.close(listener, root)
    }

    fn open_value<L: Listener + ?Sized>(
        &mut self,
        kind: NodeKind,
        value: Value,
        listener: &mut L,
    ) -> Result<(), VisitError> {
        if kind.is_composite() {
            self.depth += 1;
            if self.depth > self.config.max_depth {
                return Err(VisitError::DepthLimit {
                    limit: self.config.max_depth,
                });
            }
        }

        let (property, position, inherited) = match self.frames.last() {
            Some(parent) if parent.kind == NodeKind::Array => {
                let position = parent.value.as_array().map_or(0, Vec::len);
                (None, Some(position), parent.skipped)
            }
            Some(parent) => (parent.property.clone(), None, parent.skipped),
            None => (None, None, false),
        };

        let pushed_segment = position.is_some();
        if let Some(position) = position {
            self.path.push(PathSegment::Index(position));
        }
        let skipped = inherited || self.enter(kind, listener)?;
        self.frames.push(Frame {
            kind,
            value,
            property,
            position,
            pushed_segment,
            skipped,
            names: HashSet::new(),
        });
        Ok(())
    }

    /// Open a member of the object on top of the stack. A name may appear
    /// only once per object.
    fn open_property<L: Listener + ?Sized>(
        &mut self,
        name: String,
        listener: &mut L,
    ) -> Result<(), VisitError> {
        let Some(parent) = self.frames.last_mut() else {
            return Err(self.unexpected("member name"));
        };
        if !parent.names.insert(name.clone()) {
            return Err(VisitError::Structural {
                found: "duplicate member name",
                within: Some(parent.kind),
            });
        }
        let inherited = parent.skipped;
        self.path.push(PathSegment::Property(name.clone()));
        let skipped = inherited || self.enter(NodeKind::Property, listener)?;
        self.frames.push(Frame {
            kind: NodeKind::Property,
            value: Value::Null,
            property: Some(name),
            position: None,
            pushed_segment: true,
            skipped,
            names: HashSet::new(),
        });
        Ok(())
    }

    /// Fire the enter event at the current path; returns whether the
    /// listener skipped the node.
    fn enter<L: Listener + ?Sized>(
        &self,
        kind: NodeKind,
        listener: &mut L,
    ) -> Result<bool, VisitError> {
        let mut entry = Entry::new(kind, &self.path);
        listener.on_enter(&mut entry)?;
        Ok(entry.is_skipped())
    }

    fn close<L: Listener + ?Sized>(
        &mut self,
        listener: &mut L,
        root: &mut Option<Value>,
    ) -> Result<(), VisitError> {
        let Some(mut frame) = self.frames.pop() else {
            return Ok(());
        };
        if frame.kind.is_composite() {
            self.depth -= 1;
        }

        let mut detached = false;
        if !frame.skipped {
            let mut exit = Exit::new(
                frame.kind,
                &self.path,
                &mut frame.value,
                frame.property.as_deref(),
                frame.position,
            );
            listener.on_exit(&mut exit)?;
            detached = exit.is_detached();
        }
        if frame.pushed_segment {
            self.path.pop();
        }
        self.fold(frame, detached, listener, root)
    }

    /// Hand a finished node to its parent.
    fn fold<L: Listener + ?Sized>(
        &mut self,
        frame: Frame,
        detached: bool,
        listener: &mut L,
        root: &mut Option<Value>,
    ) -> Result<(), VisitError> {
        let Some(parent) = self.frames.last_mut() else {
            *root = Some(frame.value);
            return Ok(());
        };
        if parent.kind == NodeKind::Property {
            // The member is complete as soon as its value is.
            parent.value = frame.value;
            return self.close(listener, root);
        }
        match &mut parent.value {
            Value::Array(items) => items.push(frame.value),
            Value::Object(map) => {
                if let (false, Some(name)) = (detached, frame.property) {
                    map.insert(name, frame.value);
                }
            }
            _ => {}
        }
        Ok(())
    }
}
