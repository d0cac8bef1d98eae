//! Tree-driven front-end: walks a document that is already in memory.

use super::{Entry, Exit, Listener, NodeKind, StreamVisitor, VisitError};
use crate::config::StreamConfig;
use crate::path::PathSegment;
use serde_json::Value;
use tracing::debug;

/// Walks a `serde_json::Value` depth first, members in document order.
///
/// The visitor only owns the scratch path buffer, so one instance can be
/// reused for any number of documents.
#[derive(Debug)]
pub struct TreeVisitor {
    path: Vec<PathSegment>,
    max_depth: usize,
}

impl Default for TreeVisitor {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            max_depth: StreamConfig::DEFAULT_MAX_DEPTH,
        }
    }
}

impl TreeVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deepest nesting of arrays and objects the walk descends into; the
    /// root container counts as depth 1.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Traverse `document`, applying any detaches in place.
    pub fn visit<L: Listener + ?Sized>(
        &mut self,
        document: &mut Value,
        listener: &mut L,
    ) -> Result<(), VisitError> {
        self.path.clear();
        debug!(root = %NodeKind::of(document), max_depth = self.max_depth, "tree traversal");
        let mut walk = Walk {
            path: &mut self.path,
            listener,
            max_depth: self.max_depth,
        };
        let result = walk.value(document, None, None, 0);
        self.path.clear();
        result
    }

    /// Parse `json` and traverse the parsed document, returning it afterwards.
    ///
    /// The text goes through the same lexer as [`StreamVisitor`], so both
    /// front-ends accept and reject exactly the same inputs, repeated member
    /// names included.
    pub fn visit_str<L: Listener + ?Sized>(
        &mut self,
        json: &str,
        listener: &mut L,
    ) -> Result<Value, VisitError> {
        let config = StreamConfig::default().with_max_depth(self.max_depth);
        let mut document = StreamVisitor::with_config(config).visit_str(json, &mut Parse)?;
        self.visit(&mut document, listener)?;
        Ok(document)
    }
}

/// Listener that only lets the stream visitor build the document.
struct Parse;

impl Listener for Parse {}

struct Walk<'w, L: ?Sized> {
    path: &'w mut Vec<PathSegment>,
    listener: &'w mut L,
    max_depth: usize,
}

impl<L: Listener + ?Sized> Walk<'_, L> {
    fn value(
        &mut self,
        value: &mut Value,
        property: Option<&str>,
        position: Option<usize>,
        depth: usize,
    ) -> Result<(), VisitError> {
        let kind = NodeKind::of(value);
        let depth = if kind.is_composite() { depth + 1 } else { depth };
        if depth > self.max_depth {
            return Err(VisitError::DepthLimit {
                limit: self.max_depth,
            });
        }

        let mut entry = Entry::new(kind, self.path.as_slice());
        self.listener.on_enter(&mut entry)?;
        if entry.is_skipped() {
            return Ok(());
        }

        match value {
            Value::Object(map) => {
                let mut detached = Vec::new();
                for (key, child) in map.iter_mut() {
                    self.path.push(PathSegment::Property(key.clone()));
                    let result = self.property(key, child, depth);
                    self.path.pop();
                    if result? {
                        detached.push(key.clone());
                    }
                }
                if !detached.is_empty() {
                    map.retain(|key, _| !detached.contains(key));
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter_mut().enumerate() {
                    self.path.push(PathSegment::Index(i));
                    let result = self.value(child, None, Some(i), depth);
                    self.path.pop();
                    result?;
                }
            }
            _ => {}
        }

        let mut exit = Exit::new(kind, self.path.as_slice(), value, property, position);
        self.listener.on_exit(&mut exit)
    }

    /// Returns whether the member was detached and must leave its object.
    fn property(&mut self, key: &str, value: &mut Value, depth: usize) -> Result<bool, VisitError> {
        let mut entry = Entry::new(NodeKind::Property, self.path.as_slice());
        self.listener.on_enter(&mut entry)?;
        if entry.is_skipped() {
            return Ok(false);
        }

        self.value(value, Some(key), None, depth)?;

        let mut exit = Exit::new(NodeKind::Property, self.path.as_slice(), value, Some(key), None);
        self.listener.on_exit(&mut exit)?;
        Ok(exit.is_detached())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visitor::listener_fn;
    use serde_json::json;

    #[test]
    fn events_in_document_order() {
        let mut events = Vec::new();
        let mut doc = json!({"a": {"b": 1}, "c": [true]});
        {
            let log = std::cell::RefCell::new(&mut events);
            let mut listener = listener_fn(
                |e: &mut Entry<'_>| {
                    log.borrow_mut()
                        .push(format!("+{} {}", e.kind(), e.path_string()));
                    Ok(())
                },
                |e: &mut Exit<'_>| {
                    log.borrow_mut()
                        .push(format!("-{} {}", e.kind(), e.path_string()));
                    Ok(())
                },
            );
            TreeVisitor::new().visit(&mut doc, &mut listener).unwrap();
        }
        assert_eq!(
            events,
            vec![
                "+object ",
                "+property a",
                "+object a",
                "+property a.b",
                "+number a.b",
                "-number a.b",
                "-property a.b",
                "-object a",
                "-property a",
                "+property c",
                "+array c",
                "+boolean c.@0",
                "-boolean c.@0",
                "-array c",
                "-property c",
                "-object ",
            ]
        );
    }

    #[test]
    fn detached_property_leaves_object() {
        let mut doc = json!({"keep": 1, "drop": 2, "tail": 3});
        let mut listener = listener_fn(
            |_: &mut Entry<'_>| Ok(()),
            |e: &mut Exit<'_>| {
                if e.kind() == NodeKind::Property && e.property_name() == Some("drop") {
                    assert_eq!(e.detach()?, json!(2));
                }
                Ok(())
            },
        );
        TreeVisitor::new().visit(&mut doc, &mut listener).unwrap();
        assert_eq!(doc, json!({"keep": 1, "tail": 3}));
    }

    #[test]
    fn detached_root_becomes_null() {
        let mut doc = json!([1, 2]);
        let mut listener = listener_fn(
            |_: &mut Entry<'_>| Ok(()),
            |e: &mut Exit<'_>| {
                if e.path().is_empty() {
                    e.detach()?;
                }
                Ok(())
            },
        );
        TreeVisitor::new().visit(&mut doc, &mut listener).unwrap();
        assert_eq!(doc, Value::Null);
    }

    #[test]
    fn listener_error_aborts() {
        let mut seen = 0;
        let mut listener = listener_fn(
            |_: &mut Entry<'_>| {
                seen += 1;
                if seen == 3 {
                    return Err(VisitError::Aborted("stop".into()));
                }
                Ok(())
            },
            |_: &mut Exit<'_>| Ok(()),
        );
        let err = TreeVisitor::new()
            .visit_str(r#"[1, 2, 3, 4]"#, &mut listener)
            .unwrap_err();
        assert!(matches!(err, VisitError::Aborted(_)));
        assert_eq!(seen, 3);
    }

    #[test]
    fn depth_limit_guards_in_memory_documents() {
        let mut doc = json!([[[1]]]);
        let mut visitor = TreeVisitor::new().with_max_depth(2);
        assert!(matches!(
            visitor.visit(&mut doc, &mut Parse),
            Err(VisitError::DepthLimit { limit: 2 })
        ));
        assert!(visitor.visit(&mut json!([[1], {"a": 2}]), &mut Parse).is_ok());
        assert!(TreeVisitor::new().with_max_depth(3).visit(&mut doc, &mut Parse).is_ok());

        let mut deep = json!(0);
        for _ in 0..1_000 {
            deep = Value::Array(vec![deep]);
        }
        assert!(matches!(
            TreeVisitor::new().visit(&mut deep, &mut Parse),
            Err(VisitError::DepthLimit { limit: StreamConfig::DEFAULT_MAX_DEPTH })
        ));
    }

    #[test]
    fn repeated_member_names_are_rejected() {
        let err = TreeVisitor::new()
            .visit_str(r#"{"k": 1, "k": 2}"#, &mut Parse)
            .unwrap_err();
        assert!(matches!(
            err,
            VisitError::Structural {
                found: "duplicate member name",
                within: Some(NodeKind::Object)
            }
        ));
    }
}
