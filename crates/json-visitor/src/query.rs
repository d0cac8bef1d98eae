//! Pattern queries built on the traversal engine.
//!
//! A query walks the document, tests every non-property node on exit against
//! the pattern and then the predicate, and collects hits in exit order until
//! its budget is used up. Over text the walk is a [`StreamVisitor`] traversal
//! that skips every node once full, so the rest of the input is consumed
//! without callbacks. Over a `&Value` the same order is followed by a
//! read-only walk that borrows the caller's document and stops descending
//! once full.

use crate::config::StreamConfig;
use crate::path::{Path, PathSegment};
use crate::pattern::{Pattern, PatternError};
use crate::util::format_path;
use crate::visitor::{Entry, Exit, Listener, NodeKind, StreamVisitor, VisitError};
use serde::Serialize;
use serde_json::Value;
use std::io::Read;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Visit(#[from] VisitError),
}

/// The predicate that accepts every value.
pub fn accept_all(_: &Value) -> bool {
    true
}

/// A matched node together with where it was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub path: Path,
    pub value: Value,
}

impl Hit {
    pub fn path_string(&self) -> String {
        format_path(&self.path)
    }
}

struct Collector<'a, P> {
    pattern: &'a Pattern,
    predicate: P,
    limit: usize,
    max_depth: usize,
    hits: Vec<Hit>,
}

impl<P> Collector<'_, P> {
    fn full(&self) -> bool {
        self.hits.len() >= self.limit
    }
}

impl<P: FnMut(&Value) -> bool> Collector<'_, P> {
    fn offer(&mut self, path: &[PathSegment], value: &Value) {
        if self.full() {
            return;
        }
        if self.pattern.matches(path) && (self.predicate)(value) {
            trace!(path = %format_path(path), "query hit");
            self.hits.push(Hit {
                path: path.to_vec(),
                value: value.clone(),
            });
        }
    }

    /// Post-order walk over a borrowed document, visiting nodes in the same
    /// order as the listener below sees their exits.
    fn scan(&mut self, value: &Value, path: &mut Vec<PathSegment>, depth: usize) -> Result<(), VisitError> {
        let depth = match value {
            Value::Array(_) | Value::Object(_) => depth + 1,
            _ => depth,
        };
        if depth > self.max_depth {
            return Err(VisitError::DepthLimit {
                limit: self.max_depth,
            });
        }

        match value {
            Value::Object(map) => {
                for (key, child) in map {
                    if self.full() {
                        break;
                    }
                    path.push(PathSegment::Property(key.clone()));
                    let result = self.scan(child, path, depth);
                    path.pop();
                    result?;
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    if self.full() {
                        break;
                    }
                    path.push(PathSegment::Index(i));
                    let result = self.scan(child, path, depth);
                    path.pop();
                    result?;
                }
            }
            _ => {}
        }

        self.offer(path, value);
        Ok(())
    }
}

impl<P: FnMut(&Value) -> bool> Listener for Collector<'_, P> {
    fn on_enter(&mut self, entry: &mut Entry<'_>) -> Result<(), VisitError> {
        if self.full() {
            entry.skip()?;
        }
        Ok(())
    }

    fn on_exit(&mut self, exit: &mut Exit<'_>) -> Result<(), VisitError> {
        if exit.kind() != NodeKind::Property {
            self.offer(exit.path(), exit.value());
        }
        Ok(())
    }
}

/// A compiled, reusable query.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pattern: Pattern,
    config: StreamConfig,
}

impl Query {
    pub fn new(pattern: Pattern) -> Self {
        Self {
            pattern,
            config: StreamConfig::default(),
        }
    }

    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        Ok(Self::new(Pattern::compile(pattern)?))
    }

    /// Limits used while walking documents and reading text.
    pub fn with_config(mut self, config: StreamConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn collector<P>(&self, limit: usize, predicate: P) -> Collector<'_, P> {
        Collector {
            pattern: &self.pattern,
            predicate,
            limit,
            max_depth: self.config.max_depth,
            hits: Vec::new(),
        }
    }

    /// Up to `limit` hits in `document`, in exit order. The document is only
    /// borrowed; just the hit values are cloned.
    pub fn find<P>(&self, document: &Value, limit: usize, predicate: P) -> Result<Vec<Hit>, VisitError>
    where
        P: FnMut(&Value) -> bool,
    {
        let mut collector = self.collector(limit, predicate);
        collector.scan(document, &mut Vec::new(), 0)?;
        debug!(pattern = %self.pattern, hits = collector.hits.len(), "query finished");
        Ok(collector.hits)
    }

    /// Like [`Query::find`], lexing `json` incrementally.
    pub fn find_str<P>(&self, json: &str, limit: usize, predicate: P) -> Result<Vec<Hit>, VisitError>
    where
        P: FnMut(&Value) -> bool,
    {
        self.find_reader(json.as_bytes(), limit, predicate)
    }

    /// Like [`Query::find`], reading the document from `reader`.
    pub fn find_reader<R, P>(&self, reader: R, limit: usize, predicate: P) -> Result<Vec<Hit>, VisitError>
    where
        R: Read,
        P: FnMut(&Value) -> bool,
    {
        let mut collector = self.collector(limit, predicate);
        StreamVisitor::with_config(self.config).visit_reader(reader, &mut collector)?;
        debug!(pattern = %self.pattern, hits = collector.hits.len(), "query finished");
        Ok(collector.hits)
    }

    pub fn first<P>(&self, document: &Value, predicate: P) -> Result<Option<Value>, VisitError>
    where
        P: FnMut(&Value) -> bool,
    {
        Ok(self.find(document, 1, predicate)?.pop().map(|hit| hit.value))
    }

    pub fn all<P>(&self, document: &Value, predicate: P) -> Result<Vec<Value>, VisitError>
    where
        P: FnMut(&Value) -> bool,
    {
        self.first_n(document, predicate, usize::MAX)
    }

    pub fn first_n<P>(&self, document: &Value, predicate: P, n: usize) -> Result<Vec<Value>, VisitError>
    where
        P: FnMut(&Value) -> bool,
    {
        Ok(values(self.find(document, n, predicate)?))
    }

    pub fn first_str<P>(&self, json: &str, predicate: P) -> Result<Option<Value>, VisitError>
    where
        P: FnMut(&Value) -> bool,
    {
        Ok(self.find_str(json, 1, predicate)?.pop().map(|hit| hit.value))
    }

    pub fn all_str<P>(&self, json: &str, predicate: P) -> Result<Vec<Value>, VisitError>
    where
        P: FnMut(&Value) -> bool,
    {
        self.first_n_str(json, predicate, usize::MAX)
    }

    pub fn first_n_str<P>(&self, json: &str, predicate: P, n: usize) -> Result<Vec<Value>, VisitError>
    where
        P: FnMut(&Value) -> bool,
    {
        Ok(values(self.find_str(json, n, predicate)?))
    }
}

fn values(hits: Vec<Hit>) -> Vec<Value> {
    hits.into_iter().map(|hit| hit.value).collect()
}

/// First value in `document` matching `pattern` and `predicate`.
pub fn first<P>(document: &Value, pattern: &str, predicate: P) -> Result<Option<Value>, QueryError>
where
    P: FnMut(&Value) -> bool,
{
    Ok(Query::compile(pattern)?.first(document, predicate)?)
}

/// Every value in `document` matching `pattern` and `predicate`.
pub fn all<P>(document: &Value, pattern: &str, predicate: P) -> Result<Vec<Value>, QueryError>
where
    P: FnMut(&Value) -> bool,
{
    Ok(Query::compile(pattern)?.all(document, predicate)?)
}

/// At most `n` values in `document` matching `pattern` and `predicate`.
pub fn first_n<P>(document: &Value, pattern: &str, predicate: P, n: usize) -> Result<Vec<Value>, QueryError>
where
    P: FnMut(&Value) -> bool,
{
    Ok(Query::compile(pattern)?.first_n(document, predicate, n)?)
}

pub fn first_str<P>(json: &str, pattern: &str, predicate: P) -> Result<Option<Value>, QueryError>
where
    P: FnMut(&Value) -> bool,
{
    Ok(Query::compile(pattern)?.first_str(json, predicate)?)
}

pub fn all_str<P>(json: &str, pattern: &str, predicate: P) -> Result<Vec<Value>, QueryError>
where
    P: FnMut(&Value) -> bool,
{
    Ok(Query::compile(pattern)?.all_str(json, predicate)?)
}

pub fn first_n_str<P>(json: &str, pattern: &str, predicate: P, n: usize) -> Result<Vec<Value>, QueryError>
where
    P: FnMut(&Value) -> bool,
{
    Ok(Query::compile(pattern)?.first_n_str(json, predicate, n)?)
}
