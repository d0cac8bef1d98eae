//! Path patterns and depth-first visitors over JSON documents.
//!
//! The crate has two engines and a thin layer on top:
//!
//! * [`pattern`]: compiles dotted path patterns (`a.@0.*.b`, `**.price`) and
//!   matches them against root-to-node paths;
//! * [`visitor`]: fires enter/exit events for every node of a document,
//!   either walking a `serde_json::Value` ([`TreeVisitor`]) or building one
//!   from a token stream ([`StreamVisitor`]). Listeners can skip subtrees on
//!   enter and detach nodes on exit;
//! * [`query`]: `first` / `all` / `first_n` lookups driven by a pattern and a
//!   predicate.
//!
//! # Example
//!
//! ```
//! use json_visitor::query::{self, accept_all};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "store": {
//!         "book": [
//!             {"title": "Sayings of the Century", "price": 8.95},
//!             {"title": "Sword of Honour", "price": 12.99}
//!         ]
//!     }
//! });
//!
//! let prices = query::all(&doc, "store.**.price", accept_all).unwrap();
//! assert_eq!(prices, vec![json!(8.95), json!(12.99)]);
//!
//! let cheap = query::first(&doc, "store.book.*.price", |v| v.as_f64() < Some(10.0)).unwrap();
//! assert_eq!(cheap, Some(json!(8.95)));
//! ```

pub mod config;
pub mod path;
pub mod pattern;
pub mod query;
pub mod util;
pub mod visitor;

pub use config::StreamConfig;
pub use path::{Path, PathSegment};
pub use pattern::{matches, Element, Literal, Pattern, PatternError};
pub use query::{Hit, Query, QueryError};
pub use util::{array_set, escape_property, format_path, parse_path};
pub use visitor::{
    listener_fn, Entry, Exit, Lexer, Listener, NodeKind, StreamVisitor, Token, TokenSource,
    Tokens, TreeVisitor, VisitError,
};
