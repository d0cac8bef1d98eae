//! Property-based tests for pattern matching and traversal.
//!
//! Uses proptest to check the matcher laws over random patterns and paths,
//! and that both traversal front-ends agree on random documents.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use json_visitor::query::{self, accept_all};
use json_visitor::{
    format_path, listener_fn, parse_path, Entry, Exit, PathSegment, Pattern, StreamVisitor,
    TreeVisitor,
};

// ============================================================================
// Strategies
// ============================================================================

/// Small alphabet so random patterns and paths actually meet.
fn segment_strategy() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        prop_oneof![Just("a"), Just("b"), Just("c")].prop_map(PathSegment::property),
        (0usize..3).prop_map(PathSegment::index),
    ]
}

fn path_strategy() -> impl Strategy<Value = Vec<PathSegment>> {
    prop::collection::vec(segment_strategy(), 0..7)
}

fn pattern_strategy() -> impl Strategy<Value = String> {
    let atom = prop_oneof![
        Just("a"),
        Just("b"),
        Just("c"),
        Just("@0"),
        Just("@1"),
        Just("*"),
        Just("**"),
    ];
    prop::collection::vec(atom, 0..5).prop_map(|atoms| atoms.join("."))
}

/// Property names that need escaping in pattern syntax.
fn awkward_path_strategy() -> impl Strategy<Value = Vec<PathSegment>> {
    let segment = prop_oneof![
        "[a-z0-9.@*\\\\]{1,6}".prop_map(PathSegment::Property),
        (0usize..1000).prop_map(PathSegment::Index),
    ];
    prop::collection::vec(segment, 0..6)
}

fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z ]{0,5}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-c]{1,2}", inner), 0..4)
                .prop_map(|members| Value::Object(members.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

fn events(doc_text: &str, stream: bool) -> (Vec<String>, Value) {
    let mut log = Vec::new();
    let doc = {
        let log = std::cell::RefCell::new(&mut log);
        let mut listener = listener_fn(
            |e: &mut Entry<'_>| {
                log.borrow_mut().push(format!("+{} {}", e.kind(), e.path_string()));
                Ok(())
            },
            |e: &mut Exit<'_>| {
                log.borrow_mut().push(format!(
                    "-{} {} {:?} {:?}",
                    e.kind(),
                    e.path_string(),
                    e.property_name(),
                    e.array_position()
                ));
                Ok(())
            },
        );
        if stream {
            StreamVisitor::new().visit_str(doc_text, &mut listener).unwrap()
        } else {
            TreeVisitor::new().visit_str(doc_text, &mut listener).unwrap()
        }
    };
    (log, doc)
}

// ============================================================================
// Matcher laws
// ============================================================================

proptest! {
    /// The empty pattern matches every path.
    #[test]
    fn prop_identity_matches_all(path in path_strategy()) {
        prop_assert!(Pattern::identity().matches(&path));
        prop_assert!(Pattern::compile("").unwrap().matches(&path));
    }

    /// Matching is a prefix constraint: extending a matched path keeps it matched.
    #[test]
    fn prop_prefix_law(pattern in pattern_strategy(), path in path_strategy(), suffix in path_strategy()) {
        let compiled = Pattern::compile(&pattern).unwrap();
        if compiled.matches(&path) {
            let mut longer = path.clone();
            longer.extend(suffix);
            prop_assert!(compiled.matches(&longer), "'{}' lost {}", pattern, format_path(&longer));
        }
    }

    /// Compilation and matching are pure.
    #[test]
    fn prop_deterministic(pattern in pattern_strategy(), path in path_strategy()) {
        let first = Pattern::compile(&pattern).unwrap();
        let second = Pattern::compile(&pattern).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.matches(&path), second.matches(&path));
        prop_assert_eq!(first.matches(&path), first.matches(&path));
    }

    /// Rendering a compiled pattern gives an equivalent pattern.
    #[test]
    fn prop_display_recompiles(pattern in pattern_strategy(), path in path_strategy()) {
        let compiled = Pattern::compile(&pattern).unwrap();
        let again = Pattern::compile(&compiled.to_string()).unwrap();
        prop_assert_eq!(compiled.matches(&path), again.matches(&path));
    }

    /// A formatted path parses back to itself and, as a pattern, matches it.
    #[test]
    fn prop_path_text_round_trip(path in awkward_path_strategy()) {
        let text = format_path(&path);
        prop_assert_eq!(parse_path(&text).unwrap(), path.clone());
        prop_assert!(Pattern::compile(&text).unwrap().matches(&path));
    }
}

// ============================================================================
// Front-end equivalence
// ============================================================================

proptest! {
    /// Tree-driven and stream-driven traversal see the same events and
    /// return the same document.
    #[test]
    fn prop_front_ends_agree(doc in json_strategy()) {
        let text = doc.to_string();
        let (tree_events, tree_doc) = events(&text, false);
        let (stream_events, stream_doc) = events(&text, true);
        prop_assert_eq!(tree_events, stream_events);
        prop_assert_eq!(&tree_doc, &doc);
        prop_assert_eq!(stream_doc, doc);
    }

    /// Queries over a parsed document and over its text agree.
    #[test]
    fn prop_queries_agree(doc in json_strategy(), pattern in pattern_strategy()) {
        let text = doc.to_string();
        let tree = query::all(&doc, &pattern, accept_all).unwrap();
        let stream = query::all_str(&text, &pattern, accept_all).unwrap();
        prop_assert_eq!(tree, stream);
    }
}
