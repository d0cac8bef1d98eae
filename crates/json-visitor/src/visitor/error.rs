use super::NodeKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisitError {
    /// The token sequence does not form a JSON document.
    #[error("Unexpected {found} {}", place(.within))]
    Structural {
        found: &'static str,
        /// Kind of the innermost open node, `None` at the top level.
        within: Option<NodeKind>,
    },
    /// Malformed JSON text.
    #[error("Malformed JSON at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error("Nesting depth limit of {limit} exceeded")]
    DepthLimit { limit: usize },
    /// A listener broke the callback contract.
    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Raised by listeners to stop a traversal early.
    #[error("Traversal aborted: {0}")]
    Aborted(String),
}

fn place(within: &Option<NodeKind>) -> String {
    match within {
        Some(kind) => format!("inside {}", kind),
        None => String::from("at top level"),
    }
}
