//! Tuning knobs for the stream-driven front-end.

use serde::{Deserialize, Serialize};

/// Limits applied while traversing a token stream.
///
/// Every field has a default, so a partial table such as `max_depth = 64`
/// deserializes cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Deepest allowed nesting of arrays and objects. The root container
    /// counts as depth 1.
    pub max_depth: usize,
    /// Capacity of the buffer placed in front of raw readers.
    pub read_buffer: usize,
}

impl StreamConfig {
    pub const DEFAULT_MAX_DEPTH: usize = 512;
    pub const DEFAULT_READ_BUFFER: usize = 8 * 1024;

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_read_buffer(mut self, read_buffer: usize) -> Self {
        self.read_buffer = read_buffer;
        self
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            read_buffer: Self::DEFAULT_READ_BUFFER,
        }
    }
}
