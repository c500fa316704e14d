use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One syntax node in a flat extraction stream.
///
/// Front-ends flatten their parse tree depth-first into a `Vec<RawNode>` and
/// link parents to children by vector index. The engine relies on three
/// properties of the stream:
///
/// - indexes are assigned in depth-first order, so a parent always precedes
///   its children;
/// - `start_byte..end_byte` of a child is contained in its parent's range;
/// - `content` is the exact source slice for the node's byte range.
///
/// `kind` is the front-end's own node-type vocabulary (for tree-sitter
/// grammars, the node kind string). The engine maps a known subset of kinds
/// onto frames and drills through the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// Front-end node type, e.g. `"function_definition"`
    pub kind: String,
    /// 1-based first line of the node
    pub start_line: usize,
    /// 1-based last line of the node
    pub end_line: usize,
    /// Byte offset of the node's first byte
    pub start_byte: usize,
    /// Byte offset one past the node's last byte
    pub end_byte: usize,
    /// Exact source text of the node
    pub content: String,
    /// File the node came from
    pub file_path: PathBuf,
    /// Indexes of direct children within the same stream
    pub children: Vec<usize>,
    /// Index of the parent node, `None` for the root
    pub parent: Option<usize>,
}

impl RawNode {
    /// Whether `other`'s byte range lies entirely inside this node's range.
    pub fn contains(&self, other: &RawNode) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }

    /// Node size in bytes.
    pub fn byte_len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }
}
