//! Stable identifier generation.
//!
//! Produces deterministic, content- or location-derived identifiers with a
//! three-character strategy prefix, so a stored id always says how it was
//! derived. All strategies are pure functions of the [`NodeContext`].

use crate::model::normalize_content;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Node types treated as semantic anchors by the hybrid strategy.
const SEMANTIC_ANCHOR_TYPES: &[&str] = &[
    "function_definition",
    "function_declaration",
    "method_definition",
    "method_declaration",
    "class_definition",
    "class_declaration",
    "module",
    "package",
];

/// Selectable identifier strategy.
///
/// Hybrid is the recommended default: semantic-anchor nodes get ids derived
/// from their anchor, nested nodes from anchor plus relative offset, and
/// anchor-less nodes fall back to the structural hash. Under Hybrid, editing
/// the body of one callable never changes a sibling callable's id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// File + type + byte range. Maximally sensitive, least stable.
    Positional,
    /// Normalized-content hash. Stable across moves, collides on duplicates.
    ContentHash,
    /// Position plus a first-N children-type signature.
    StructuralHash,
    /// Anchor-relative scheme; see type-level docs.
    #[default]
    Hybrid,
    /// Root-to-node child-index path. Debugging only; unstable under insertion.
    Hierarchical,
}

/// Everything a strategy may look at when deriving an id.
#[derive(Debug, Clone, Default)]
pub struct NodeContext {
    pub file_path: PathBuf,
    /// Front-end node type, e.g. `"function_definition"`
    pub node_type: String,
    pub start_byte: usize,
    pub end_byte: usize,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
    /// Direct children's node types, in order
    pub children_types: Vec<String>,
    pub parent_type: Option<String>,
    /// Qualified name of the nearest enclosing semantic anchor. For an
    /// anchor node this is its own qualified name.
    pub semantic_anchor: Option<String>,
    /// Start byte of the enclosing anchor, for relative offsets
    pub anchor_start_byte: Option<usize>,
    /// Child indexes from the root to this node
    pub tree_path: Vec<usize>,
}

/// Deterministic id generator over a fixed [`IdStrategy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StableIdGenerator {
    strategy: IdStrategy,
}

impl StableIdGenerator {
    pub fn new(strategy: IdStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> IdStrategy {
        self.strategy
    }

    /// Derive the identifier for one node. Pure: identical contexts always
    /// yield identical ids, across runs and processes.
    pub fn generate_id(&self, ctx: &NodeContext) -> String {
        match self.strategy {
            IdStrategy::Positional => hash_key("POS", &positional_key(ctx)),
            IdStrategy::ContentHash => hash_key("CNT", &content_key(ctx)),
            IdStrategy::StructuralHash => hash_key("STR", &structural_key(ctx)),
            IdStrategy::Hybrid => hybrid_id(ctx),
            IdStrategy::Hierarchical => hash_key("HIE", &hierarchical_key(ctx)),
        }
    }
}

fn positional_key(ctx: &NodeContext) -> String {
    format!(
        "{}::{}::{}:{}",
        ctx.file_path.display(),
        ctx.node_type,
        ctx.start_byte,
        ctx.end_byte
    )
}

fn content_key(ctx: &NodeContext) -> String {
    format!("{}::{}", ctx.node_type, normalize_content(&ctx.content))
}

fn structural_key(ctx: &NodeContext) -> String {
    let signature = ctx
        .children_types
        .iter()
        .take(5)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("_");
    format!("{}::{}", positional_key(ctx), signature)
}

fn hierarchical_key(ctx: &NodeContext) -> String {
    let path = ctx
        .tree_path
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(".");
    format!("{}::{}", ctx.file_path.display(), path)
}

fn hybrid_id(ctx: &NodeContext) -> String {
    let is_anchor = SEMANTIC_ANCHOR_TYPES.contains(&ctx.node_type.as_str());
    match &ctx.semantic_anchor {
        Some(anchor) if is_anchor => {
            let key = format!("{}::{}", ctx.file_path.display(), anchor);
            hash_key("SEM", &key)
        }
        Some(anchor) => {
            // Offset relative to the anchor, not the file, so edits outside
            // the anchor cannot shift ids inside it.
            let offset = ctx
                .start_byte
                .saturating_sub(ctx.anchor_start_byte.unwrap_or(0));
            let key = format!(
                "{}::{}::{}::{}",
                ctx.file_path.display(),
                anchor,
                ctx.node_type,
                offset
            );
            hash_key("HYB", &key)
        }
        None => hash_key("STR", &structural_key(ctx)),
    }
}

fn hash_key(prefix: &str, key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        hex.push_str(&format!("{byte:02x}"));
    }
    format!("{prefix}_{hex}")
}
