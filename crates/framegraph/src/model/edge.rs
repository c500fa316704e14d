//! Edges: typed, confidence-scored relationships between frames.

use super::kinds::{ConfidenceTier, EdgeId, EdgeKind, FrameId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An in-session edge between two arena frames.
///
/// Edge confidence never exceeds the weaker endpoint; callers compute the
/// score through [`crate::confidence::edge_confidence`] so that invariant
/// holds by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub subject: FrameId,
    pub object: FrameId,
    pub kind: EdgeKind,
    pub confidence: f64,
    pub tier: ConfidenceTier,
    pub metadata: Map<String, Value>,
}

impl Edge {
    pub fn new(id: EdgeId, subject: FrameId, object: FrameId, kind: EdgeKind, confidence: f64) -> Self {
        Self {
            id,
            subject,
            object,
            kind,
            confidence,
            tier: ConfidenceTier::from_score(confidence),
            metadata: Map::new(),
        }
    }

    /// Attach one metadata entry, builder style.
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}
