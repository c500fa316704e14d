//! Serialized row formats for frames and edges.

use crate::model::{ConfidenceTier, Edge, EdgeKind, Frame, FrameKind, FramePayload, Provenance, Span};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One persisted frame row. The stable id is the primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    pub id: String,
    pub kind: FrameKind,
    pub name: String,
    pub qualified_name: String,
    pub confidence: f64,
    pub confidence_tier: ConfidenceTier,
    pub provenance: Provenance,
    pub resolution_pass: u32,
    pub language: String,
    pub file_path: String,
    pub span: Span,
    pub content: String,
    pub payload: FramePayload,
    pub metadata: Map<String, Value>,
}

impl From<&Frame> for FrameRecord {
    fn from(frame: &Frame) -> Self {
        Self {
            id: frame.id.clone(),
            kind: frame.kind,
            name: frame.name.clone(),
            qualified_name: frame.qualified_name.clone(),
            confidence: frame.confidence,
            confidence_tier: frame.tier,
            provenance: frame.provenance,
            resolution_pass: frame.resolution_pass,
            language: frame.language.clone(),
            file_path: frame
                .file_path
                .as_ref()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default(),
            span: frame.span,
            content: frame.content.clone(),
            payload: frame.payload.clone(),
            metadata: frame.metadata.clone(),
        }
    }
}

/// One persisted edge row, referencing frames by stable id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    /// Store-assigned row id
    pub id: u64,
    pub kind: EdgeKind,
    pub subject_id: String,
    pub object_id: String,
    pub confidence: f64,
    pub confidence_tier: ConfidenceTier,
    pub metadata: Map<String, Value>,
}

impl EdgeRecord {
    /// Convert a session edge, substituting the endpoints' stable ids.
    /// The row id is assigned by the store at insert time.
    pub fn from_session(edge: &Edge, subject_id: String, object_id: String) -> Self {
        Self {
            id: 0,
            kind: edge.kind,
            subject_id,
            object_id,
            confidence: edge.confidence,
            confidence_tier: edge.tier,
            metadata: edge.metadata.clone(),
        }
    }
}
