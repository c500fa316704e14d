//! Frames: the nodes of the semantic graph.

use super::kinds::{ConfidenceTier, FrameId, FrameKind, Provenance};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

/// Byte- and line-accurate source span of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    pub start_line: usize,
    pub end_line: usize,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl Span {
    pub fn new(start_line: usize, end_line: usize, start_byte: usize, end_byte: usize) -> Self {
        Self {
            start_line,
            end_line,
            start_byte,
            end_byte,
        }
    }
}

/// Kind-specific frame data.
///
/// A tagged union rather than per-kind subtypes: most frames carry nothing,
/// classes carry field lists, callables carry their signature.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum FramePayload {
    #[default]
    None,
    Class {
        instance_fields: Vec<String>,
        static_fields: Vec<String>,
    },
    Callable {
        parameters: Vec<String>,
        return_type: Option<String>,
    },
}

/// One semantic or syntactic unit in the graph.
///
/// `qualified_name` is the logical identity: registries dedup on it within a
/// session. `id` is a pure content fingerprint recomputed whenever content
/// changes; cross-run diffing compares stored ids against freshly computed
/// ones, so id churn is exactly "this node changed".
///
/// Containment is a DAG: a frame lists every parent, and traversal must
/// dedupe by id rather than by path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    /// Stable, content-derived identifier (16 hex chars)
    pub id: String,
    /// In-session arena handle
    pub handle: FrameId,
    pub kind: FrameKind,
    pub name: String,
    /// Dotted scope path, unique per kind within a session
    pub qualified_name: String,
    pub confidence: f64,
    pub tier: ConfidenceTier,
    pub provenance: Provenance,
    pub resolution_pass: u32,
    pub language: String,
    /// Unset for CODEBASE/LANGUAGE frames until after id computation
    pub file_path: Option<PathBuf>,
    pub span: Span,
    pub content: String,
    /// Ordered children, as arena handles
    pub children: Vec<FrameId>,
    /// All containment parents, as arena handles
    pub parents: Vec<FrameId>,
    pub payload: FramePayload,
    pub metadata: Map<String, Value>,
}

impl Frame {
    /// Create a frame with defaults suitable for pass-1 extraction.
    /// The id is empty until [`Frame::compute_id`] runs.
    pub fn new(kind: FrameKind, name: impl Into<String>, qualified_name: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            handle: 0,
            kind,
            name: name.into(),
            qualified_name: qualified_name.into(),
            confidence: 1.0,
            tier: ConfidenceTier::High,
            provenance: Provenance::Parsed,
            resolution_pass: 1,
            language: String::new(),
            file_path: None,
            span: Span::default(),
            content: String::new(),
            children: Vec::new(),
            parents: Vec::new(),
            payload: FramePayload::default(),
            metadata: Map::new(),
        }
    }

    /// Set confidence, provenance, and pass together, deriving the tier.
    pub fn set_confidence(&mut self, score: f64, provenance: Provenance, pass: u32) {
        self.confidence = score;
        self.provenance = provenance;
        self.resolution_pass = pass;
        self.tier = ConfidenceTier::from_score(score);
    }

    /// Recompute the content fingerprint.
    ///
    /// Control-flow frames key on position within their scope only — their
    /// content is volatile and their identity is "the Nth branch here".
    /// Semantic frames key on normalized content, so byte-identical content
    /// at the same scope always produces the same id across runs.
    pub fn compute_id(&self) -> String {
        let file = self
            .file_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();

        let key = if self.kind.is_control_flow() {
            format!(
                "{}::{}::{}::{}:{}",
                file, self.qualified_name, self.kind, self.span.start_byte, self.span.end_byte
            )
        } else {
            format!(
                "{}::{}::{}::{}",
                file,
                self.qualified_name,
                self.kind,
                normalize_content(&self.content)
            )
        };

        short_hash(&key)
    }

    /// First meaningful content line, for logs and summaries.
    pub fn heading(&self) -> String {
        let line = self
            .content
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .unwrap_or("");
        match line.char_indices().nth(77) {
            Some((cut, _)) if line.chars().count() > 80 => format!("{}...", &line[..cut]),
            _ => line.to_string(),
        }
    }
}

/// Normalize source text for content hashing: trim each line, drop blank and
/// comment-only lines, collapse runs of internal whitespace.
pub fn normalize_content(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| !l.starts_with('#') && !l.starts_with("//"))
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// First 16 hex chars of the SHA-256 of `key`.
pub fn short_hash(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut out = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
