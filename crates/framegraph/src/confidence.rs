//! Confidence model: pure, table-driven scoring.
//!
//! Every constant here is empirical and load-bearing for downstream
//! thresholds; values are fixed and covered by exhaustive table tests.

use crate::model::{ConfidenceTier, EdgeKind, Provenance};

/// Base confidence for a frame, given the pass that produced it and how.
///
/// Pass 1 is direct extraction; later passes only ever infer, so the table
/// caps what any pass can claim. Unknown combinations score 0.1.
pub fn frame_confidence(pass: u32, provenance: Provenance) -> f64 {
    match (pass, provenance) {
        (1, Provenance::Parsed) => 1.0,
        (1, Provenance::Imported) => 0.9,
        (1, Provenance::ParseFailed) => 0.1,
        (2, Provenance::Imported) => 0.8,
        (2, Provenance::Inferred) => 0.6,
        (2, Provenance::External) => 0.7,
        (3, Provenance::Inferred) => 0.3,
        (3, Provenance::UnknownImport) => 0.2,
        (p, _) if p >= 4 => 0.1,
        _ => 0.1,
    }
}

/// Per-kind trust multiplier applied on top of the weaker endpoint.
pub fn edge_multiplier(kind: EdgeKind) -> f64 {
    match kind {
        EdgeKind::Contains => 1.0,
        EdgeKind::Inherits => 0.95,
        EdgeKind::Implements => 0.9,
        EdgeKind::Imports => 0.9,
        EdgeKind::Calls => 0.85,
        EdgeKind::Uses => 0.80,
    }
}

/// Edge confidence: `min(src, dst) * multiplier`.
///
/// Trust never exceeds the weaker endpoint, so an edge into a speculative
/// frame is itself speculative regardless of kind.
pub fn edge_confidence(kind: EdgeKind, src_confidence: f64, dst_confidence: f64) -> f64 {
    src_confidence.min(dst_confidence) * edge_multiplier(kind)
}

/// Bucket a continuous score into a coarse tier.
pub fn tier(score: f64) -> ConfidenceTier {
    ConfidenceTier::from_score(score)
}

/// Decay a score for symbols resolved `distance` scope levels away.
pub fn decay_for_scope_distance(score: f64, distance: u32) -> f64 {
    score * 0.95_f64.powi(distance as i32)
}
