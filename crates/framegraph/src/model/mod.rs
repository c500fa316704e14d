//! Data model: frames, edges, and their classifying enums.

mod edge;
mod frame;
mod kinds;

pub use edge::Edge;
pub use frame::{normalize_content, short_hash, Frame, FramePayload, Span};
pub use kinds::{ConfidenceTier, EdgeId, EdgeKind, FrameId, FrameKind, Provenance};
