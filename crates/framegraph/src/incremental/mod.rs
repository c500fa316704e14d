//! Incremental re-indexing: diff a fresh parse against stored rows and
//! swap only what changed, inside one transaction.

mod diff;
mod edge_inserter;
mod mutator;
mod repair;
mod updater;

pub use diff::{collect_all_frames, FrameDiff, StableDiffCalculator};
pub use edge_inserter::{EdgeInserter, EdgeInsertionResult};
pub use mutator::{DeleteResult, InsertResult, StoreMutator};
pub use repair::{RelationshipRepairer, RepairResult, StoreResolution};
pub use updater::{IncrementalUpdater, UpdateResult};
