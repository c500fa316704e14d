//! Row-level frame mutations for incremental updates.

use crate::error::IndexError;
use crate::store::{FrameRecord, FrameStore};
use log::warn;

/// Counters from a frame deletion pass.
#[derive(Debug, Clone, Default)]
pub struct DeleteResult {
    pub frames_deleted: usize,
    /// Edges removed by cascade alongside the frames
    pub edges_deleted: usize,
    pub errors: Vec<String>,
}

/// Counters from a frame insertion pass.
#[derive(Debug, Clone, Default)]
pub struct InsertResult {
    pub frames_inserted: usize,
    pub errors: Vec<String>,
}

/// Applies a diff's frame-level changes to the store.
pub struct StoreMutator;

impl StoreMutator {
    /// Delete the given frames, cascading to their edges. A missing row is
    /// recorded but does not stop the pass.
    pub fn delete_frames(store: &mut FrameStore, ids: &[String]) -> DeleteResult {
        let mut result = DeleteResult::default();
        for id in ids {
            match store.delete_frame(id) {
                Ok(edges) => {
                    result.frames_deleted += 1;
                    result.edges_deleted += edges;
                }
                Err(IndexError::FrameNotFound { .. }) => {
                    warn!("delete skipped missing frame {id}");
                    result.errors.push(format!("frame not found: {id}"));
                }
                Err(e) => result.errors.push(format!("delete {id}: {e}")),
            }
        }
        result
    }

    /// Insert frame rows one by one so a single bad row cannot sink the
    /// whole pass.
    pub fn insert_frames(store: &mut FrameStore, records: Vec<FrameRecord>) -> InsertResult {
        let mut result = InsertResult::default();
        for record in records {
            let id = record.id.clone();
            match store.put_frame(record) {
                Ok(()) => result.frames_inserted += 1,
                Err(e) => result.errors.push(format!("insert {id}: {e}")),
            }
        }
        result
    }
}
