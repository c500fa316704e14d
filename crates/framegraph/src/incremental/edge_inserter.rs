//! Edge row insertion with per-row error isolation.

use crate::store::{EdgeRecord, FrameStore};
use log::warn;

/// Counters from an edge insertion pass.
#[derive(Debug, Clone, Default)]
pub struct EdgeInsertionResult {
    pub inserted: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl EdgeInsertionResult {
    pub fn merge(&mut self, other: EdgeInsertionResult) {
        self.inserted += other.inserted;
        self.failed += other.failed;
        self.errors.extend(other.errors);
    }
}

/// Inserts batches of edge rows. Each row fails independently, so one
/// unserializable edge does not drop the rest of the batch.
pub struct EdgeInserter;

impl EdgeInserter {
    pub fn insert_edges(store: &mut FrameStore, records: Vec<EdgeRecord>) -> EdgeInsertionResult {
        let mut result = EdgeInsertionResult::default();
        for record in records {
            let label = format!("{} {} -> {}", record.kind, record.subject_id, record.object_id);
            match store.insert_edge(record) {
                Ok(_) => result.inserted += 1,
                Err(e) => {
                    warn!("edge insert failed: {label}: {e}");
                    result.failed += 1;
                    result.errors.push(format!("{label}: {e}"));
                }
            }
        }
        result
    }
}
