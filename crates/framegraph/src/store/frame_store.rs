//! Transactional frame/edge store over a key-value backend.
//!
//! Rows live in the backend under three key families:
//!
//! - `frame:{stable_id}` — one [`FrameRecord`] per frame
//! - `edge:{row_id:020}` — one [`EdgeRecord`] per edge, zero-padded so
//!   a prefix scan yields insertion order
//! - `meta:edge_counter` — the last assigned edge row id
//!
//! The store keeps everything cached in memory and maintains two derived
//! indexes: frames by file path and edge rows by attached frame. A
//! transaction snapshots the caches and stages backend writes; commit
//! applies the staged operations in one atomic batch, rollback restores
//! the snapshot and discards them.

use super::{BatchOperation, FrameRecord, EdgeRecord, MemoryBackend, StorageBackend};
use crate::error::{IndexError, Result};
use crate::model::FrameKind;
use std::collections::{HashMap, HashSet};

const FRAME_PREFIX: &str = "frame:";
const EDGE_PREFIX: &str = "edge:";
const META_EDGE_COUNTER: &[u8] = b"meta:edge_counter";

fn frame_key(id: &str) -> Vec<u8> {
    format!("{FRAME_PREFIX}{id}").into_bytes()
}

fn edge_key(row_id: u64) -> Vec<u8> {
    format!("{EDGE_PREFIX}{row_id:020}").into_bytes()
}

/// An open transaction: the cache state to restore on rollback plus the
/// backend writes to apply on commit.
pub struct Transaction {
    snapshot_frames: HashMap<String, FrameRecord>,
    snapshot_edges: HashMap<u64, EdgeRecord>,
    snapshot_edge_counter: u64,
    snapshot_by_file: HashMap<String, HashSet<String>>,
    snapshot_edges_by_frame: HashMap<String, HashSet<u64>>,
    staged: Vec<BatchOperation>,
}

/// Persistent frame graph storage with snapshot transactions.
pub struct FrameStore {
    backend: Box<dyn StorageBackend>,
    frames: HashMap<String, FrameRecord>,
    edges: HashMap<u64, EdgeRecord>,
    edge_counter: u64,
    by_file: HashMap<String, HashSet<String>>,
    edges_by_frame: HashMap<String, HashSet<u64>>,
    txn: Option<Transaction>,
}

impl FrameStore {
    /// Open a store over an in-memory backend. Nothing survives drop.
    pub fn in_memory() -> Self {
        // An empty memory backend has nothing to rebuild from.
        Self {
            backend: Box::new(MemoryBackend::new()),
            frames: HashMap::new(),
            edges: HashMap::new(),
            edge_counter: 0,
            by_file: HashMap::new(),
            edges_by_frame: HashMap::new(),
            txn: None,
        }
    }

    /// Open a store over an existing backend, rebuilding the caches and
    /// derived indexes from the persisted rows.
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> Result<Self> {
        let mut store = Self {
            backend,
            frames: HashMap::new(),
            edges: HashMap::new(),
            edge_counter: 0,
            by_file: HashMap::new(),
            edges_by_frame: HashMap::new(),
            txn: None,
        };
        store.rebuild_from_storage()?;
        Ok(store)
    }

    /// Open a RocksDB-backed store at the given directory.
    #[cfg(feature = "rocksdb-backend")]
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let backend = super::RocksDbBackend::open(path)?;
        Self::with_backend(Box::new(backend))
    }

    fn rebuild_from_storage(&mut self) -> Result<()> {
        for (_, value) in self.backend.scan_prefix(FRAME_PREFIX.as_bytes())? {
            let record: FrameRecord = serde_json::from_slice(&value)
                .map_err(|e| IndexError::serialization("Corrupt frame row", Some(e)))?;
            self.index_frame(&record);
            self.frames.insert(record.id.clone(), record);
        }
        for (_, value) in self.backend.scan_prefix(EDGE_PREFIX.as_bytes())? {
            let record: EdgeRecord = serde_json::from_slice(&value)
                .map_err(|e| IndexError::serialization("Corrupt edge row", Some(e)))?;
            self.index_edge(&record);
            self.edges.insert(record.id, record);
        }
        if let Some(raw) = self.backend.get(META_EDGE_COUNTER)? {
            let text = String::from_utf8_lossy(&raw);
            self.edge_counter = text.parse().map_err(|_| {
                IndexError::serialization(
                    format!("Corrupt edge counter: {text:?}"),
                    None::<std::io::Error>,
                )
            })?;
        }
        log::debug!(
            "rebuilt store caches: {} frames, {} edges",
            self.frames.len(),
            self.edges.len()
        );
        Ok(())
    }

    fn index_frame(&mut self, record: &FrameRecord) {
        if !record.file_path.is_empty() {
            self.by_file
                .entry(record.file_path.clone())
                .or_default()
                .insert(record.id.clone());
        }
    }

    fn index_edge(&mut self, record: &EdgeRecord) {
        self.edges_by_frame
            .entry(record.subject_id.clone())
            .or_default()
            .insert(record.id);
        self.edges_by_frame
            .entry(record.object_id.clone())
            .or_default()
            .insert(record.id);
    }

    fn write(&mut self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        match &mut self.txn {
            Some(txn) => {
                txn.staged.push(BatchOperation::Put { key, value });
                Ok(())
            }
            None => self.backend.put(&key, &value),
        }
    }

    fn erase(&mut self, key: Vec<u8>) -> Result<()> {
        match &mut self.txn {
            Some(txn) => {
                txn.staged.push(BatchOperation::Delete { key });
                Ok(())
            }
            None => self.backend.delete(&key),
        }
    }

    // --- frames ---

    /// Insert or replace a frame row.
    pub fn put_frame(&mut self, record: FrameRecord) -> Result<()> {
        let value = serde_json::to_vec(&record)
            .map_err(|e| IndexError::serialization("Failed to serialize frame row", Some(e)))?;
        self.write(frame_key(&record.id), value)?;
        // A re-index can move a frame to a new file path.
        if let Some(old) = self.frames.get(&record.id) {
            if old.file_path != record.file_path {
                if let Some(ids) = self.by_file.get_mut(&old.file_path) {
                    ids.remove(&record.id);
                }
            }
        }
        self.index_frame(&record);
        self.frames.insert(record.id.clone(), record);
        Ok(())
    }

    /// Look up a frame row by stable id.
    pub fn get_frame(&self, id: &str) -> Option<&FrameRecord> {
        self.frames.get(id)
    }

    /// Whether a frame row exists.
    pub fn contains_frame(&self, id: &str) -> bool {
        self.frames.contains_key(id)
    }

    /// Delete a frame and every edge attached to it. Returns the number
    /// of edges removed alongside the frame.
    pub fn delete_frame(&mut self, id: &str) -> Result<usize> {
        let record = match self.frames.get(id) {
            Some(r) => r.clone(),
            None => {
                return Err(IndexError::FrameNotFound {
                    frame_id: id.to_string(),
                })
            }
        };

        let attached: Vec<u64> = self
            .edges_by_frame
            .get(id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for edge_id in &attached {
            self.delete_edge(*edge_id)?;
        }

        self.erase(frame_key(id))?;
        self.frames.remove(id);
        if let Some(ids) = self.by_file.get_mut(&record.file_path) {
            ids.remove(id);
            if ids.is_empty() {
                self.by_file.remove(&record.file_path);
            }
        }
        self.edges_by_frame.remove(id);
        Ok(attached.len())
    }

    /// Number of frame rows.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Stable ids of every frame recorded for a file path.
    pub fn frame_ids_for_file(&self, file_path: &str) -> Vec<String> {
        self.by_file
            .get(file_path)
            .map(|set| {
                let mut ids: Vec<String> = set.iter().cloned().collect();
                ids.sort();
                ids
            })
            .unwrap_or_default()
    }

    /// Iterate over every frame row.
    pub fn frames(&self) -> impl Iterator<Item = &FrameRecord> {
        self.frames.values()
    }

    /// Frame rows of a given kind.
    pub fn frames_of_kind(&self, kind: FrameKind) -> Vec<&FrameRecord> {
        self.frames.values().filter(|f| f.kind == kind).collect()
    }

    /// The frame of the given kind with exactly this qualified name.
    pub fn find_by_qualified_name(&self, kind: FrameKind, qualified_name: &str) -> Option<&FrameRecord> {
        self.frames
            .values()
            .find(|f| f.kind == kind && f.qualified_name == qualified_name)
    }

    // --- edges ---

    /// Insert an edge row, assigning it the next row id. Endpoints are
    /// not required to exist yet; repair passes insert edges for frames
    /// staged in the same transaction.
    pub fn insert_edge(&mut self, mut record: EdgeRecord) -> Result<u64> {
        self.edge_counter += 1;
        record.id = self.edge_counter;

        let value = serde_json::to_vec(&record)
            .map_err(|e| IndexError::serialization("Failed to serialize edge row", Some(e)))?;
        self.write(edge_key(record.id), value)?;
        self.write(
            META_EDGE_COUNTER.to_vec(),
            self.edge_counter.to_string().into_bytes(),
        )?;

        self.index_edge(&record);
        let id = record.id;
        self.edges.insert(id, record);
        Ok(id)
    }

    /// Delete an edge row by row id.
    pub fn delete_edge(&mut self, edge_id: u64) -> Result<()> {
        let record = match self.edges.remove(&edge_id) {
            Some(r) => r,
            None => return Ok(()),
        };
        self.erase(edge_key(edge_id))?;
        for endpoint in [&record.subject_id, &record.object_id] {
            if let Some(set) = self.edges_by_frame.get_mut(endpoint) {
                set.remove(&edge_id);
                if set.is_empty() {
                    self.edges_by_frame.remove(endpoint);
                }
            }
        }
        Ok(())
    }

    /// Number of edge rows.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Every edge row touching the given frame, as subject or object.
    pub fn edges_for_frame(&self, frame_id: &str) -> Vec<&EdgeRecord> {
        let mut rows: Vec<&EdgeRecord> = self
            .edges_by_frame
            .get(frame_id)
            .map(|set| set.iter().filter_map(|id| self.edges.get(id)).collect())
            .unwrap_or_default();
        rows.sort_by_key(|e| e.id);
        rows
    }

    /// Iterate over every edge row.
    pub fn edges(&self) -> impl Iterator<Item = &EdgeRecord> {
        self.edges.values()
    }

    // --- transactions ---

    /// Begin a transaction. Fails if one is already open.
    pub fn begin_transaction(&mut self) -> Result<()> {
        if self.txn.is_some() {
            return Err(IndexError::invalid("transaction already active"));
        }
        self.txn = Some(Transaction {
            snapshot_frames: self.frames.clone(),
            snapshot_edges: self.edges.clone(),
            snapshot_edge_counter: self.edge_counter,
            snapshot_by_file: self.by_file.clone(),
            snapshot_edges_by_frame: self.edges_by_frame.clone(),
            staged: Vec::new(),
        });
        Ok(())
    }

    /// Commit the open transaction: apply every staged backend write in
    /// one atomic batch. On failure the transaction stays open with its
    /// snapshot intact, so the caller can still roll back.
    pub fn commit(&mut self) -> Result<()> {
        let staged = match &mut self.txn {
            Some(txn) => std::mem::take(&mut txn.staged),
            None => {
                return Err(IndexError::TransactionInactive {
                    operation: "commit".to_string(),
                })
            }
        };
        self.backend.write_batch(staged)?;
        self.txn = None;
        Ok(())
    }

    /// Roll back the open transaction: restore the cache snapshot and
    /// discard staged writes. Nothing reached the backend.
    pub fn rollback(&mut self) -> Result<()> {
        let txn = self.txn.take().ok_or_else(|| IndexError::TransactionInactive {
            operation: "rollback".to_string(),
        })?;
        self.frames = txn.snapshot_frames;
        self.edges = txn.snapshot_edges;
        self.edge_counter = txn.snapshot_edge_counter;
        self.by_file = txn.snapshot_by_file;
        self.edges_by_frame = txn.snapshot_edges_by_frame;
        Ok(())
    }

    /// Whether a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        self.txn.is_some()
    }

    /// Flush the backend.
    pub fn flush(&mut self) -> Result<()> {
        self.backend.flush()
    }
}
