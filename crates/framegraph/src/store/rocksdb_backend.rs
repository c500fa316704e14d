//! RocksDB storage backend for durable indexes.
//!
//! Writes go through the WAL, and batches map onto RocksDB's own
//! `WriteBatch`, which gives the frame store its atomic commit.

use super::{BatchOperation, KeyValue, StorageBackend};
use crate::error::{IndexError, Result};
use rocksdb::{Options, WriteBatch, DB};
use std::path::Path;
use std::sync::Arc;

/// RocksDB-backed persistent storage.
#[derive(Clone)]
pub struct RocksDbBackend {
    db: Arc<DB>,
}

impl RocksDbBackend {
    /// Open the index database under `path`, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Storage`] if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path.as_ref()).map_err(|e| {
            IndexError::storage(
                format!("Failed to open index database at {:?}", path.as_ref()),
                Some(e),
            )
        })?;

        Ok(Self { db: Arc::new(db) })
    }
}

impl StorageBackend for RocksDbBackend {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.db
            .put(key, value)
            .map_err(|e| IndexError::storage("Failed to write row", Some(e)))
    }

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        self.db
            .get(key)
            .map_err(|e| IndexError::storage("Failed to read row", Some(e)))
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.db
            .delete(key)
            .map_err(|e| IndexError::storage("Failed to delete row", Some(e)))
    }

    fn exists(&self, key: &[u8]) -> Result<bool> {
        self.db
            .get(key)
            .map(|opt| opt.is_some())
            .map_err(|e| IndexError::storage("Failed to check for row", Some(e)))
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>> {
        let mut results = Vec::new();
        for item in self.db.prefix_iterator(prefix) {
            let (key, value) =
                item.map_err(|e| IndexError::storage("Failed to scan key prefix", Some(e)))?;
            // prefix_iterator positions on the prefix but keeps going past it
            if !key.starts_with(prefix) {
                break;
            }
            results.push((key.to_vec(), value.to_vec()));
        }
        Ok(results)
    }

    fn write_batch(&mut self, operations: Vec<BatchOperation>) -> Result<()> {
        let mut batch = WriteBatch::default();
        for op in operations {
            match op {
                BatchOperation::Put { key, value } => batch.put(&key, &value),
                BatchOperation::Delete { key } => batch.delete(&key),
            }
        }
        self.db
            .write(batch)
            .map_err(|e| IndexError::storage("Failed to commit batch", Some(e)))
    }

    fn flush(&mut self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| IndexError::storage("Failed to flush index", Some(e)))
    }
}
