//! Persistent graph store: a key-value backend abstraction and the
//! transactional frame/edge store built on top of it.

use crate::error::Result;

mod frame_store;
mod memory;
mod records;
#[cfg(feature = "rocksdb-backend")]
mod rocksdb_backend;

pub use frame_store::{FrameStore, Transaction};
pub use memory::MemoryBackend;
pub use records::{EdgeRecord, FrameRecord};
#[cfg(feature = "rocksdb-backend")]
pub use rocksdb_backend::RocksDbBackend;

/// A key-value pair from a prefix scan.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// One operation in an atomic batch.
#[derive(Debug, Clone)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

/// Pluggable storage backend.
///
/// Implementations must apply `write_batch` atomically: either every
/// operation lands or none do. That atomicity is what the frame store's
/// commit leans on.
pub trait StorageBackend: Send + Sync {
    /// Store a key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Retrieve a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Delete a key. Deleting a missing key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Check whether a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool>;

    /// All pairs whose key starts with `prefix`.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Vec<KeyValue>>;

    /// Apply a batch of operations atomically.
    fn write_batch(&mut self, operations: Vec<BatchOperation>) -> Result<()>;

    /// Flush pending writes to durable storage.
    fn flush(&mut self) -> Result<()>;
}
