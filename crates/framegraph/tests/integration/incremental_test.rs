//! Incremental update scenarios: first index, targeted edits, renames,
//! emptied files, and transactional failure.

#[path = "../common/mod.rs"]
mod common;

use common::{write_file, PyLiteParser};
use framegraph::store::{BatchOperation, FrameStore, KeyValue, MemoryBackend, StorageBackend};
use framegraph::{
    EdgeKind, FrameKind, IncrementalUpdater, IndexError, IndexerConfig, MultiPassParser,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

fn updater() -> IncrementalUpdater {
    let parser =
        MultiPassParser::new(IndexerConfig::default()).with_parser(Box::new(PyLiteParser));
    IncrementalUpdater::new(parser)
}

fn callable_row_id(store: &FrameStore, suffix: &str) -> Option<String> {
    store
        .frames_of_kind(FrameKind::Callable)
        .into_iter()
        .find(|r| r.qualified_name.ends_with(suffix))
        .map(|r| r.id.clone())
}

#[test]
fn first_index_inserts_everything() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "app.py",
        "class Widget:\n    def render(self):\n        return 1\n",
    );

    let mut store = FrameStore::in_memory();
    let result = updater().update_file(&mut store, &path).unwrap();

    assert_eq!(result.frames_deleted, 0);
    assert!(result.frames_added >= 5); // codebase, language, module, class, method
    assert_eq!(result.total_old, 0);
    assert_eq!(result.stability_pct, 0.0);
    assert!(result.contains_created > 0);
    assert_eq!(store.frame_count(), result.frames_added);
    assert!(callable_row_id(&store, ".Widget.render").is_some());
}

#[test]
fn unchanged_file_is_a_noop_with_a_notice() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "app.py", "def main():\n    pass\n");

    let mut store = FrameStore::in_memory();
    let mut updater = updater();
    updater.update_file(&mut store, &path).unwrap();
    let frames_before = store.frame_count();
    let edges_before = store.edge_count();

    let result = updater.update_file(&mut store, &path).unwrap();
    assert_eq!(result.frames_deleted, 0);
    assert_eq!(result.frames_added, 0);
    assert_eq!(result.stability_pct, 100.0);
    assert!((result.churn_percentage() - 0.0).abs() < 1e-9);
    assert!(result.warnings.iter().any(|w| w.contains("no changes")));
    assert_eq!(store.frame_count(), frames_before);
    assert_eq!(store.edge_count(), edges_before);
}

#[test]
fn editing_one_function_swaps_only_its_frame() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "mod.py",
        "def alpha():\n    return 1\n\ndef beta():\n    return 2\n",
    );

    let mut store = FrameStore::in_memory();
    let mut updater = updater();
    updater.update_file(&mut store, &path).unwrap();
    let old_beta = callable_row_id(&store, ".beta").unwrap();
    let alpha = callable_row_id(&store, ".alpha").unwrap();

    write_file(
        dir.path(),
        "mod.py",
        "def alpha():\n    return 1\n\ndef beta():\n    return 2000\n",
    );
    let result = updater.update_file(&mut store, &path).unwrap();

    assert_eq!(result.frames_deleted, 1);
    assert_eq!(result.frames_added, 1);
    assert!(result.stability_pct > 50.0);
    assert!(store.get_frame(&old_beta).is_none());
    assert_eq!(callable_row_id(&store, ".alpha"), Some(alpha));
    let new_beta = callable_row_id(&store, ".beta").unwrap();
    assert_ne!(new_beta, old_beta);
}

#[test]
fn renaming_an_unrelated_function_preserves_cross_file_calls() {
    let dir = TempDir::new().unwrap();
    let callee_path = write_file(dir.path(), "b.py", "def target():\n    return 2\n");
    let caller_path = write_file(
        dir.path(),
        "a.py",
        "def caller():\n    target()\n\ndef unrelated():\n    return 1\n",
    );

    let mut store = FrameStore::in_memory();
    let mut updater = updater();
    // Callee first so the caller's CALLS edge resolves at index time.
    updater.update_file(&mut store, &callee_path).unwrap();
    updater.update_file(&mut store, &caller_path).unwrap();

    let caller = callable_row_id(&store, ".caller").unwrap();
    let target = callable_row_id(&store, ".target").unwrap();
    let cross_file = |store: &FrameStore| {
        store
            .edges_for_frame(&caller)
            .iter()
            .any(|e| e.kind == EdgeKind::Calls && e.object_id == target)
    };
    assert!(cross_file(&store));

    write_file(
        dir.path(),
        "a.py",
        "def caller():\n    target()\n\ndef renamed():\n    return 1\n",
    );
    let result = updater.update_file(&mut store, &caller_path).unwrap();

    assert_eq!(result.frames_deleted, 1);
    assert_eq!(result.frames_added, 1);
    assert!(cross_file(&store));
    assert!(callable_row_id(&store, ".renamed").is_some());
    assert!(callable_row_id(&store, ".unrelated").is_none());
}

#[test]
fn emptying_a_file_deletes_its_definitions() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "app.py",
        "class Widget:\n    def render(self):\n        return 1\n",
    );

    let mut store = FrameStore::in_memory();
    let mut updater = updater();
    updater.update_file(&mut store, &path).unwrap();
    assert!(callable_row_id(&store, ".render").is_some());

    write_file(dir.path(), "app.py", "");
    let result = updater.update_file(&mut store, &path).unwrap();

    assert_eq!(result.frames_deleted, 2); // the class and its method
    assert_eq!(result.frames_added, 0);
    assert!(callable_row_id(&store, ".render").is_none());
    assert!(store.frames_of_kind(FrameKind::Class).is_empty());
    // The module scaffolding survives for the day content comes back.
    assert!(!store.frames_of_kind(FrameKind::Package).is_empty());
}

#[test]
fn missing_file_fails_before_touching_the_store() {
    let dir = TempDir::new().unwrap();
    let mut store = FrameStore::in_memory();
    let err = updater()
        .update_file(&mut store, &dir.path().join("ghost.py"))
        .unwrap_err();
    assert!(matches!(err, IndexError::FileNotFound { .. }));
    assert_eq!(store.frame_count(), 0);
    assert!(!store.in_transaction());
}

/// Delegates to a memory backend until `fail` flips, then rejects batches.
struct FlakyBackend {
    inner: MemoryBackend,
    fail: Arc<AtomicBool>,
}

impl StorageBackend for FlakyBackend {
    fn put(&mut self, key: &[u8], value: &[u8]) -> framegraph::Result<()> {
        self.inner.put(key, value)
    }
    fn get(&self, key: &[u8]) -> framegraph::Result<Option<Vec<u8>>> {
        self.inner.get(key)
    }
    fn delete(&mut self, key: &[u8]) -> framegraph::Result<()> {
        self.inner.delete(key)
    }
    fn exists(&self, key: &[u8]) -> framegraph::Result<bool> {
        self.inner.exists(key)
    }
    fn scan_prefix(&self, prefix: &[u8]) -> framegraph::Result<Vec<KeyValue>> {
        self.inner.scan_prefix(prefix)
    }
    fn write_batch(&mut self, operations: Vec<BatchOperation>) -> framegraph::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(IndexError::storage(
                "injected batch failure",
                None::<std::io::Error>,
            ));
        }
        self.inner.write_batch(operations)
    }
    fn flush(&mut self) -> framegraph::Result<()> {
        self.inner.flush()
    }
}

#[test]
fn failed_commit_rolls_the_whole_update_back() {
    let dir = TempDir::new().unwrap();
    let path = write_file(
        dir.path(),
        "mod.py",
        "def alpha():\n    return 1\n\ndef beta():\n    return 2\n",
    );

    let fail = Arc::new(AtomicBool::new(false));
    let backend = FlakyBackend {
        inner: MemoryBackend::new(),
        fail: Arc::clone(&fail),
    };
    let mut store = FrameStore::with_backend(Box::new(backend)).unwrap();
    let mut updater = updater();
    updater.update_file(&mut store, &path).unwrap();

    let frames_before = store.frame_count();
    let edges_before = store.edge_count();
    let beta_before = callable_row_id(&store, ".beta").unwrap();

    fail.store(true, Ordering::SeqCst);
    write_file(
        dir.path(),
        "mod.py",
        "def alpha():\n    return 1\n\ndef beta():\n    return 999\n",
    );
    let err = updater.update_file(&mut store, &path).unwrap_err();
    assert!(matches!(err, IndexError::Storage { .. }));

    // The failed edit left nothing behind.
    assert!(!store.in_transaction());
    assert_eq!(store.frame_count(), frames_before);
    assert_eq!(store.edge_count(), edges_before);
    assert_eq!(callable_row_id(&store, ".beta"), Some(beta_before));

    // And the store still works once the backend recovers.
    fail.store(false, Ordering::SeqCst);
    let result = updater.update_file(&mut store, &path).unwrap();
    assert_eq!(result.frames_deleted, 1);
    assert_eq!(result.frames_added, 1);
}
