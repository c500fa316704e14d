//! Single-file incremental update orchestration.
//!
//! `update_file` is the entry point after a file changes on disk: re-parse
//! just that file, diff the fresh frames against the stored rows by stable
//! id, and swap the difference inside one store transaction. Frames whose
//! content did not change are never rewritten.

use crate::error::{IndexError, Result};
use crate::incremental::diff::{collect_all_frames, StableDiffCalculator};
use crate::incremental::mutator::StoreMutator;
use crate::incremental::repair::RelationshipRepairer;
use crate::parsing::MultiPassParser;
use crate::store::{FrameRecord, FrameStore};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

/// Everything a caller needs to know about one incremental update.
#[derive(Debug, Clone, Default)]
pub struct UpdateResult {
    pub file_path: String,
    pub frames_deleted: usize,
    pub frames_added: usize,
    pub frames_stable: usize,
    pub total_old: usize,
    pub total_new: usize,
    /// Share of the fresh parse that survived unchanged, 0-100
    pub stability_pct: f64,
    pub edges_deleted: usize,
    pub contains_created: usize,
    pub calls_created: usize,
    pub imports_created: usize,
    pub inherits_created: usize,
    pub uses_created: usize,
    pub external_created: usize,
    pub parse_ms: u64,
    pub diff_ms: u64,
    pub db_ms: u64,
    pub total_ms: u64,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl UpdateResult {
    /// Share of the fresh parse that changed, 0-100.
    pub fn churn_percentage(&self) -> f64 {
        100.0 - self.stability_pct
    }

    /// One-line human-readable digest.
    pub fn summary(&self) -> String {
        format!(
            "{}: -{} +{} ={} frames ({:.1}% stable), {} edges repaired in {}ms",
            self.file_path,
            self.frames_deleted,
            self.frames_added,
            self.frames_stable,
            self.stability_pct,
            self.contains_created
                + self.calls_created
                + self.imports_created
                + self.inherits_created
                + self.uses_created,
            self.total_ms,
        )
    }
}

/// Re-indexes individual files against an existing store.
pub struct IncrementalUpdater {
    parser: MultiPassParser,
}

impl IncrementalUpdater {
    pub fn new(parser: MultiPassParser) -> Self {
        Self { parser }
    }

    /// Re-parse one file and reconcile the store with the result.
    ///
    /// The frame swap and relationship repair run inside a single store
    /// transaction. If anything fails after the transaction opened, the
    /// store rolls back to its pre-update state before the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::FileNotFound`] for a missing file before any
    /// store state is touched.
    pub fn update_file(&mut self, store: &mut FrameStore, path: &Path) -> Result<UpdateResult> {
        let started = Instant::now();

        if !path.is_file() {
            return Err(IndexError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let path = path
            .canonicalize()
            .map_err(|e| IndexError::storage(format!("Failed to normalize {path:?}"), Some(e)))?;
        let path_str = path.to_string_lossy().into_owned();

        let mut result = UpdateResult {
            file_path: path_str.clone(),
            ..Default::default()
        };

        let parse_started = Instant::now();
        self.parser.parse_single_file(&path)?;
        result.parse_ms = parse_started.elapsed().as_millis() as u64;

        let diff_started = Instant::now();
        let ctx = self.parser.context();
        let fresh_handles = collect_all_frames(ctx);
        let mut fresh_rows: Vec<FrameRecord> = Vec::with_capacity(fresh_handles.len());
        let mut new_ids: HashSet<String> = HashSet::with_capacity(fresh_handles.len());
        for handle in &fresh_handles {
            if let Some(frame) = ctx.frame(*handle) {
                new_ids.insert(frame.id.clone());
                fresh_rows.push(FrameRecord::from(frame));
            }
        }

        let old_ids: HashSet<String> = store.frame_ids_for_file(&path_str).into_iter().collect();
        let diff = StableDiffCalculator::compute_diff(&old_ids, &new_ids);
        result.diff_ms = diff_started.elapsed().as_millis() as u64;

        result.total_old = old_ids.len();
        result.total_new = new_ids.len();
        result.frames_deleted = diff.deleted.len();
        result.frames_added = diff.added.len();
        result.frames_stable = diff.stable.len();
        result.stability_pct = diff.stability_pct;
        debug!(
            "diff {path_str}: {} deleted, {} added, {} stable",
            diff.deleted.len(),
            diff.added.len(),
            diff.stable.len()
        );

        let db_started = Instant::now();
        match Self::apply(store, &fresh_rows, &diff, self.parser.context(), &mut result) {
            Ok(()) => {}
            Err(e) => {
                if store.in_transaction() {
                    if let Err(rollback_err) = store.rollback() {
                        warn!("rollback after failed update also failed: {rollback_err}");
                    }
                }
                return Err(e);
            }
        }
        result.db_ms = db_started.elapsed().as_millis() as u64;
        result.total_ms = started.elapsed().as_millis() as u64;

        Self::append_warnings(&diff.stable, &mut result);
        info!("{}", result.summary());
        Ok(result)
    }

    fn apply(
        store: &mut FrameStore,
        fresh_rows: &[FrameRecord],
        diff: &crate::incremental::diff::FrameDiff,
        ctx: &crate::graph::CodebaseContext,
        result: &mut UpdateResult,
    ) -> Result<()> {
        store.begin_transaction()?;

        let deleted = StoreMutator::delete_frames(store, &diff.deleted);
        result.edges_deleted = deleted.edges_deleted;
        result.errors.extend(deleted.errors);

        let added_ids: HashSet<&str> = diff.added.iter().map(String::as_str).collect();
        let to_insert: Vec<FrameRecord> = fresh_rows
            .iter()
            .filter(|r| added_ids.contains(r.id.as_str()))
            .cloned()
            .collect();
        let inserted = StoreMutator::insert_frames(store, to_insert);
        result.errors.extend(inserted.errors);

        let repaired = RelationshipRepairer::repair(store, ctx, diff)?;
        result.contains_created = repaired.contains_created;
        result.calls_created = repaired.calls_created;
        result.imports_created = repaired.imports_created;
        result.inherits_created = repaired.inherits_created;
        result.uses_created = repaired.uses_created;
        result.external_created = repaired.external_created;
        result.errors.extend(repaired.errors);
        result.warnings.extend(repaired.warnings);

        store.commit()
    }

    fn append_warnings(stable: &[String], result: &mut UpdateResult) {
        if result.total_new == 0 && result.total_old > 0 {
            result.warnings.push(format!(
                "{}: no frames parsed but {} were stored; file may be emptied or unparseable",
                result.file_path, result.total_old
            ));
        } else if result.stability_pct < 5.0 && result.total_new > 10 {
            result.warnings.push(format!(
                "{}: stability {:.1}% suggests a full rewrite; a fresh index may be cheaper",
                result.file_path, result.stability_pct
            ));
        } else if result.stability_pct > 99.0
            && result.frames_deleted == 0
            && stable.len() == result.total_new
        {
            result
                .warnings
                .push(format!("{}: no changes detected", result.file_path));
        }
    }
}
