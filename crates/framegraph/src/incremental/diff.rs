//! Stable-id diffing between a fresh parse and the persisted index.
//!
//! Frame ids are content fingerprints, so set arithmetic over ids is the
//! whole diff: a frame whose id survives is byte-for-byte the same code.

use crate::graph::CodebaseContext;
use crate::model::{FrameId, Provenance};
use std::collections::HashSet;

/// Outcome of diffing one file's frames against its stored rows.
#[derive(Debug, Clone, Default)]
pub struct FrameDiff {
    /// Ids present in the store but absent from the fresh parse
    pub deleted: Vec<String>,
    /// Ids present in the fresh parse but absent from the store
    pub added: Vec<String>,
    /// Ids present in both
    pub stable: Vec<String>,
    /// |stable| / |new| as a percentage; 0.0 when the fresh parse is empty
    pub stability_pct: f64,
}

impl FrameDiff {
    pub fn is_noop(&self) -> bool {
        self.deleted.is_empty() && self.added.is_empty()
    }
}

/// Computes frame diffs from stable-id sets.
pub struct StableDiffCalculator;

impl StableDiffCalculator {
    /// Diff the stored ids for a file against the ids from a fresh parse.
    pub fn compute_diff(old_ids: &HashSet<String>, new_ids: &HashSet<String>) -> FrameDiff {
        let mut deleted: Vec<String> = old_ids.difference(new_ids).cloned().collect();
        let mut added: Vec<String> = new_ids.difference(old_ids).cloned().collect();
        let mut stable: Vec<String> = old_ids.intersection(new_ids).cloned().collect();
        deleted.sort();
        added.sort();
        stable.sort();

        let stability_pct = if new_ids.is_empty() {
            0.0
        } else {
            stable.len() as f64 / new_ids.len() as f64 * 100.0
        };

        FrameDiff {
            deleted,
            added,
            stable,
            stability_pct,
        }
    }
}

/// Every reachable frame in the context, depth-first from the parentless
/// roots. External and unknown-import placeholders are excluded: they
/// belong to no file and must never be deleted by a file-scoped update.
pub fn collect_all_frames(ctx: &CodebaseContext) -> Vec<FrameId> {
    let placeholders: HashSet<FrameId> = ctx.external_frames.iter().copied().collect();
    let mut visited: HashSet<String> = HashSet::new();
    let mut collected = Vec::new();
    let mut stack: Vec<FrameId> = ctx
        .arena()
        .iter()
        .filter(|(_, frame)| frame.parents.is_empty())
        .map(|(&handle, _)| handle)
        .collect();
    stack.sort_unstable();
    stack.reverse();

    while let Some(handle) = stack.pop() {
        let frame = match ctx.frame(handle) {
            Some(f) => f,
            None => continue,
        };
        if !visited.insert(frame.id.clone()) {
            continue;
        }
        if frame.provenance != Provenance::External && !placeholders.contains(&handle) {
            collected.push(handle);
        }
        for &child in frame.children.iter().rev() {
            stack.push(child);
        }
    }
    collected
}
