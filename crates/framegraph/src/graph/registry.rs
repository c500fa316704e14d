//! Lazy secondary index over the frame arena.

use crate::model::{Frame, FrameId, FrameKind};
use std::collections::HashMap;

/// Index of arena frames by stable id, qualified name, kind, and name.
///
/// The index is rebuilt on demand: mutation paths call [`FrameRegistry::mark_dirty`]
/// and lookups rebuild lazily from the arena. This keeps the hot construction
/// path free of incremental index maintenance.
#[derive(Debug, Default)]
pub struct FrameRegistry {
    by_id: HashMap<String, FrameId>,
    by_qualified_name: HashMap<String, Vec<FrameId>>,
    by_kind: HashMap<FrameKind, Vec<FrameId>>,
    by_name: HashMap<String, Vec<FrameId>>,
    dirty: bool,
}

impl FrameRegistry {
    pub fn new() -> Self {
        Self {
            dirty: true,
            ..Self::default()
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Rebuild all indexes from the arena if anything changed since the last
    /// lookup.
    pub fn ensure_fresh(&mut self, arena: &HashMap<FrameId, Frame>) {
        if !self.dirty {
            return;
        }
        self.by_id.clear();
        self.by_qualified_name.clear();
        self.by_kind.clear();
        self.by_name.clear();

        for (handle, frame) in arena {
            self.by_id.insert(frame.id.clone(), *handle);
            self.by_qualified_name
                .entry(frame.qualified_name.clone())
                .or_default()
                .push(*handle);
            self.by_kind.entry(frame.kind).or_default().push(*handle);
            self.by_name
                .entry(frame.name.clone())
                .or_default()
                .push(*handle);
        }
        self.dirty = false;
    }

    pub fn find_by_id(&self, id: &str) -> Option<FrameId> {
        self.by_id.get(id).copied()
    }

    pub fn find_by_qualified_name(&self, qualified_name: &str) -> &[FrameId] {
        self.by_qualified_name
            .get(qualified_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn find_by_kind(&self, kind: FrameKind) -> &[FrameId] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_by_name(&self, name: &str) -> &[FrameId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check structural invariants and return human-readable violations.
    ///
    /// Flags duplicate qualified names within one semantic kind and
    /// parent/child links that are not mirrored on both sides.
    pub fn validate_integrity(arena: &HashMap<FrameId, Frame>) -> Vec<String> {
        let mut issues = Vec::new();

        let mut seen: HashMap<(FrameKind, &str), FrameId> = HashMap::new();
        for (handle, frame) in arena {
            if !frame.kind.is_semantic() {
                continue;
            }
            if let Some(previous) = seen.insert((frame.kind, frame.qualified_name.as_str()), *handle)
            {
                issues.push(format!(
                    "duplicate qualified name '{}' for kind {} (frames {} and {})",
                    frame.qualified_name, frame.kind, previous, handle
                ));
            }
        }

        for (handle, frame) in arena {
            for child in &frame.children {
                match arena.get(child) {
                    Some(child_frame) if child_frame.parents.contains(handle) => {}
                    Some(_) => issues.push(format!(
                        "child {} of frame {} does not list it as parent",
                        child, handle
                    )),
                    None => issues.push(format!(
                        "frame {} references missing child {}",
                        handle, child
                    )),
                }
            }
            for parent in &frame.parents {
                match arena.get(parent) {
                    Some(parent_frame) if parent_frame.children.contains(handle) => {}
                    Some(_) => issues.push(format!(
                        "parent {} of frame {} does not list it as child",
                        parent, handle
                    )),
                    None => issues.push(format!(
                        "frame {} references missing parent {}",
                        handle, parent
                    )),
                }
            }
        }

        issues
    }
}
