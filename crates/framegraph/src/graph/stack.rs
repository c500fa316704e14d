//! Scope stack tracked during hierarchy construction.

use crate::model::{FrameId, FrameKind};
use std::collections::HashMap;

/// Priority order used when asking "which frame are we inside right now".
const CURRENT_FRAME_PRIORITY: &[FrameKind] = &[
    FrameKind::Callable,
    FrameKind::Class,
    FrameKind::Package,
    FrameKind::Language,
    FrameKind::Codebase,
];

/// Stack of open containment scopes.
///
/// Each level maps frame kinds to the frame opened at that level. Pushing
/// happens on entry to any context-creating frame; popping on exit. The stack
/// is pure bookkeeping — edge creation on push lives in
/// [`crate::graph::CodebaseContext`], which owns both the stack and the arena.
#[derive(Debug, Default)]
pub struct FrameStack {
    levels: Vec<HashMap<FrameKind, FrameId>>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self { levels: Vec::new() }
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Open a new scope level containing `frame`.
    pub fn push(&mut self, kind: FrameKind, frame: FrameId) {
        let mut level = HashMap::new();
        level.insert(kind, frame);
        self.levels.push(level);
    }

    /// Close the innermost scope level.
    pub fn pop(&mut self) -> Option<HashMap<FrameKind, FrameId>> {
        self.levels.pop()
    }

    /// Frames at the innermost level, if any.
    pub fn top(&self) -> Option<&HashMap<FrameKind, FrameId>> {
        self.levels.last()
    }

    /// The frame new children should attach to: the innermost open frame,
    /// preferring CALLABLE over CLASS over PACKAGE over LANGUAGE over CODEBASE
    /// within a level, scanning outward.
    pub fn current_frame(&self) -> Option<FrameId> {
        for level in self.levels.iter().rev() {
            for kind in CURRENT_FRAME_PRIORITY {
                if let Some(frame) = level.get(kind) {
                    return Some(*frame);
                }
            }
            // Control-flow levels hold kinds outside the priority list;
            // fall through to any frame at this level.
            if let Some(frame) = level.values().next() {
                return Some(*frame);
            }
        }
        None
    }

    /// Innermost frame of a specific kind, scanning outward.
    pub fn innermost_of_kind(&self, kind: FrameKind) -> Option<FrameId> {
        self.levels
            .iter()
            .rev()
            .find_map(|level| level.get(&kind))
            .copied()
    }

    /// Levels from outermost to innermost.
    pub fn levels(&self) -> &[HashMap<FrameKind, FrameId>] {
        &self.levels
    }

    /// Iterate levels from innermost to outermost with their distance
    /// (0 = innermost), for scope-decayed symbol resolution.
    pub fn iter_outward(&self) -> impl Iterator<Item = (u32, &HashMap<FrameKind, FrameId>)> {
        self.levels
            .iter()
            .rev()
            .enumerate()
            .map(|(i, level)| (i as u32, level))
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }
}
