//! Per-session parsing state: the frame arena and everything that indexes it.

use crate::confidence::{decay_for_scope_distance, edge_confidence};
use crate::graph::registry::FrameRegistry;
use crate::graph::stack::FrameStack;
use crate::model::{Edge, EdgeId, EdgeKind, Frame, FrameId, FrameKind};
use log::trace;
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;

/// All state for one parsing session.
///
/// Owns the arena of frames, the scope stack, the per-kind dedup registries,
/// and the three edge collections (stack-produced CONTAINS, pass-2 hierarchy,
/// pass-3 symbol edges). Not internally synchronized: exclusive access per
/// session is a caller contract.
#[derive(Debug, Default)]
pub struct CodebaseContext {
    arena: HashMap<FrameId, Frame>,
    frame_counter: FrameId,
    edge_counter: EdgeId,

    pub stack: FrameStack,
    index: FrameRegistry,

    /// Dedup maps, keyed by qualified name
    pub package_registry: HashMap<String, FrameId>,
    pub class_registry: HashMap<String, FrameId>,
    pub callable_registry: HashMap<String, FrameId>,
    /// Control-flow dedup, keyed by `{file}:{start_byte}:{end_byte}`
    pub control_flow_registry: HashMap<String, FrameId>,

    pub language_roots: HashMap<String, FrameId>,
    pub codebase_root: Option<FrameId>,
    pub external_frames: Vec<FrameId>,
    pub processed_files: HashSet<PathBuf>,

    contains_edges: Vec<Edge>,
    hierarchy_edges: Vec<Edge>,
    symbol_edges: Vec<Edge>,
}

impl CodebaseContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a frame into the arena, assigning its session handle.
    pub fn insert_frame(&mut self, mut frame: Frame) -> FrameId {
        let handle = self.frame_counter;
        self.frame_counter += 1;
        frame.handle = handle;
        self.arena.insert(handle, frame);
        self.index.mark_dirty();
        handle
    }

    pub fn frame(&self, handle: FrameId) -> Option<&Frame> {
        self.arena.get(&handle)
    }

    pub fn frame_mut(&mut self, handle: FrameId) -> Option<&mut Frame> {
        self.index.mark_dirty();
        self.arena.get_mut(&handle)
    }

    pub fn arena(&self) -> &HashMap<FrameId, Frame> {
        &self.arena
    }

    pub fn frame_count(&self) -> usize {
        self.arena.len()
    }

    /// Reserve the next session edge id.
    pub fn next_edge_id(&mut self) -> EdgeId {
        let id = self.edge_counter;
        self.edge_counter += 1;
        id
    }

    /// Link parent and child bidirectionally. Idempotent.
    pub fn link_child(&mut self, parent: FrameId, child: FrameId) {
        if parent == child {
            return;
        }
        if let Some(p) = self.arena.get_mut(&parent) {
            if !p.children.contains(&child) {
                p.children.push(child);
            }
        }
        if let Some(c) = self.arena.get_mut(&child) {
            if !c.parents.contains(&parent) {
                c.parents.push(parent);
            }
        }
        self.index.mark_dirty();
    }

    /// Build a kind-appropriate edge between two arena frames, with the
    /// confidence derived from the weaker endpoint.
    pub fn make_edge(&mut self, kind: EdgeKind, subject: FrameId, object: FrameId) -> Edge {
        let src = self.arena.get(&subject).map(|f| f.confidence).unwrap_or(0.0);
        let dst = self.arena.get(&object).map(|f| f.confidence).unwrap_or(0.0);
        let id = self.next_edge_id();
        Edge::new(id, subject, object, kind, edge_confidence(kind, src, dst))
    }

    /// Open a containment scope for `frame`.
    ///
    /// Every frame at the current top level becomes a parent of `frame` and
    /// emits a CONTAINS edge — except when `frame` is a PACKAGE, whose
    /// hierarchy was pre-established from path segments.
    pub fn push_context(&mut self, frame: FrameId) {
        let kind = match self.arena.get(&frame) {
            Some(f) => f.kind,
            None => return,
        };

        if kind != FrameKind::Package {
            let parents: Vec<FrameId> = self
                .stack
                .top()
                .map(|level| level.values().copied().collect())
                .unwrap_or_default();
            for parent in parents {
                self.link_child(parent, frame);
                let edge = self.make_edge(EdgeKind::Contains, parent, frame);
                self.contains_edges.push(edge);
            }
        }

        trace!("push_context: {kind} frame {frame}");
        self.stack.push(kind, frame);
    }

    /// Close the innermost scope.
    pub fn pop_context(&mut self) {
        self.stack.pop();
    }

    /// Attach `frame` as a child of the current scope frame, with a CONTAINS
    /// edge. Used for frames that do not open a scope of their own.
    pub fn add_child_to_current(&mut self, frame: FrameId) {
        if let Some(parent) = self.stack.current_frame() {
            self.link_child(parent, frame);
            let edge = self.make_edge(EdgeKind::Contains, parent, frame);
            self.contains_edges.push(edge);
        }
    }

    /// Dotted scope path for qualified-name mangling: packages contribute
    /// their qualified name, classes and callables their simple name,
    /// outermost first.
    pub fn context_path(&self) -> Vec<String> {
        let mut path = Vec::new();
        for level in self.stack.levels() {
            for kind in [FrameKind::Package, FrameKind::Class, FrameKind::Callable] {
                if let Some(handle) = level.get(&kind) {
                    if let Some(frame) = self.arena.get(handle) {
                        let segment = if kind == FrameKind::Package {
                            frame.qualified_name.clone()
                        } else {
                            frame.name.clone()
                        };
                        if !segment.is_empty() {
                            path.push(segment);
                        }
                    }
                }
            }
        }
        path
    }

    /// Qualified name for a new frame named `name` in the current scope.
    pub fn qualify(&self, name: &str) -> String {
        let path = self.context_path();
        if path.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", path.join("."), name)
        }
    }

    /// Find `name` by scanning open scopes outward; confidence decays 0.95
    /// per scope level crossed.
    pub fn resolve_symbol_with_confidence(&self, name: &str) -> Option<(FrameId, f64)> {
        for (distance, level) in self.stack.iter_outward() {
            for handle in level.values() {
                let frame = match self.arena.get(handle) {
                    Some(frame) => frame,
                    None => continue,
                };
                if frame.name == name {
                    return Some((*handle, decay_for_scope_distance(frame.confidence, distance)));
                }
                for child in &frame.children {
                    if let Some(child_frame) = self.arena.get(child) {
                        if child_frame.name == name {
                            return Some((
                                *child,
                                decay_for_scope_distance(child_frame.confidence, distance),
                            ));
                        }
                    }
                }
            }
        }
        None
    }

    pub fn add_hierarchy_edge(&mut self, edge: Edge) {
        self.hierarchy_edges.push(edge);
    }

    pub fn add_symbol_edge(&mut self, edge: Edge) {
        self.symbol_edges.push(edge);
    }

    /// All frames reachable from the codebase root, visited breadth-first and
    /// deduped by stable id, followed by external frames.
    ///
    /// The visited set keys on stable id, not arena handle: a frame reachable
    /// through two parents is enqueued twice but returned once. With no root
    /// (degraded sessions), falls back to the union of the dedup registries.
    pub fn get_all_frames(&self) -> Vec<FrameId> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut ordered = Vec::new();

        if let Some(root) = self.codebase_root {
            let mut queue = VecDeque::new();
            queue.push_back(root);
            while let Some(handle) = queue.pop_front() {
                let frame = match self.arena.get(&handle) {
                    Some(frame) => frame,
                    None => continue,
                };
                if !visited.insert(frame.id.clone()) {
                    continue;
                }
                ordered.push(handle);
                for child in &frame.children {
                    queue.push_back(*child);
                }
            }
        } else {
            for handle in self
                .package_registry
                .values()
                .chain(self.class_registry.values())
                .chain(self.callable_registry.values())
                .chain(self.control_flow_registry.values())
            {
                if let Some(frame) = self.arena.get(handle) {
                    if visited.insert(frame.id.clone()) {
                        ordered.push(*handle);
                    }
                }
            }
        }

        for handle in &self.external_frames {
            if let Some(frame) = self.arena.get(handle) {
                if visited.insert(frame.id.clone()) {
                    ordered.push(*handle);
                }
            }
        }

        ordered
    }

    /// Union of stack-produced CONTAINS edges, hierarchy edges, and symbol
    /// edges, in that order.
    pub fn get_all_edges(&self) -> Vec<Edge> {
        self.contains_edges
            .iter()
            .chain(self.hierarchy_edges.iter())
            .chain(self.symbol_edges.iter())
            .cloned()
            .collect()
    }

    /// Lazy index lookups over the whole arena.
    pub fn with_index<R>(&mut self, f: impl FnOnce(&FrameRegistry) -> R) -> R {
        self.index.ensure_fresh(&self.arena);
        f(&self.index)
    }

    /// Clear all session state. Not safe to call with a parse in flight.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.frame_counter = 0;
        self.edge_counter = 0;
        self.stack.clear();
        self.index = FrameRegistry::new();
        self.package_registry.clear();
        self.class_registry.clear();
        self.callable_registry.clear();
        self.control_flow_registry.clear();
        self.language_roots.clear();
        self.codebase_root = None;
        self.external_frames.clear();
        self.processed_files.clear();
        self.contains_edges.clear();
        self.hierarchy_edges.clear();
        self.symbol_edges.clear();
    }
}
