//! Pass 2: frame hierarchy construction from raw node streams.

use crate::confidence::frame_confidence;
use crate::error::Result;
use crate::graph::CodebaseContext;
use crate::model::{EdgeKind, Frame, FrameId, FrameKind, Provenance};
use crate::parsing::factory::{control_flow_name, map_raw_kind, FrameFactory};
use framegraph_parser_api::{detect_language, RawNode};
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Builds the CODEBASE → LANGUAGE → PACKAGE → CLASS → CALLABLE → control-flow
/// hierarchy into a [`CodebaseContext`].
pub struct GraphBuilder {
    max_node_depth: usize,
}

impl GraphBuilder {
    pub fn new(max_node_depth: usize) -> Self {
        Self { max_node_depth }
    }

    /// Build the full hierarchy for one session.
    ///
    /// `files` pairs each discovered path with its extracted node stream.
    /// Returns the codebase root handle.
    ///
    /// # Errors
    ///
    /// Fails only on session-level inconsistencies; per-node anomalies are
    /// logged and skipped.
    pub fn build(
        &self,
        ctx: &mut CodebaseContext,
        root_path: &Path,
        files: &[(PathBuf, Vec<RawNode>)],
    ) -> Result<FrameId> {
        let codebase = self.create_codebase_frame(ctx, root_path);
        ctx.codebase_root = Some(codebase);
        ctx.stack.push(FrameKind::Codebase, codebase);

        for (path, nodes) in files {
            let language = detect_language(path).unwrap_or("unknown");
            let language_root = self.language_root(ctx, codebase, language);
            let module = self.package_chain(ctx, root_path, path, language_root);
            self.adopt_module_content(ctx, module, nodes);

            ctx.stack.push(FrameKind::Package, module);
            self.process_nodes(ctx, nodes, language);
            ctx.stack.pop();

            ctx.processed_files.insert(path.clone());
        }

        debug!(
            "hierarchy built: {} frames across {} files",
            ctx.frame_count(),
            files.len()
        );
        Ok(codebase)
    }

    fn create_codebase_frame(&self, ctx: &mut CodebaseContext, root_path: &Path) -> FrameId {
        let name = root_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("codebase")
            .to_string();
        let mut frame = Frame::new(FrameKind::Codebase, &name, &name);
        frame.set_confidence(frame_confidence(1, Provenance::Parsed), Provenance::Parsed, 1);
        // file_path stays unset until after id computation, keeping the
        // codebase id independent of where the tree is mounted.
        frame.id = frame.compute_id();
        ctx.insert_frame(frame)
    }

    /// Get or create the per-language root under the codebase.
    fn language_root(
        &self,
        ctx: &mut CodebaseContext,
        codebase: FrameId,
        language: &str,
    ) -> FrameId {
        if let Some(&existing) = ctx.language_roots.get(language) {
            return existing;
        }
        let codebase_name = ctx
            .frame(codebase)
            .map(|f| f.qualified_name.clone())
            .unwrap_or_default();
        let name = format!("{language}_root");
        let mut frame = Frame::new(FrameKind::Language, &name, format!("{codebase_name}.{name}"));
        frame.language = language.to_string();
        frame.set_confidence(frame_confidence(1, Provenance::Parsed), Provenance::Parsed, 1);
        frame.id = frame.compute_id();

        let handle = ctx.insert_frame(frame);
        ctx.language_roots.insert(language.to_string(), handle);
        ctx.link_child(codebase, handle);
        let edge = ctx.make_edge(EdgeKind::Contains, codebase, handle);
        ctx.add_hierarchy_edge(edge);
        handle
    }

    /// Create the package chain for one file from its path segments,
    /// returning the innermost (module) package.
    fn package_chain(
        &self,
        ctx: &mut CodebaseContext,
        root_path: &Path,
        file_path: &Path,
        language_root: FrameId,
    ) -> FrameId {
        let relative = file_path.strip_prefix(root_path).unwrap_or(file_path);
        let mut segments: Vec<String> = relative
            .parent()
            .map(|dir| {
                dir.components()
                    .filter_map(|c| c.as_os_str().to_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if let Some(stem) = relative.file_stem().and_then(|s| s.to_str()) {
            segments.push(stem.to_string());
        }

        let codebase_name = ctx
            .codebase_root
            .and_then(|root| ctx.frame(root))
            .map(|f| f.qualified_name.clone())
            .unwrap_or_default();

        let mut parent = language_root;
        let mut qualified = codebase_name;
        for segment in &segments {
            qualified = if qualified.is_empty() {
                segment.clone()
            } else {
                format!("{qualified}.{segment}")
            };

            let existing = ctx.package_registry.get(&qualified).copied();
            let handle = match existing {
                Some(handle) => handle,
                None => {
                    let mut frame = Frame::new(FrameKind::Package, segment, &qualified);
                    frame.file_path = Some(file_path.to_path_buf());
                    frame.set_confidence(
                        frame_confidence(1, Provenance::Parsed),
                        Provenance::Parsed,
                        1,
                    );
                    frame.id = frame.compute_id();
                    let handle = ctx.insert_frame(frame);
                    ctx.package_registry.insert(qualified.clone(), handle);
                    handle
                }
            };

            // Package hierarchy edges are explicit; the stack never emits
            // CONTAINS for packages.
            ctx.link_child(parent, handle);
            let edge = ctx.make_edge(EdgeKind::Contains, parent, handle);
            ctx.add_hierarchy_edge(edge);
            parent = handle;
        }

        parent
    }

    /// Fold the file's root node into its module package: the package frame
    /// carries the whole-file content so pass 3 can scan it for imports.
    ///
    /// The module's id is recomputed from its import lines only. Editing a
    /// function body changes that function's frame, not the module's, so
    /// incremental diffs stay scoped; an import change re-flags the module
    /// and gets its IMPORTS edges rebuilt.
    fn adopt_module_content(
        &self,
        ctx: &mut CodebaseContext,
        module: FrameId,
        nodes: &[RawNode],
    ) {
        let root = nodes
            .iter()
            .filter(|n| n.parent.is_none())
            .max_by_key(|n| n.byte_len());
        if let (Some(root), Some(frame)) = (root, ctx.frame_mut(module)) {
            frame.span =
                crate::model::Span::new(root.start_line, root.end_line, root.start_byte, root.end_byte);
            frame.content = import_lines(&root.content);
            frame.id = frame.compute_id();
            frame.content = root.content.clone();
        }
    }

    /// Walk one file's flat node stream, creating frames for mapped kinds and
    /// drilling through the rest.
    fn process_nodes(&self, ctx: &mut CodebaseContext, nodes: &[RawNode], language: &str) {
        let mut processed: HashSet<usize> = HashSet::new();
        for (index, node) in nodes.iter().enumerate() {
            if node.parent.is_none() && !processed.contains(&index) {
                self.process_node(ctx, nodes, index, language, 0, &mut processed);
            }
        }
    }

    fn process_node(
        &self,
        ctx: &mut CodebaseContext,
        nodes: &[RawNode],
        index: usize,
        language: &str,
        depth: usize,
        processed: &mut HashSet<usize>,
    ) {
        if depth > self.max_node_depth {
            warn!("node depth exceeded {} — stopping descent", self.max_node_depth);
            return;
        }
        if !processed.insert(index) {
            return;
        }
        let node = match nodes.get(index) {
            Some(node) => node,
            None => return,
        };

        match map_raw_kind(&node.kind) {
            Some(kind) => {
                let name = if kind.is_control_flow() {
                    control_flow_name(kind, node)
                } else {
                    extract_name(kind, node)
                };
                let (handle, created) =
                    FrameFactory::create_frame(ctx, kind, &name, node, language);

                if !created {
                    // Reused frame already gained an extra parent edge;
                    // never re-descend, cyclic containment would recurse forever.
                    return;
                }

                if kind.creates_context() {
                    ctx.push_context(handle);
                    self.descend(ctx, nodes, index, language, depth, processed);
                    ctx.pop_context();
                } else {
                    ctx.add_child_to_current(handle);
                    self.descend(ctx, nodes, index, language, depth, processed);
                }
            }
            None => {
                // Unmapped node: drill through to semantic descendants.
                self.descend(ctx, nodes, index, language, depth, processed);
            }
        }
    }

    fn descend(
        &self,
        ctx: &mut CodebaseContext,
        nodes: &[RawNode],
        index: usize,
        language: &str,
        depth: usize,
        processed: &mut HashSet<usize>,
    ) {
        let children: Vec<usize> = match nodes.get(index) {
            Some(node) => node
                .children
                .iter()
                .copied()
                .filter(|&c| {
                    nodes
                        .get(c)
                        .map(|child| node.contains(child))
                        .unwrap_or(false)
                })
                .collect(),
            None => return,
        };
        for child in children {
            self.process_node(ctx, nodes, child, language, depth + 1, processed);
        }
    }
}

/// The import statements of a module body, one per line.
fn import_lines(content: &str) -> String {
    content
        .lines()
        .map(str::trim_start)
        .filter(|line| line.starts_with("import ") || line.starts_with("from "))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pull a declaration name out of a raw node's first line.
fn extract_name(kind: FrameKind, node: &RawNode) -> String {
    let first_line = node.content.lines().next().unwrap_or("");
    let keywords: &[&str] = match kind {
        FrameKind::Class => &["class ", "struct "],
        FrameKind::Callable => &["def ", "fn ", "function ", "async def "],
        _ => &[],
    };

    for keyword in keywords {
        if let Some(pos) = first_line.find(keyword) {
            let rest = &first_line[pos + keyword.len()..];
            let name: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !name.is_empty() {
                return name;
            }
        }
    }

    format!(
        "{}_line_{}",
        kind.to_string().to_lowercase(),
        node.start_line
    )
}
