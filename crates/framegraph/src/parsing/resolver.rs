//! Pass 3: cross-reference resolution over the completed hierarchy.
//!
//! Resolution order is imports, inheritance, calls, field usages. Every
//! unresolved reference becomes a low-confidence external frame rather than
//! being dropped; per-reference failures only ever cost confidence.

use crate::confidence::frame_confidence;
use crate::graph::CodebaseContext;
use crate::model::{EdgeKind, FrameId, FrameKind, Provenance};
use crate::parsing::factory::FrameFactory;
use crate::resolve::{resolve_callable, resolve_class, MemoryResolution};
use log::debug;
use serde_json::json;

/// Reserved words that look like call sites but never are.
const CALL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "return", "match", "switch", "with", "not", "and", "or", "in", "def",
    "fn", "print", "len", "range", "str", "int", "float", "list", "dict", "set", "tuple", "super",
    "isinstance", "type",
];

/// Walks the frame hierarchy and emits IMPORTS, INHERITS, IMPLEMENTS, CALLS,
/// and USES edges into the session's symbol-edge collection.
pub struct SymbolResolver;

impl SymbolResolver {
    /// Resolve all references in the session. Never fails: localized
    /// resolution problems degrade to speculative frames and edges.
    pub fn resolve_references(ctx: &mut CodebaseContext) {
        Self::resolve_imports(ctx);
        Self::resolve_inheritance(ctx);
        Self::resolve_calls(ctx);
        Self::resolve_field_usages(ctx);
        debug!(
            "symbol resolution complete: {} frames in arena",
            ctx.frame_count()
        );
    }

    /// IMPORTS edges from module packages to their import targets.
    pub fn resolve_imports(ctx: &mut CodebaseContext) {
        let packages: Vec<FrameId> = ctx.package_registry.values().copied().collect();
        for package in packages {
            let (content, importer_qualified) = match ctx.frame(package) {
                Some(frame) => (frame.content.clone(), frame.qualified_name.clone()),
                None => continue,
            };
            for import_path in extract_imports(&content) {
                Self::resolve_one_import(ctx, package, &importer_qualified, &import_path);
            }
        }
    }

    fn resolve_one_import(
        ctx: &mut CodebaseContext,
        importer: FrameId,
        importer_qualified: &str,
        import_path: &str,
    ) {
        let (target, resolved) = if let Some(stripped) = import_path.strip_prefix('.') {
            // Relative import: each extra leading dot walks one package up
            // from the importing module.
            let dots = 1 + stripped.chars().take_while(|&c| c == '.').count();
            let remainder = stripped.trim_start_matches('.');
            let mut base = importer_qualified.to_string();
            for _ in 0..dots {
                base = match base.rfind('.') {
                    Some(i) => base[..i].to_string(),
                    None => String::new(),
                };
            }
            let absolute = if remainder.is_empty() {
                base
            } else if base.is_empty() {
                remainder.to_string()
            } else {
                format!("{base}.{remainder}")
            };
            match ctx.package_registry.get(&absolute).copied() {
                Some(found) => (found, true),
                None => {
                    let name = absolute.rsplit('.').next().unwrap_or(&absolute).to_string();
                    let placeholder = FrameFactory::create_external_frame(
                        ctx,
                        FrameKind::Package,
                        &name,
                        &absolute,
                        0.3,
                    );
                    (placeholder, false)
                }
            }
        } else {
            // Absolute import: exact package, else suffix walk.
            let exact = ctx.package_registry.get(import_path).copied();
            let found = exact.or_else(|| {
                let suffix = format!(".{import_path}");
                ctx.package_registry
                    .iter()
                    .filter(|(qn, _)| qn.ends_with(&suffix))
                    .min_by_key(|(qn, _)| qn.len())
                    .map(|(_, &handle)| handle)
            });
            match found {
                Some(found) => (found, true),
                None => {
                    let name = import_path.rsplit('.').next().unwrap_or(import_path);
                    let placeholder = FrameFactory::create_external_frame(
                        ctx,
                        FrameKind::Package,
                        name,
                        import_path,
                        frame_confidence(3, Provenance::UnknownImport),
                    );
                    if let Some(frame) = ctx.frame_mut(placeholder) {
                        frame.provenance = Provenance::UnknownImport;
                    }
                    (placeholder, false)
                }
            }
        };

        let edge = ctx
            .make_edge(EdgeKind::Imports, importer, target)
            .with_meta("import_path", import_path)
            .with_meta(
                "provenance",
                if resolved { "resolved" } else { "speculative" },
            );
        ctx.add_symbol_edge(edge);
    }

    /// INHERITS/IMPLEMENTS edges for every class with listed bases.
    pub fn resolve_inheritance(ctx: &mut CodebaseContext) {
        let classes: Vec<FrameId> = ctx.class_registry.values().copied().collect();
        for class in classes {
            let content = match ctx.frame(class) {
                Some(frame) => frame.content.clone(),
                None => continue,
            };
            for (base, kind) in extract_base_classes(&content) {
                let target = {
                    let strategy = MemoryResolution::new(ctx);
                    resolve_class(&strategy, &base).and_then(|r| r.frame)
                };
                let target = match target {
                    Some(found) if found != class => found,
                    Some(_) => continue,
                    None => {
                        let name = base.rsplit('.').next().unwrap_or(&base).to_string();
                        FrameFactory::create_external_frame(ctx, FrameKind::Class, &name, &base, 0.3)
                    }
                };
                let edge = ctx.make_edge(kind, class, target);
                ctx.add_symbol_edge(edge);
            }
        }
    }

    /// CALLS edges from every callable to each resolvable call site.
    pub fn resolve_calls(ctx: &mut CodebaseContext) {
        let callables: Vec<FrameId> = ctx.callable_registry.values().copied().collect();
        for caller in callables {
            let (content, caller_qualified, own_name) = match ctx.frame(caller) {
                Some(frame) => (
                    frame.content.clone(),
                    frame.qualified_name.clone(),
                    frame.name.clone(),
                ),
                None => continue,
            };
            for (callee, line) in extract_call_names(&content) {
                if callee == own_name {
                    continue;
                }
                let resolved = {
                    let strategy = MemoryResolution::new(ctx);
                    resolve_callable(&strategy, &callee, Some(&caller_qualified))
                        .and_then(|r| r.frame)
                };
                let target = match resolved {
                    Some(found) => found,
                    None => FrameFactory::create_external_frame(
                        ctx,
                        FrameKind::Callable,
                        &callee,
                        &callee,
                        frame_confidence(3, Provenance::Inferred),
                    ),
                };
                if target == caller {
                    continue;
                }
                let edge = ctx
                    .make_edge(EdgeKind::Calls, caller, target)
                    .with_meta("line", json!(line));
                ctx.add_symbol_edge(edge);
            }
        }
    }

    /// USES edges from methods to the class whose fields they touch.
    pub fn resolve_field_usages(ctx: &mut CodebaseContext) {
        let callables: Vec<FrameId> = ctx.callable_registry.values().copied().collect();
        for callable in callables {
            let content = match ctx.frame(callable) {
                Some(frame) => frame.content.clone(),
                None => continue,
            };
            let enclosing_class = Self::enclosing_class(ctx, callable);
            for (field, access, line) in extract_field_uses(&content) {
                if let Some(class) = enclosing_class {
                    let edge = ctx
                        .make_edge(EdgeKind::Uses, callable, class)
                        .with_meta("field_name", field)
                        .with_meta("access_type", access)
                        .with_meta("line", json!(line));
                    ctx.add_symbol_edge(edge);
                }
            }
        }
    }

    /// Nearest CLASS ancestor of a frame, if any.
    fn enclosing_class(ctx: &CodebaseContext, frame: FrameId) -> Option<FrameId> {
        let mut queue: Vec<FrameId> = ctx.frame(frame)?.parents.clone();
        let mut visited = std::collections::HashSet::new();
        while let Some(parent) = queue.pop() {
            if !visited.insert(parent) {
                continue;
            }
            let parent_frame = ctx.frame(parent)?;
            if parent_frame.kind == FrameKind::Class {
                return Some(parent);
            }
            queue.extend(parent_frame.parents.iter().copied());
        }
        None
    }
}

/// Import paths from `import X` / `from X import Y` lines.
pub(crate) fn extract_imports(content: &str) -> Vec<String> {
    let mut imports = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("from ") {
            if let Some(path) = rest.split_whitespace().next() {
                imports.push(path.to_string());
            }
        } else if let Some(rest) = trimmed.strip_prefix("import ") {
            for part in rest.split(',') {
                if let Some(path) = part.split_whitespace().next() {
                    imports.push(path.to_string());
                }
            }
        }
    }
    imports
}

/// Base classes from a declaration line, tagged INHERITS or IMPLEMENTS.
pub(crate) fn extract_base_classes(content: &str) -> Vec<(String, EdgeKind)> {
    let first_line = content.lines().next().unwrap_or("");
    let mut bases = Vec::new();

    if let Some(open) = first_line.find('(') {
        if let Some(close) = first_line[open..].find(')') {
            for base in first_line[open + 1..open + close].split(',') {
                let base = base.trim();
                if !base.is_empty() && base != "object" {
                    bases.push((base.to_string(), EdgeKind::Inherits));
                }
            }
        }
    }
    if let Some(pos) = first_line.find(" implements ") {
        let tail = first_line[pos + " implements ".len()..]
            .trim_end_matches([':', '{'])
            .trim();
        for iface in tail.split(',') {
            let iface = iface.trim();
            if !iface.is_empty() {
                bases.push((iface.to_string(), EdgeKind::Implements));
            }
        }
    }

    bases
}

/// Candidate callee names with their 1-based line offsets within `content`.
///
/// A call site is an identifier immediately followed by `(` that is neither a
/// declaration nor a reserved word; `obj.method(` yields `method`.
pub(crate) fn extract_call_names(content: &str) -> Vec<(String, usize)> {
    let mut calls = Vec::new();
    for (offset, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("def ") || trimmed.starts_with("fn ") || trimmed.starts_with("class ")
        {
            continue;
        }
        // Track the byte offset where the current identifier run began; a
        // `(` right after a run marks a call site.
        let mut ident_start: Option<usize> = None;
        for (i, c) in line.char_indices() {
            if c.is_alphanumeric() || c == '_' {
                ident_start.get_or_insert(i);
                continue;
            }
            if c == '(' {
                if let Some(start) = ident_start {
                    let name = &line[start..i];
                    let starts_ok = name
                        .chars()
                        .next()
                        .map(|c| c.is_alphabetic() || c == '_')
                        .unwrap_or(false);
                    if starts_ok && !CALL_KEYWORDS.contains(&name) {
                        calls.push((name.to_string(), offset + 1));
                    }
                }
            }
            ident_start = None;
        }
    }
    calls
}

/// `self.field` accesses: (field, "read"|"write", 1-based line offset).
pub(crate) fn extract_field_uses(content: &str) -> Vec<(String, String, usize)> {
    let mut uses = Vec::new();
    for (offset, line) in content.lines().enumerate() {
        let mut rest = line;
        while let Some(pos) = rest.find("self.") {
            let after = &rest[pos + 5..];
            let field: String = after
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            if !field.is_empty() {
                let tail = after[field.len()..].trim_start();
                // A call, not a field access
                if !tail.starts_with('(') {
                    let access = if tail.starts_with('=') && !tail.starts_with("==") {
                        "write"
                    } else {
                        "read"
                    };
                    uses.push((field.clone(), access.to_string(), offset + 1));
                }
            }
            rest = &rest[pos + 5..];
        }
    }
    uses
}
