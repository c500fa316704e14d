//! Frame creation with dedup, reuse, and content-change refresh.

use crate::confidence::frame_confidence;
use crate::graph::CodebaseContext;
use crate::model::{Frame, FrameId, FrameKind, FramePayload, Provenance, Span};
use framegraph_parser_api::RawNode;
use log::trace;
use std::path::PathBuf;

/// File path recorded on placeholder frames for unresolved symbols.
pub const EXTERNAL_FILE_PATH: &str = "<external_or_unresolved>";

/// Creates frames into a [`CodebaseContext`], enforcing the dedup contract:
/// a colliding qualified name (or control-flow location) with a matching kind
/// returns the existing frame, refreshed if its content changed; everything
/// else constructs, fingerprints, and registers a new frame.
pub struct FrameFactory;

impl FrameFactory {
    /// Create or reuse the frame for one raw node.
    ///
    /// Returns the frame handle and whether it was newly created. A reused
    /// frame gains the current scope as an additional parent; the caller must
    /// not re-descend into it.
    pub fn create_frame(
        ctx: &mut CodebaseContext,
        kind: FrameKind,
        name: &str,
        raw: &RawNode,
        language: &str,
    ) -> (FrameId, bool) {
        if kind.is_control_flow() {
            Self::create_control_flow_frame(ctx, kind, name, raw, language)
        } else {
            Self::create_semantic_frame(ctx, kind, name, raw, language)
        }
    }

    fn create_control_flow_frame(
        ctx: &mut CodebaseContext,
        kind: FrameKind,
        name: &str,
        raw: &RawNode,
        language: &str,
    ) -> (FrameId, bool) {
        let key = format!(
            "{}:{}:{}",
            raw.file_path.display(),
            raw.start_byte,
            raw.end_byte
        );
        if let Some(&existing) = ctx.control_flow_registry.get(&key) {
            if ctx.frame(existing).map(|f| f.kind) == Some(kind) {
                trace!("reusing control-flow frame at {key}");
                ctx.add_child_to_current(existing);
                return (existing, false);
            }
        }

        let mut frame = Frame::new(kind, name, ctx.qualify(name));
        // Control-flow content is volatile; keep only the opening line.
        frame.content = raw.content.lines().next().unwrap_or("").to_string();
        frame.span = Span::new(raw.start_line, raw.end_line, raw.start_byte, raw.end_byte);
        frame.file_path = Some(raw.file_path.clone());
        frame.language = language.to_string();
        frame.set_confidence(frame_confidence(1, Provenance::Parsed), Provenance::Parsed, 1);
        frame.id = frame.compute_id();

        let handle = ctx.insert_frame(frame);
        ctx.control_flow_registry.insert(key, handle);
        (handle, true)
    }

    fn create_semantic_frame(
        ctx: &mut CodebaseContext,
        kind: FrameKind,
        name: &str,
        raw: &RawNode,
        language: &str,
    ) -> (FrameId, bool) {
        let qualified_name = ctx.qualify(name);
        let existing = Self::registry_for(ctx, kind)
            .and_then(|registry| registry.get(&qualified_name).copied());

        if let Some(handle) = existing {
            if ctx.frame(handle).map(|f| f.kind) == Some(kind) {
                Self::refresh_if_changed(ctx, handle, raw);
                ctx.add_child_to_current(handle);
                return (handle, false);
            }
        }

        let mut frame = Frame::new(kind, name, qualified_name.clone());
        frame.content = raw.content.clone();
        frame.span = Span::new(raw.start_line, raw.end_line, raw.start_byte, raw.end_byte);
        frame.file_path = Some(raw.file_path.clone());
        frame.language = language.to_string();
        frame.payload = Self::extract_payload(kind, &raw.content);
        frame.set_confidence(frame_confidence(1, Provenance::Parsed), Provenance::Parsed, 1);
        frame.id = frame.compute_id();

        let handle = ctx.insert_frame(frame);
        if let Some(registry) = Self::registry_for_mut(ctx, kind) {
            registry.insert(qualified_name, handle);
        }
        (handle, true)
    }

    /// Refresh a reused frame whose underlying source changed: new content,
    /// span, payload, and a freshly computed id. The arena handle — the
    /// frame's in-session identity — is untouched.
    fn refresh_if_changed(ctx: &mut CodebaseContext, handle: FrameId, raw: &RawNode) {
        let changed = ctx
            .frame(handle)
            .map(|f| f.content != raw.content)
            .unwrap_or(false);
        if !changed {
            return;
        }
        if let Some(frame) = ctx.frame_mut(handle) {
            frame.content = raw.content.clone();
            frame.span = Span::new(raw.start_line, raw.end_line, raw.start_byte, raw.end_byte);
            frame.payload = Self::extract_payload(frame.kind, &raw.content);
            frame.id = frame.compute_id();
            trace!("refreshed frame {} -> id {}", frame.qualified_name, frame.id);
        }
    }

    /// Create (or reuse) a low-confidence placeholder for a symbol that lives
    /// outside the indexed tree.
    pub fn create_external_frame(
        ctx: &mut CodebaseContext,
        kind: FrameKind,
        name: &str,
        qualified_name: &str,
        confidence: f64,
    ) -> FrameId {
        if let Some(registry) = Self::registry_for(ctx, kind) {
            if let Some(&existing) = registry.get(qualified_name) {
                return existing;
            }
        }

        let mut frame = Frame::new(kind, name, qualified_name);
        frame.file_path = Some(PathBuf::from(EXTERNAL_FILE_PATH));
        frame.set_confidence(confidence, Provenance::External, 3);
        frame.id = frame.compute_id();

        let handle = ctx.insert_frame(frame);
        if let Some(registry) = Self::registry_for_mut(ctx, kind) {
            registry.insert(qualified_name.to_string(), handle);
        }
        ctx.external_frames.push(handle);
        handle
    }

    fn registry_for(
        ctx: &CodebaseContext,
        kind: FrameKind,
    ) -> Option<&std::collections::HashMap<String, FrameId>> {
        match kind {
            FrameKind::Package => Some(&ctx.package_registry),
            FrameKind::Class => Some(&ctx.class_registry),
            FrameKind::Callable => Some(&ctx.callable_registry),
            _ => None,
        }
    }

    fn registry_for_mut(
        ctx: &mut CodebaseContext,
        kind: FrameKind,
    ) -> Option<&mut std::collections::HashMap<String, FrameId>> {
        match kind {
            FrameKind::Package => Some(&mut ctx.package_registry),
            FrameKind::Class => Some(&mut ctx.class_registry),
            FrameKind::Callable => Some(&mut ctx.callable_registry),
            _ => None,
        }
    }

    fn extract_payload(kind: FrameKind, content: &str) -> FramePayload {
        match kind {
            FrameKind::Callable => FramePayload::Callable {
                parameters: extract_parameters(content),
                return_type: extract_return_type(content),
            },
            FrameKind::Class => {
                let (instance_fields, static_fields) = extract_class_fields(content);
                FramePayload::Class {
                    instance_fields,
                    static_fields,
                }
            }
            _ => FramePayload::None,
        }
    }
}

/// Parameter names from the first parenthesized group of a signature.
fn extract_parameters(content: &str) -> Vec<String> {
    let first_line = content.lines().next().unwrap_or("");
    let open = match first_line.find('(') {
        Some(i) => i,
        None => return Vec::new(),
    };
    let close = match first_line[open..].find(')') {
        Some(i) => open + i,
        None => return Vec::new(),
    };
    first_line[open + 1..close]
        .split(',')
        .map(|p| {
            p.split(':')
                .next()
                .unwrap_or("")
                .trim()
                .trim_start_matches('*')
                .trim_start_matches('&')
                .to_string()
        })
        .filter(|p| !p.is_empty() && p != "self")
        .collect()
}

/// Return type from a `-> T` annotation on the signature line.
fn extract_return_type(content: &str) -> Option<String> {
    let first_line = content.lines().next().unwrap_or("");
    let arrow = first_line.find("->")?;
    let tail = first_line[arrow + 2..]
        .trim()
        .trim_end_matches(':')
        .trim_end_matches('{')
        .trim();
    if tail.is_empty() {
        None
    } else {
        Some(tail.to_string())
    }
}

/// Instance fields (`self.x = ...`) and class-level assignments.
fn extract_class_fields(content: &str) -> (Vec<String>, Vec<String>) {
    let mut instance = Vec::new();
    let mut statics = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("self.") {
            if let Some(eq) = rest.find('=') {
                let field = rest[..eq].trim().trim_end_matches(|c: char| c == '+' || c == '-');
                let field = field.trim();
                if is_identifier(field) && !instance.contains(&field.to_string()) {
                    instance.push(field.to_string());
                }
            }
        } else if !trimmed.starts_with("def ")
            && !trimmed.starts_with("class ")
            && line.starts_with("    ")
            && !line.starts_with("        ")
        {
            if let Some(eq) = trimmed.find('=') {
                let field = trimmed[..eq].trim();
                if is_identifier(field) && !statics.contains(&field.to_string()) {
                    statics.push(field.to_string());
                }
            }
        }
    }
    (instance, statics)
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars().next().map(|c| c.is_alphabetic() || c == '_').unwrap_or(false)
        && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Derive a control-flow frame name from its raw node: these frames have no
/// stable name, so the name encodes position for human readers.
pub fn control_flow_name(kind: FrameKind, raw: &RawNode) -> String {
    format!(
        "{}_line_{}_byte_{}",
        kind.to_string().to_lowercase(),
        raw.start_line,
        raw.start_byte
    )
}

/// Map a front-end raw-node kind onto an engine frame kind.
///
/// Unmapped kinds are drilled through by the builder rather than becoming
/// frames of their own.
pub fn map_raw_kind(kind: &str) -> Option<FrameKind> {
    let mapped = match kind {
        "class_definition" | "class_declaration" | "class_specifier" => FrameKind::Class,
        "function_definition" | "function_declaration" | "method_definition"
        | "method_declaration" => FrameKind::Callable,
        "if_statement" => FrameKind::IfBlock,
        "elif_clause" => FrameKind::ElifBlock,
        "else_clause" => FrameKind::ElseBlock,
        "for_statement" => FrameKind::ForLoop,
        "while_statement" => FrameKind::WhileLoop,
        "try_statement" => FrameKind::TryBlock,
        "except_clause" | "catch_clause" => FrameKind::ExceptBlock,
        "finally_clause" => FrameKind::FinallyBlock,
        "switch_statement" | "match_statement" => FrameKind::SwitchBlock,
        "case_clause" | "match_arm" => FrameKind::CaseBlock,
        "with_statement" => FrameKind::WithBlock,
        _ => return None,
    };
    Some(mapped)
}
