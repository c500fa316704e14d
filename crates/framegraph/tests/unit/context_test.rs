//! Session graph behavior: scope stack, qualification, symbol resolution,
//! and traversal, through the public context API.

use framegraph::{
    CodebaseContext, EdgeKind, Frame, FrameId, FrameKind, FrameRegistry, Provenance,
};

fn insert(ctx: &mut CodebaseContext, kind: FrameKind, name: &str, qualified: &str) -> FrameId {
    let mut frame = Frame::new(kind, name, qualified);
    frame.content = format!("{name} body");
    frame.set_confidence(1.0, Provenance::Parsed, 1);
    frame.id = frame.compute_id();
    ctx.insert_frame(frame)
}

#[test]
fn qualification_follows_the_open_scopes() {
    let mut ctx = CodebaseContext::new();
    let package = insert(&mut ctx, FrameKind::Package, "core", "app.core");
    let class = insert(&mut ctx, FrameKind::Class, "Widget", "app.core.Widget");

    ctx.push_context(package);
    ctx.push_context(class);
    // Packages contribute their dotted qualified name, classes their simple
    // name, so the join never doubles a prefix.
    assert_eq!(ctx.qualify("render"), "app.core.Widget.render");
    ctx.pop_context();
    assert_eq!(ctx.qualify("helper"), "app.core.helper");
}

#[test]
fn nested_scopes_resolve_with_distance_decay() {
    let mut ctx = CodebaseContext::new();
    let class = insert(&mut ctx, FrameKind::Class, "Widget", "app.Widget");
    let method = insert(&mut ctx, FrameKind::Callable, "render", "app.Widget.render");
    let field = insert(&mut ctx, FrameKind::Callable, "size", "app.Widget.size");
    ctx.link_child(class, field);

    ctx.push_context(class);
    ctx.push_context(method);
    // `size` lives one scope out: found on the class level with one decay step.
    let (found, confidence) = ctx.resolve_symbol_with_confidence("size").unwrap();
    assert_eq!(found, field);
    assert!((confidence - 0.95).abs() < 1e-9);

    // In the innermost scope the method resolves itself, undecayed.
    let (found, confidence) = ctx.resolve_symbol_with_confidence("render").unwrap();
    assert_eq!(found, method);
    assert!((confidence - 1.0).abs() < 1e-9);

    assert!(ctx.resolve_symbol_with_confidence("missing").is_none());
}

#[test]
fn pushing_a_package_emits_no_contains_for_the_package_itself() {
    let mut ctx = CodebaseContext::new();
    let root = insert(&mut ctx, FrameKind::Codebase, "root", "root");
    let package = insert(&mut ctx, FrameKind::Package, "app", "app");
    let class = insert(&mut ctx, FrameKind::Class, "Widget", "app.Widget");

    ctx.push_context(root);
    // Package hierarchy comes from path segments, not the stack.
    ctx.push_context(package);
    assert_eq!(ctx.get_all_edges().len(), 0);

    ctx.push_context(class);
    let edges = ctx.get_all_edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].kind, EdgeKind::Contains);
    assert_eq!(edges[0].subject, package);
    assert_eq!(edges[0].object, class);
}

#[test]
fn add_child_links_into_the_current_scope() {
    let mut ctx = CodebaseContext::new();
    let class = insert(&mut ctx, FrameKind::Class, "Widget", "app.Widget");
    ctx.push_context(class);

    let method = insert(&mut ctx, FrameKind::Callable, "render", "app.Widget.render");
    ctx.add_child_to_current(method);
    let edges = ctx.get_all_edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].subject, class);
    assert_eq!(edges[0].object, method);
    assert_eq!(ctx.frame(method).unwrap().parents, vec![class]);
}

#[test]
fn edge_confidence_takes_the_weaker_endpoint() {
    let mut ctx = CodebaseContext::new();
    let strong = insert(&mut ctx, FrameKind::Callable, "caller", "app.caller");
    let weak_handle = {
        let mut frame = Frame::new(FrameKind::Callable, "callee", "ext.callee");
        frame.set_confidence(0.3, Provenance::External, 3);
        frame.id = frame.compute_id();
        ctx.insert_frame(frame)
    };

    let edge = ctx.make_edge(EdgeKind::Calls, strong, weak_handle);
    // min(1.0, 0.3) × 0.85 CALLS multiplier
    assert!((edge.confidence - 0.3 * 0.85).abs() < 1e-9);
}

#[test]
fn traversal_counts_multi_parent_frames_once() {
    let mut ctx = CodebaseContext::new();
    let root = insert(&mut ctx, FrameKind::Codebase, "root", "root");
    ctx.codebase_root = Some(root);
    let a = insert(&mut ctx, FrameKind::Package, "a", "root.a");
    let b = insert(&mut ctx, FrameKind::Package, "b", "root.b");
    let shared = insert(&mut ctx, FrameKind::Callable, "util", "root.a.util");

    ctx.link_child(root, a);
    ctx.link_child(root, b);
    ctx.link_child(a, shared);
    ctx.link_child(b, shared);

    let all = ctx.get_all_frames();
    assert_eq!(all.len(), 4);
    assert_eq!(all.iter().filter(|&&h| h == shared).count(), 1);
}

#[test]
fn repeated_linking_is_idempotent() {
    let mut ctx = CodebaseContext::new();
    let parent = insert(&mut ctx, FrameKind::Class, "Widget", "app.Widget");
    let child = insert(&mut ctx, FrameKind::Callable, "render", "app.Widget.render");

    ctx.link_child(parent, child);
    ctx.link_child(parent, child);
    assert_eq!(ctx.frame(parent).unwrap().children.len(), 1);
    assert_eq!(ctx.frame(child).unwrap().parents.len(), 1);
}

#[test]
fn index_lookups_cover_id_kind_and_name() {
    let mut ctx = CodebaseContext::new();
    let handle = insert(&mut ctx, FrameKind::Callable, "run", "app.run");
    let stable_id = ctx.frame(handle).unwrap().id.clone();

    ctx.with_index(|index| {
        assert_eq!(index.find_by_id(&stable_id), Some(handle));
        assert_eq!(index.find_by_qualified_name("app.run"), &[handle]);
        assert_eq!(index.find_by_kind(FrameKind::Callable), &[handle]);
        assert_eq!(index.find_by_name("run"), &[handle]);
        assert!(index.find_by_kind(FrameKind::Class).is_empty());
    });
}

#[test]
fn integrity_check_flags_duplicate_qualified_names() {
    let mut ctx = CodebaseContext::new();
    insert(&mut ctx, FrameKind::Callable, "run", "app.run");
    insert(&mut ctx, FrameKind::Callable, "run", "app.run");
    let issues = FrameRegistry::validate_integrity(ctx.arena());
    assert!(issues.iter().any(|i| i.contains("app.run")));
}

#[test]
fn reset_clears_everything() {
    let mut ctx = CodebaseContext::new();
    let handle = insert(&mut ctx, FrameKind::Package, "app", "app");
    ctx.push_context(handle);
    ctx.reset();
    assert_eq!(ctx.frame_count(), 0);
    assert!(ctx.package_registry.is_empty());
    assert_eq!(ctx.qualify("x"), "x");
}
