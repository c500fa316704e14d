//! Stable identifier behavior across strategies, through the public API.

use framegraph::{IdStrategy, NodeContext, StableIdGenerator};
use std::path::PathBuf;

fn callable(file: &str, start: usize, content: &str) -> NodeContext {
    NodeContext {
        file_path: PathBuf::from(file),
        node_type: "function_definition".to_string(),
        start_byte: start,
        end_byte: start + content.len(),
        start_line: 10,
        end_line: 12,
        content: content.to_string(),
        semantic_anchor: Some("app.run".to_string()),
        anchor_start_byte: Some(start),
        ..NodeContext::default()
    }
}

#[test]
fn every_strategy_is_deterministic() {
    let ctx = callable("src/app.py", 120, "def run():\n    return 1");
    for strategy in [
        IdStrategy::Positional,
        IdStrategy::ContentHash,
        IdStrategy::StructuralHash,
        IdStrategy::Hybrid,
        IdStrategy::Hierarchical,
    ] {
        let generator = StableIdGenerator::new(strategy);
        assert_eq!(generator.generate_id(&ctx), generator.generate_id(&ctx));
    }
}

#[test]
fn ids_carry_their_strategy_prefix() {
    let ctx = callable("src/app.py", 0, "def run(): pass");
    let cases = [
        (IdStrategy::Positional, "POS_"),
        (IdStrategy::ContentHash, "CNT_"),
        (IdStrategy::StructuralHash, "STR_"),
        (IdStrategy::Hybrid, "SEM_"),
        (IdStrategy::Hierarchical, "HIE_"),
    ];
    for (strategy, prefix) in cases {
        let id = StableIdGenerator::new(strategy).generate_id(&ctx);
        assert!(id.starts_with(prefix), "{strategy:?} produced {id}");
        assert_eq!(id.len(), prefix.len() + 16);
    }
}

#[test]
fn content_hash_survives_moves_within_and_across_files() {
    let generator = StableIdGenerator::new(IdStrategy::ContentHash);
    let here = callable("src/app.py", 120, "def run():\n    return 1");
    let moved = callable("src/app.py", 900, "def run():\n    return 1");
    let other_file = callable("src/other.py", 40, "def run():\n    return 1");

    assert_eq!(generator.generate_id(&here), generator.generate_id(&moved));
    assert_eq!(
        generator.generate_id(&here),
        generator.generate_id(&other_file)
    );
}

#[test]
fn content_hash_ignores_formatting_but_not_code() {
    let generator = StableIdGenerator::new(IdStrategy::ContentHash);
    let original = callable("src/app.py", 0, "def run():\n    return 1");
    let reformatted = callable("src/app.py", 0, "def run():\n\n    return  1\n# note\n");
    let changed = callable("src/app.py", 0, "def run():\n    return 2");

    assert_eq!(
        generator.generate_id(&original),
        generator.generate_id(&reformatted)
    );
    assert_ne!(
        generator.generate_id(&original),
        generator.generate_id(&changed)
    );
}

#[test]
fn positional_moves_with_the_code() {
    let generator = StableIdGenerator::new(IdStrategy::Positional);
    let here = callable("src/app.py", 120, "def run(): pass");
    let shifted = callable("src/app.py", 121, "def run(): pass");
    assert_ne!(generator.generate_id(&here), generator.generate_id(&shifted));
}

#[test]
fn hybrid_anchor_id_ignores_body_edits() {
    let generator = StableIdGenerator::new(IdStrategy::Hybrid);
    let before = callable("src/app.py", 120, "def run():\n    return 1");
    let after = callable("src/app.py", 120, "def run():\n    return 2 + 2");
    assert_eq!(generator.generate_id(&before), generator.generate_id(&after));
}

#[test]
fn hybrid_isolates_siblings_from_each_other() {
    let generator = StableIdGenerator::new(IdStrategy::Hybrid);
    // An if-block inside app.run, before and after an edit to a sibling
    // callable shifted the whole function 200 bytes down the file.
    let make = |anchor_start: usize| NodeContext {
        file_path: PathBuf::from("src/app.py"),
        node_type: "if_statement".to_string(),
        start_byte: anchor_start + 24,
        end_byte: anchor_start + 80,
        start_line: 11,
        end_line: 13,
        content: "if ready:\n    go()".to_string(),
        semantic_anchor: Some("app.run".to_string()),
        anchor_start_byte: Some(anchor_start),
        ..NodeContext::default()
    };
    let id_before = generator.generate_id(&make(120));
    let id_after = generator.generate_id(&make(320));
    assert_eq!(id_before, id_after);
    assert!(id_before.starts_with("HYB_"));
}

#[test]
fn hybrid_falls_back_to_structural_without_anchor() {
    let generator = StableIdGenerator::new(IdStrategy::Hybrid);
    let ctx = NodeContext {
        file_path: PathBuf::from("src/app.py"),
        node_type: "if_statement".to_string(),
        start_byte: 10,
        end_byte: 60,
        content: "if x:\n    pass".to_string(),
        children_types: vec!["condition".to_string(), "block".to_string()],
        ..NodeContext::default()
    };
    let id = generator.generate_id(&ctx);
    assert!(id.starts_with("STR_"));
    assert_eq!(
        id,
        StableIdGenerator::new(IdStrategy::StructuralHash).generate_id(&ctx)
    );
}

#[test]
fn structural_signature_caps_at_five_children() {
    let generator = StableIdGenerator::new(IdStrategy::StructuralHash);
    let base = |children: Vec<&str>| NodeContext {
        file_path: PathBuf::from("src/app.py"),
        node_type: "block".to_string(),
        start_byte: 0,
        end_byte: 100,
        children_types: children.into_iter().map(String::from).collect(),
        ..NodeContext::default()
    };
    let five = base(vec!["a", "b", "c", "d", "e"]);
    let six = base(vec!["a", "b", "c", "d", "e", "f"]);
    let different_fifth = base(vec!["a", "b", "c", "d", "x"]);

    assert_eq!(generator.generate_id(&five), generator.generate_id(&six));
    assert_ne!(
        generator.generate_id(&five),
        generator.generate_id(&different_fifth)
    );
}

#[test]
fn hierarchical_tracks_tree_position() {
    let generator = StableIdGenerator::new(IdStrategy::Hierarchical);
    let at = |path: Vec<usize>| NodeContext {
        file_path: PathBuf::from("src/app.py"),
        node_type: "function_definition".to_string(),
        tree_path: path,
        ..NodeContext::default()
    };
    assert_eq!(
        generator.generate_id(&at(vec![0, 2, 1])),
        generator.generate_id(&at(vec![0, 2, 1]))
    );
    assert_ne!(
        generator.generate_id(&at(vec![0, 2, 1])),
        generator.generate_id(&at(vec![0, 3, 1]))
    );
}

#[test]
fn default_generator_uses_the_hybrid_strategy() {
    let generator = StableIdGenerator::default();
    assert_eq!(generator.strategy(), IdStrategy::Hybrid);
}
