//! Diff semantics over stable-id sets, plus id determinism across parses.

#[path = "../common/mod.rs"]
mod common;

use common::{write_file, PyLiteParser};
use framegraph::incremental::{collect_all_frames, StableDiffCalculator};
use framegraph::{IndexerConfig, MultiPassParser};
use std::collections::HashSet;
use tempfile::TempDir;

fn ids(values: &[&str]) -> HashSet<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[test]
fn diff_partitions_old_and_new() {
    let old = ids(&["A", "B", "C"]);
    let new = ids(&["B", "C", "D"]);
    let diff = StableDiffCalculator::compute_diff(&old, &new);

    assert_eq!(diff.deleted, vec!["A"]);
    assert_eq!(diff.added, vec!["D"]);
    assert_eq!(diff.stable, vec!["B", "C"]);
    assert!((diff.stability_pct - 66.666).abs() < 0.01);
}

#[test]
fn disjoint_sets_have_zero_stability() {
    let diff = StableDiffCalculator::compute_diff(&ids(&["A"]), &ids(&["B"]));
    assert_eq!(diff.stability_pct, 0.0);
    assert_eq!(diff.deleted, vec!["A"]);
    assert_eq!(diff.added, vec!["B"]);
}

#[test]
fn empty_new_set_reports_zero_not_nan() {
    let diff = StableDiffCalculator::compute_diff(&ids(&["A", "B"]), &ids(&[]));
    assert_eq!(diff.stability_pct, 0.0);
    assert_eq!(diff.deleted.len(), 2);
    assert!(diff.added.is_empty());
}

#[test]
fn identical_parse_produces_a_noop_diff() {
    let source = "import os\n\nclass Widget:\n    def render(self):\n        return self.size\n\ndef main():\n    pass\n";
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "widget.py", source);

    let parse_ids = |path: &std::path::Path| -> HashSet<String> {
        let mut parser =
            MultiPassParser::new(IndexerConfig::default()).with_parser(Box::new(PyLiteParser));
        parser.parse_single_file(path).unwrap();
        let ctx = parser.context();
        collect_all_frames(ctx)
            .into_iter()
            .filter_map(|h| ctx.frame(h).map(|f| f.id.clone()))
            .collect()
    };

    let first = parse_ids(&path);
    let second = parse_ids(&path);
    assert!(!first.is_empty());

    let diff = StableDiffCalculator::compute_diff(&first, &second);
    assert!(diff.is_noop());
    assert_eq!(diff.stability_pct, 100.0);
}

#[test]
fn editing_one_function_leaves_siblings_stable() {
    let v1 = "def alpha():\n    return 1\n\ndef beta():\n    return 2\n";
    let v2 = "def alpha():\n    return 1\n\ndef beta():\n    return 20\n";
    let dir = TempDir::new().unwrap();

    let parse_ids = |source: &str, name: &str| -> HashSet<String> {
        let path = write_file(dir.path(), name, source);
        let mut parser =
            MultiPassParser::new(IndexerConfig::default()).with_parser(Box::new(PyLiteParser));
        parser.parse_single_file(&path).unwrap();
        let ctx = parser.context();
        collect_all_frames(ctx)
            .into_iter()
            .filter_map(|h| ctx.frame(h).map(|f| f.id.clone()))
            .collect()
    };

    // Same file name in both parses so only content differs.
    let old = parse_ids(v1, "mod.py");
    let new = parse_ids(v2, "mod.py");
    let diff = StableDiffCalculator::compute_diff(&old, &new);

    // Exactly beta's frame changed; alpha, the module, and the scaffolding
    // above it all survived.
    assert!(diff.stable.len() >= 3);
    assert_eq!(diff.deleted.len(), 1);
    assert_eq!(diff.added.len(), 1);
}
