//! Relationship repair after an incremental frame swap.
//!
//! Deleting a frame cascades to its edges, so every added frame comes back
//! with no relationships. This pass recomputes them against the store:
//! CONTAINS is lifted from the fresh parse, CALLS/IMPORTS/USES are
//! re-extracted for added frames, and INHERITS is rebuilt for every class
//! the update touched, since a parent class can change without the child's
//! content hash moving.

use crate::error::Result;
use crate::graph::CodebaseContext;
use crate::incremental::diff::FrameDiff;
use crate::incremental::edge_inserter::EdgeInserter;
use crate::model::{Edge, EdgeKind, Frame, FrameKind, Provenance};
use crate::parsing::factory::EXTERNAL_FILE_PATH;
use crate::parsing::{extract_base_classes, extract_call_names, extract_field_uses, extract_imports};
use crate::resolve::{
    best_partial, resolve_callable, suffix_matches, ResolutionResult, ResolutionStrategy,
};
use crate::store::{EdgeRecord, FrameRecord, FrameStore};
use crate::{confidence, model::FrameId};
use log::debug;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

/// Store-backed lookups for repair-time resolution.
pub struct StoreResolution<'a> {
    store: &'a FrameStore,
}

impl<'a> StoreResolution<'a> {
    pub fn new(store: &'a FrameStore) -> Self {
        Self { store }
    }

    fn result_for(record: &FrameRecord) -> ResolutionResult {
        ResolutionResult {
            frame: None,
            stable_id: record.id.clone(),
            qualified_name: record.qualified_name.clone(),
            confidence: record.confidence,
        }
    }

    fn exact(&self, kind: FrameKind, qualified_name: &str) -> Option<ResolutionResult> {
        self.store
            .find_by_qualified_name(kind, qualified_name)
            .map(Self::result_for)
    }

    fn partial(&self, kind: FrameKind, name: &str) -> Option<ResolutionResult> {
        let rows = self.store.frames_of_kind(kind);
        let best = best_partial(
            rows.iter()
                .filter(|r| suffix_matches(&r.qualified_name, name))
                .map(|r| r.qualified_name.as_str()),
        )?;
        let best = best.to_string();
        rows.into_iter()
            .find(|r| r.qualified_name == best)
            .map(Self::result_for)
    }
}

impl ResolutionStrategy for StoreResolution<'_> {
    fn resolve_callable_exact(&self, qualified_name: &str) -> Option<ResolutionResult> {
        self.exact(FrameKind::Callable, qualified_name)
    }

    fn resolve_callable_partial(&self, name: &str) -> Option<ResolutionResult> {
        self.partial(FrameKind::Callable, name)
    }

    fn resolve_class_exact(&self, qualified_name: &str) -> Option<ResolutionResult> {
        self.exact(FrameKind::Class, qualified_name)
    }

    fn resolve_class_partial(&self, name: &str) -> Option<ResolutionResult> {
        self.partial(FrameKind::Class, name)
    }

    fn enclosing_package(&self, qualified_name: &str) -> Option<String> {
        let mut prefix = qualified_name;
        while let Some(pos) = prefix.rfind('.') {
            prefix = &prefix[..pos];
            if self
                .store
                .find_by_qualified_name(FrameKind::Package, prefix)
                .is_some()
            {
                return Some(prefix.to_string());
            }
        }
        None
    }
}

/// Counters from a repair pass.
#[derive(Debug, Clone, Default)]
pub struct RepairResult {
    pub contains_created: usize,
    pub calls_created: usize,
    pub imports_created: usize,
    pub inherits_created: usize,
    pub inherits_deleted: usize,
    pub uses_created: usize,
    /// External placeholder class rows created for unresolved parents
    pub external_created: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

struct InheritPlan {
    subject_id: String,
    subject_confidence: f64,
    base: String,
    kind: EdgeKind,
    resolved: Option<ResolutionResult>,
}

/// Rebuilds relationships for the frames an update added or touched.
pub struct RelationshipRepairer;

impl RelationshipRepairer {
    /// Run every repair sub-pass. Expected to run inside the caller's open
    /// transaction so a failure rolls the frame swap back with it.
    pub fn repair(
        store: &mut FrameStore,
        ctx: &CodebaseContext,
        diff: &FrameDiff,
    ) -> Result<RepairResult> {
        let mut result = RepairResult::default();
        let added: HashSet<&str> = diff.added.iter().map(String::as_str).collect();

        let contains = Self::plan_contains(store, ctx, &added);
        let calls = Self::plan_calls(store, &added, &mut result);
        let imports = Self::plan_imports(store, &added, &mut result);
        let uses = Self::plan_uses(store, &added);
        let (stale_inherits, inherit_plans) = Self::plan_inherits(store, diff);

        for edge_id in stale_inherits {
            store.delete_edge(edge_id)?;
            result.inherits_deleted += 1;
        }

        result.contains_created = Self::insert(store, contains, &mut result.errors);
        result.calls_created = Self::insert(store, calls, &mut result.errors);
        result.imports_created = Self::insert(store, imports, &mut result.errors);
        result.uses_created = Self::insert(store, uses, &mut result.errors);

        let inherits = Self::materialize_inherits(store, inherit_plans, &mut result)?;
        result.inherits_created = Self::insert(store, inherits, &mut result.errors);

        Ok(result)
    }

    fn insert(store: &mut FrameStore, records: Vec<EdgeRecord>, errors: &mut Vec<String>) -> usize {
        let outcome = EdgeInserter::insert_edges(store, records);
        errors.extend(outcome.errors);
        outcome.inserted
    }

    /// CONTAINS edges from the fresh parse that touch an added frame.
    fn plan_contains(
        store: &FrameStore,
        ctx: &CodebaseContext,
        added: &HashSet<&str>,
    ) -> Vec<EdgeRecord> {
        let stable_id = |handle: FrameId| ctx.frame(handle).map(|f| f.id.clone());
        let mut records = Vec::new();
        for edge in ctx.get_all_edges() {
            if edge.kind != EdgeKind::Contains {
                continue;
            }
            let (subject, object) = match (stable_id(edge.subject), stable_id(edge.object)) {
                (Some(s), Some(o)) => (s, o),
                _ => continue,
            };
            if !added.contains(subject.as_str()) && !added.contains(object.as_str()) {
                continue;
            }
            if !store.contains_frame(&subject) || !store.contains_frame(&object) {
                continue;
            }
            // Shared scaffolding frames survive across files, so their
            // containment rows may already be present.
            let duplicate = store
                .edges_for_frame(&subject)
                .iter()
                .any(|e| e.kind == EdgeKind::Contains && e.object_id == object);
            if duplicate {
                continue;
            }
            records.push(EdgeRecord::from_session(&edge, subject, object));
        }
        records
    }

    /// CALLS edges re-extracted from each added callable's content.
    fn plan_calls(
        store: &FrameStore,
        added: &HashSet<&str>,
        result: &mut RepairResult,
    ) -> Vec<EdgeRecord> {
        let resolution = StoreResolution::new(store);
        let mut records = Vec::new();
        for id in added {
            let row = match store.get_frame(id) {
                Some(r) if r.kind == FrameKind::Callable => r,
                _ => continue,
            };
            for (callee, line) in extract_call_names(&row.content) {
                if callee == row.name {
                    continue;
                }
                let target = match resolve_callable(&resolution, &callee, Some(&row.qualified_name))
                {
                    Some(t) => t,
                    None => {
                        debug!("repair left call {callee} from {} unresolved", row.qualified_name);
                        result
                            .warnings
                            .push(format!("unresolved call: {} -> {callee}", row.qualified_name));
                        continue;
                    }
                };
                if target.stable_id == row.id {
                    continue;
                }
                records.push(edge_record(
                    EdgeKind::Calls,
                    row,
                    &target,
                    meta(&[("line", json!(line))]),
                ));
            }
        }
        records
    }

    /// IMPORTS edges re-extracted from each added package's content.
    fn plan_imports(
        store: &FrameStore,
        added: &HashSet<&str>,
        result: &mut RepairResult,
    ) -> Vec<EdgeRecord> {
        let resolution = StoreResolution::new(store);
        let mut records = Vec::new();
        for id in added {
            let row = match store.get_frame(id) {
                Some(r) if r.kind == FrameKind::Package => r,
                _ => continue,
            };
            for import_path in extract_imports(&row.content) {
                let trimmed = import_path.trim_start_matches('.');
                if trimmed.is_empty() {
                    continue;
                }
                let target = resolution
                    .exact(FrameKind::Package, trimmed)
                    .or_else(|| resolution.partial(FrameKind::Package, trimmed));
                let target = match target {
                    Some(t) => t,
                    None => {
                        result
                            .warnings
                            .push(format!("unresolved import: {} -> {import_path}", row.qualified_name));
                        continue;
                    }
                };
                if target.stable_id == row.id {
                    continue;
                }
                records.push(edge_record(
                    EdgeKind::Imports,
                    row,
                    &target,
                    meta(&[("import_path", json!(import_path))]),
                ));
            }
        }
        records
    }

    /// USES edges from each added callable's field accesses to its
    /// enclosing class.
    fn plan_uses(store: &FrameStore, added: &HashSet<&str>) -> Vec<EdgeRecord> {
        let mut records = Vec::new();
        for id in added {
            let row = match store.get_frame(id) {
                Some(r) if r.kind == FrameKind::Callable => r,
                _ => continue,
            };
            let class_qn = match row.qualified_name.rfind('.') {
                Some(pos) => &row.qualified_name[..pos],
                None => continue,
            };
            let class = match store.find_by_qualified_name(FrameKind::Class, class_qn) {
                Some(c) => c,
                None => continue,
            };
            let target = StoreResolution::result_for(class);
            for (field, access, line) in extract_field_uses(&row.content) {
                records.push(edge_record(
                    EdgeKind::Uses,
                    row,
                    &target,
                    meta(&[
                        ("field_name", json!(field)),
                        ("access_type", json!(access)),
                        ("line", json!(line)),
                    ]),
                ));
            }
        }
        records
    }

    /// Inheritance is rebuilt for every class the update touched: stale
    /// INHERITS/IMPLEMENTS rows where the class is the subject are listed
    /// for deletion, and each declared base becomes a plan.
    fn plan_inherits(store: &FrameStore, diff: &FrameDiff) -> (Vec<u64>, Vec<InheritPlan>) {
        let resolution = StoreResolution::new(store);
        let mut stale = Vec::new();
        let mut plans = Vec::new();
        for id in diff.stable.iter().chain(diff.added.iter()) {
            let row = match store.get_frame(id) {
                Some(r) if r.kind == FrameKind::Class => r,
                _ => continue,
            };
            for edge in store.edges_for_frame(id) {
                let hierarchy =
                    matches!(edge.kind, EdgeKind::Inherits | EdgeKind::Implements);
                if hierarchy && edge.subject_id == *id {
                    stale.push(edge.id);
                }
            }
            for (base, kind) in extract_base_classes(&row.content) {
                let resolved = crate::resolve::resolve_class(&resolution, &base);
                if matches!(&resolved, Some(t) if t.stable_id == *id) {
                    continue;
                }
                plans.push(InheritPlan {
                    subject_id: row.id.clone(),
                    subject_confidence: row.confidence,
                    base,
                    kind,
                    resolved,
                });
            }
        }
        (stale, plans)
    }

    /// Turn inheritance plans into edge rows, creating external placeholder
    /// classes for parents the store has never seen. Placeholders are
    /// deduped by qualified name so two subclasses of the same unknown base
    /// share one row.
    fn materialize_inherits(
        store: &mut FrameStore,
        plans: Vec<InheritPlan>,
        result: &mut RepairResult,
    ) -> Result<Vec<EdgeRecord>> {
        let mut records = Vec::new();
        for plan in plans {
            let (object_id, object_confidence) = match plan.resolved {
                Some(target) => (target.stable_id, target.confidence),
                None => Self::external_class(store, &plan.base, result)?,
            };
            let confidence = confidence::edge_confidence(
                plan.kind,
                plan.subject_confidence,
                object_confidence,
            );
            let session = Edge::new(0, 0, 0, plan.kind, confidence);
            records.push(EdgeRecord::from_session(
                &session,
                plan.subject_id,
                object_id,
            ));
        }
        Ok(records)
    }

    fn external_class(
        store: &mut FrameStore,
        base: &str,
        result: &mut RepairResult,
    ) -> Result<(String, f64)> {
        let existing = store.frames().find(|r| {
            r.kind == FrameKind::Class
                && r.qualified_name == base
                && r.provenance == Provenance::External
        });
        if let Some(row) = existing {
            return Ok((row.id.clone(), row.confidence));
        }

        let name = base.rsplit('.').next().unwrap_or(base);
        let mut frame = Frame::new(FrameKind::Class, name, base);
        frame.file_path = Some(EXTERNAL_FILE_PATH.into());
        frame.set_confidence(0.3, Provenance::External, 3);
        frame.id = frame.compute_id();
        let record = FrameRecord::from(&frame);
        let id = record.id.clone();
        let confidence = record.confidence;
        store.put_frame(record)?;
        result.external_created += 1;
        Ok((id, confidence))
    }
}

fn meta(entries: &[(&str, Value)]) -> Map<String, Value> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn edge_record(
    kind: EdgeKind,
    subject: &FrameRecord,
    object: &ResolutionResult,
    metadata: Map<String, Value>,
) -> EdgeRecord {
    let confidence = confidence::edge_confidence(kind, subject.confidence, object.confidence);
    let mut session = Edge::new(0, 0, 0, kind, confidence);
    session.metadata = metadata;
    EdgeRecord::from_session(&session, subject.id.clone(), object.stable_id.clone())
}
