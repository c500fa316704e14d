//! Cross-reference resolution: one algorithm, two lookup backings.
//!
//! Fresh parses resolve against the in-memory registries; incremental repair
//! resolves against the store. Both go through [`ResolutionStrategy`], so the
//! exact → context-qualified → partial ladder is written exactly once.

use crate::graph::CodebaseContext;
use crate::model::FrameId;

/// Outcome of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolutionResult {
    /// Arena handle when resolved in-memory; `None` for store-backed lookups
    pub frame: Option<FrameId>,
    /// Stable id of the resolved frame
    pub stable_id: String,
    pub qualified_name: String,
    /// Confidence of the resolved frame itself
    pub confidence: f64,
}

/// Abstract lookup capability the resolution ladder runs over.
pub trait ResolutionStrategy {
    fn resolve_callable_exact(&self, qualified_name: &str) -> Option<ResolutionResult>;
    fn resolve_callable_partial(&self, name: &str) -> Option<ResolutionResult>;
    fn resolve_class_exact(&self, qualified_name: &str) -> Option<ResolutionResult>;
    fn resolve_class_partial(&self, name: &str) -> Option<ResolutionResult>;
    /// Qualified name of the package enclosing `qualified_name`, if any.
    fn enclosing_package(&self, qualified_name: &str) -> Option<String>;
}

/// Resolve a callable reference: exact match first, then qualified by the
/// caller's enclosing package, then partial suffix match.
///
/// `caller_qualified_name` scopes the context-qualified attempt; `None` skips
/// it.
pub fn resolve_callable(
    strategy: &dyn ResolutionStrategy,
    name: &str,
    caller_qualified_name: Option<&str>,
) -> Option<ResolutionResult> {
    if let Some(result) = strategy.resolve_callable_exact(name) {
        return Some(result);
    }

    if let Some(caller) = caller_qualified_name {
        if let Some(package) = strategy.enclosing_package(caller) {
            let contextual = format!("{package}.{name}");
            if let Some(result) = strategy.resolve_callable_exact(&contextual) {
                return Some(result);
            }
        }
    }

    strategy.resolve_callable_partial(name)
}

/// Resolve a class reference: exact, then partial suffix match.
pub fn resolve_class(strategy: &dyn ResolutionStrategy, name: &str) -> Option<ResolutionResult> {
    strategy
        .resolve_class_exact(name)
        .or_else(|| strategy.resolve_class_partial(name))
}

/// Whether `qualified_name` matches `name` as a suffix reference.
pub(crate) fn suffix_matches(qualified_name: &str, name: &str) -> bool {
    qualified_name == name || qualified_name.ends_with(&format!(".{name}"))
}

/// Pick the best partial match: the candidate with the shortest qualified
/// name wins ties, on the theory that the least-nested symbol is the least
/// speculative guess.
pub(crate) fn best_partial<'a, I>(candidates: I) -> Option<&'a str>
where
    I: Iterator<Item = &'a str>,
{
    candidates.min_by_key(|qn| (qn.len(), *qn))
}

/// Registry-backed lookups for fresh parses.
pub struct MemoryResolution<'a> {
    ctx: &'a CodebaseContext,
}

impl<'a> MemoryResolution<'a> {
    pub fn new(ctx: &'a CodebaseContext) -> Self {
        Self { ctx }
    }

    fn result_for(&self, handle: FrameId) -> Option<ResolutionResult> {
        let frame = self.ctx.frame(handle)?;
        Some(ResolutionResult {
            frame: Some(handle),
            stable_id: frame.id.clone(),
            qualified_name: frame.qualified_name.clone(),
            confidence: frame.confidence,
        })
    }

    fn partial_in(
        &self,
        registry: &std::collections::HashMap<String, FrameId>,
        name: &str,
    ) -> Option<ResolutionResult> {
        let best = best_partial(
            registry
                .keys()
                .filter(|qn| suffix_matches(qn, name))
                .map(String::as_str),
        )?;
        let handle = registry.get(best).copied()?;
        self.result_for(handle)
    }
}

impl ResolutionStrategy for MemoryResolution<'_> {
    fn resolve_callable_exact(&self, qualified_name: &str) -> Option<ResolutionResult> {
        let handle = self.ctx.callable_registry.get(qualified_name).copied()?;
        self.result_for(handle)
    }

    fn resolve_callable_partial(&self, name: &str) -> Option<ResolutionResult> {
        self.partial_in(&self.ctx.callable_registry, name)
    }

    fn resolve_class_exact(&self, qualified_name: &str) -> Option<ResolutionResult> {
        let handle = self.ctx.class_registry.get(qualified_name).copied()?;
        self.result_for(handle)
    }

    fn resolve_class_partial(&self, name: &str) -> Option<ResolutionResult> {
        self.partial_in(&self.ctx.class_registry, name)
    }

    fn enclosing_package(&self, qualified_name: &str) -> Option<String> {
        let mut candidate = qualified_name;
        while let Some(dot) = candidate.rfind('.') {
            candidate = &candidate[..dot];
            if self.ctx.package_registry.contains_key(candidate) {
                return Some(candidate.to_string());
            }
        }
        None
    }
}
