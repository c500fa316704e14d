//! Indexer configuration.

use framegraph_parser_api::SourceFilter;
use serde::{Deserialize, Serialize};

/// Tunables for one indexing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexerConfig {
    /// File discovery filter
    pub source_filter: SourceFilter,
    /// Recursion guard for pathological nesting during hierarchy build
    pub max_node_depth: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            source_filter: SourceFilter::default(),
            max_node_depth: 1000,
        }
    }
}

impl IndexerConfig {
    /// Replace the discovery filter.
    pub fn with_source_filter(mut self, filter: SourceFilter) -> Self {
        self.source_filter = filter;
        self
    }

    /// Cap the raw-node nesting depth.
    pub fn with_max_node_depth(mut self, depth: usize) -> Self {
        self.max_node_depth = depth;
        self
    }
}
