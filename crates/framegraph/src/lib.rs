//! # framegraph
//!
//! An incremental semantic code indexer. Source files become a graph of
//! *frames* (packages, classes, callables, control-flow blocks) joined by
//! typed, confidence-weighted edges, and every frame carries a stable
//! content-addressed id so re-indexing a file touches only what changed.
//!
//! ## Core Principles
//!
//! - **Parser Agnostic**: any [`LanguageParser`] producing raw node streams plugs in
//! - **Honest Uncertainty**: every frame and edge carries a confidence score and tier
//! - **Stable Identity**: ids are content fingerprints, so unchanged code keeps its id
//! - **Incremental First**: single-file updates swap only the changed frames, transactionally
//! - **Persistence Primary**: durable storage with RocksDB
//!
//! ## Architecture
//!
//! ```text
//! Language parsers (framegraph-parser-api)
//!     ↓ raw node streams
//! Three-pass pipeline (extract → build → resolve)
//!     ↓ frames + edges
//! Session graph (arena, registries, frame stack)
//!     ↓ stable-id diff
//! Incremental updater (delete / insert / repair)
//!     ↓ rows
//! Frame store (RocksDB, memory)
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use framegraph::{IncrementalUpdater, IndexerConfig, MultiPassParser};
//! use framegraph::store::FrameStore;
//! use std::path::Path;
//!
//! # fn parser_for_my_language() -> Box<dyn framegraph::LanguageParser> { unimplemented!() }
//! let parser = MultiPassParser::new(IndexerConfig::default())
//!     .with_parser(parser_for_my_language());
//!
//! let mut store = FrameStore::open(Path::new("./index.db")).unwrap();
//! let mut updater = IncrementalUpdater::new(parser);
//! let result = updater
//!     .update_file(&mut store, Path::new("src/app.py"))
//!     .unwrap();
//! println!("{}", result.summary());
//! ```

#![deny(unsafe_code)]

pub mod confidence;
pub mod config;
pub mod error;
pub mod graph;
pub mod incremental;
pub mod model;
pub mod parsing;
pub mod resolve;
pub mod stable_id;
pub mod store;

// Re-export main types
pub use config::IndexerConfig;
pub use error::{IndexError, Result};
pub use graph::{CodebaseContext, FrameRegistry, FrameStack};
pub use incremental::{FrameDiff, IncrementalUpdater, StableDiffCalculator, UpdateResult};
pub use model::{
    ConfidenceTier, Edge, EdgeId, EdgeKind, Frame, FrameId, FrameKind, FramePayload, Provenance,
    Span,
};
pub use parsing::{MultiPassParser, ParseStatistics};
pub use stable_id::{IdStrategy, NodeContext, StableIdGenerator};

// The parser boundary crate, re-exported for downstream convenience.
pub use framegraph_parser_api::{LanguageParser, ParserError, RawNode};
