//! Framegraph Parser API
//!
//! Shared trait and types for building framegraph language front-ends.
//!
//! A language front-end turns source files into a flat, index-linked stream of
//! [`RawNode`]s. The engine consumes that stream to build its frame hierarchy;
//! it never sees a concrete syntax tree. Implementations typically wrap a
//! tree-sitter grammar, but anything that can emit byte-accurate node spans
//! works.
//!
//! # Example
//!
//! ```
//! use framegraph_parser_api::{LanguageParser, ParserResult, RawNode};
//! use std::path::Path;
//!
//! struct NullParser;
//!
//! impl LanguageParser for NullParser {
//!     fn language(&self) -> &'static str {
//!         "null"
//!     }
//!
//!     fn file_extensions(&self) -> &[&'static str] {
//!         &["null"]
//!     }
//!
//!     fn extract_raw_nodes(&self, path: &Path) -> ParserResult<Vec<RawNode>> {
//!         let source = std::fs::read_to_string(path)
//!             .map_err(|e| framegraph_parser_api::ParserError::Io(path.to_path_buf(), e))?;
//!         self.extract_from_source(&source, path)
//!     }
//!
//!     fn extract_from_source(&self, _source: &str, _path: &Path) -> ParserResult<Vec<RawNode>> {
//!         Ok(Vec::new())
//!     }
//! }
//! ```

pub mod discovery;
pub mod errors;
pub mod raw;
pub mod traits;

pub use discovery::{detect_language, discover_source_files, SourceFilter};
pub use errors::{ParserError, ParserResult};
pub use raw::RawNode;
pub use traits::LanguageParser;
