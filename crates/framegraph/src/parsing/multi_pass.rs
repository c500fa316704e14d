//! Pipeline orchestration: raw extraction → hierarchy → symbol resolution.

use crate::config::IndexerConfig;
use crate::confidence::frame_confidence;
use crate::error::Result;
use crate::graph::CodebaseContext;
use crate::model::{Frame, FrameId, FrameKind, Provenance};
use crate::parsing::builder::GraphBuilder;
use crate::parsing::resolver::SymbolResolver;
use framegraph_parser_api::{LanguageParser, RawNode};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Summary counters for one completed session.
#[derive(Debug, Clone, Serialize)]
pub struct ParseStatistics {
    pub session_id: Uuid,
    pub files_processed: usize,
    pub files_failed: usize,
    pub frame_count: usize,
    pub edge_count: usize,
    pub frames_by_kind: HashMap<String, usize>,
}

/// Drives the three phases over one shared [`CodebaseContext`].
///
/// Phases are strictly sequential: hierarchy construction needs the complete
/// raw extraction, and resolving `Foo.bar` requires `Foo` to already exist.
/// Failure policy: per-file extraction errors are logged and the file is
/// skipped; a session-wide hierarchy failure degrades to a single minimal
/// CODEBASE frame; resolution never throws.
pub struct MultiPassParser {
    config: IndexerConfig,
    parsers: Vec<Box<dyn LanguageParser>>,
    ctx: CodebaseContext,
    session_id: Uuid,
    files_failed: usize,
}

impl MultiPassParser {
    pub fn new(config: IndexerConfig) -> Self {
        Self {
            config,
            parsers: Vec::new(),
            ctx: CodebaseContext::new(),
            session_id: Uuid::new_v4(),
            files_failed: 0,
        }
    }

    /// Register a language front-end.
    pub fn with_parser(mut self, parser: Box<dyn LanguageParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    pub fn context(&self) -> &CodebaseContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut CodebaseContext {
        &mut self.ctx
    }

    /// Index a whole source tree. Returns the codebase root handle.
    ///
    /// # Errors
    ///
    /// Only truly unrecoverable failures surface; anything file- or
    /// reference-local is absorbed with a confidence penalty.
    pub fn parse_codebase(&mut self, root: &Path) -> Result<FrameId> {
        self.ctx.reset();
        self.files_failed = 0;

        let mut filter = self.config.source_filter.clone();
        if filter.extensions.is_empty() {
            filter.extensions = self
                .parsers
                .iter()
                .flat_map(|p| p.file_extensions().iter().map(|e| e.to_string()))
                .collect();
        }
        let files = framegraph_parser_api::discover_source_files(root, &filter);
        info!(
            "session {}: discovered {} files under {}",
            self.session_id,
            files.len(),
            root.display()
        );

        let streams = self.extract_streams(&files);
        self.build_and_resolve(root, &streams)
    }

    /// Re-run the pipeline scoped to one file, for incremental updates.
    ///
    /// The codebase is taken to be the file's parent directory. After the
    /// graph is built, the CODEBASE and LANGUAGE frames get their `file_path`
    /// set to the parsed file — after id computation, so those ids stay
    /// location-independent while the frames still belong to the file's
    /// stored record set.
    pub fn parse_single_file(&mut self, path: &Path) -> Result<FrameId> {
        self.ctx.reset();
        self.files_failed = 0;

        let root = path.parent().unwrap_or(Path::new(".")).to_path_buf();
        let streams = self.extract_streams(&[path.to_path_buf()]);
        let codebase = self.build_and_resolve(&root, &streams)?;

        let structural: Vec<FrameId> = self
            .ctx
            .arena()
            .iter()
            .filter(|(_, f)| matches!(f.kind, FrameKind::Codebase | FrameKind::Language))
            .map(|(&handle, _)| handle)
            .collect();
        for handle in structural {
            if let Some(frame) = self.ctx.frame_mut(handle) {
                frame.file_path = Some(path.to_path_buf());
            }
        }
        Ok(codebase)
    }

    /// Phase 1: per-file raw extraction with per-file failure isolation.
    fn extract_streams(&mut self, files: &[PathBuf]) -> Vec<(PathBuf, Vec<RawNode>)> {
        let mut streams = Vec::new();
        for path in files {
            let parser = self.parsers.iter().find(|p| p.can_parse(path));
            let parser = match parser {
                Some(parser) => parser,
                None => {
                    debug!("no front-end for {}, skipping", path.display());
                    continue;
                }
            };
            match parser.extract_raw_nodes(path) {
                Ok(nodes) => streams.push((path.clone(), nodes)),
                Err(e) => {
                    warn!("skipping {}: {e}", path.display());
                    self.files_failed += 1;
                }
            }
        }
        streams
    }

    /// Phases 2 and 3, with whole-session degradation on hierarchy failure.
    fn build_and_resolve(
        &mut self,
        root: &Path,
        streams: &[(PathBuf, Vec<RawNode>)],
    ) -> Result<FrameId> {
        let builder = GraphBuilder::new(self.config.max_node_depth);
        let codebase = match builder.build(&mut self.ctx, root, streams) {
            Ok(codebase) => codebase,
            Err(e) => {
                warn!("hierarchy build failed, degrading to minimal codebase: {e}");
                return Ok(self.create_minimal_codebase(root, &e.to_string()));
            }
        };

        SymbolResolver::resolve_references(&mut self.ctx);
        debug!(
            "session {}: {} frames, {} edges",
            self.session_id,
            self.ctx.frame_count(),
            self.ctx.get_all_edges().len()
        );
        Ok(codebase)
    }

    /// Total but contained failure: one CODEBASE frame at confidence 0.1
    /// carrying the error, nothing else.
    fn create_minimal_codebase(&mut self, root: &Path, error: &str) -> FrameId {
        self.ctx.reset();
        let name = root
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("codebase")
            .to_string();
        let mut frame = Frame::new(FrameKind::Codebase, &name, &name);
        frame.set_confidence(
            frame_confidence(1, Provenance::ParseFailed),
            Provenance::ParseFailed,
            1,
        );
        frame.metadata.insert("error".to_string(), json!(error));
        frame.id = frame.compute_id();
        let handle = self.ctx.insert_frame(frame);
        self.ctx.codebase_root = Some(handle);
        handle
    }

    /// Counters for the current session.
    pub fn statistics(&self) -> ParseStatistics {
        let frames = self.ctx.get_all_frames();
        let mut by_kind: HashMap<String, usize> = HashMap::new();
        for handle in &frames {
            if let Some(frame) = self.ctx.frame(*handle) {
                *by_kind.entry(frame.kind.to_string()).or_insert(0) += 1;
            }
        }
        ParseStatistics {
            session_id: self.session_id,
            files_processed: self.ctx.processed_files.len(),
            files_failed: self.files_failed,
            frame_count: frames.len(),
            edge_count: self.ctx.get_all_edges().len(),
            frames_by_kind: by_kind,
        }
    }
}
