use crate::errors::{ParserError, ParserResult};
use crate::raw::RawNode;
use std::path::{Path, PathBuf};

/// Core trait all language front-ends must implement.
///
/// Implementations must be `Send + Sync` so the engine can swap front-ends
/// behind a `Box<dyn LanguageParser>` and hand them across threads.
pub trait LanguageParser: Send + Sync {
    /// Lowercase language name, e.g. `"python"`.
    fn language(&self) -> &'static str;

    /// File extensions this front-end claims, without the dot.
    fn file_extensions(&self) -> &[&'static str];

    /// Extract the flat node stream for one file.
    ///
    /// # Errors
    ///
    /// Returns [`ParserError::Io`] if the file cannot be read, or a parse
    /// error for malformed source. Callers treat any error as a per-file
    /// failure and skip the file.
    fn extract_raw_nodes(&self, path: &Path) -> ParserResult<Vec<RawNode>>;

    /// Extract from in-memory source, attributing nodes to `path`.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed source.
    fn extract_from_source(&self, source: &str, path: &Path) -> ParserResult<Vec<RawNode>>;

    /// Whether this front-end can handle the given file.
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.file_extensions().contains(&ext))
            .unwrap_or(false)
    }

    /// Extract node streams for several files, skipping failures.
    ///
    /// Returns successfully parsed streams paired with their paths; failed
    /// files are reported in the second element.
    fn extract_many(
        &self,
        paths: &[PathBuf],
    ) -> (Vec<(PathBuf, Vec<RawNode>)>, Vec<(PathBuf, ParserError)>) {
        let mut parsed = Vec::new();
        let mut failed = Vec::new();
        for path in paths {
            match self.extract_raw_nodes(path) {
                Ok(nodes) => parsed.push((path.clone(), nodes)),
                Err(e) => failed.push((path.clone(), e)),
            }
        }
        (parsed, failed)
    }
}
