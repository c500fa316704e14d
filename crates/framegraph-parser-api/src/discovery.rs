//! Source-file discovery shared by all front-ends.
//!
//! The engine hands discovery a root directory and a [`SourceFilter`]; it gets
//! back a sorted list of candidate files. Sorting matters: downstream id
//! generation is order-independent, but deterministic file order keeps logs
//! and statistics reproducible across runs.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Filter applied during directory walks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFilter {
    /// Extensions to accept, without the dot. Empty accepts everything.
    pub extensions: Vec<String>,
    /// Path substrings to reject, checked against each path component.
    /// Defaults cover VCS metadata and common build/vendored trees.
    pub ignore_patterns: Vec<String>,
    /// Skip files larger than this many bytes.
    pub max_file_size: u64,
    /// Skip dot-directories and dot-files.
    pub skip_hidden: bool,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            ignore_patterns: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                "target".to_string(),
                "__pycache__".to_string(),
                ".venv".to_string(),
                "build".to_string(),
                "dist".to_string(),
            ],
            max_file_size: 10 * 1024 * 1024, // 10 MB
            skip_hidden: true,
        }
    }
}

impl SourceFilter {
    /// Restrict to the given extensions.
    pub fn with_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    /// Add an ignore pattern.
    pub fn ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignore_patterns.push(pattern.into());
        self
    }

    fn accepts_component(&self, name: &str) -> bool {
        if self.skip_hidden && name.starts_with('.') && name.len() > 1 {
            return false;
        }
        !self.ignore_patterns.iter().any(|p| p == name)
    }

    fn accepts_file(&self, path: &Path, size: u64) -> bool {
        if size > self.max_file_size {
            return false;
        }
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|want| want == ext))
            .unwrap_or(false)
    }
}

/// Recursively discover source files under `root`, sorted by path.
///
/// Unreadable subdirectories are skipped rather than failing the walk; a
/// missing or non-directory `root` yields an empty list.
pub fn discover_source_files(root: &Path, filter: &SourceFilter) -> Vec<PathBuf> {
    let mut found = Vec::new();
    walk(root, filter, &mut found);
    found.sort();
    found
}

fn walk(dir: &Path, filter: &SourceFilter, found: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };
        if !filter.accepts_component(&name) {
            continue;
        }

        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        if meta.is_dir() {
            walk(&path, filter, found);
        } else if meta.is_file() && filter.accepts_file(&path, meta.len()) {
            found.push(path);
        }
    }
}

/// Map a file extension onto a lowercase language name.
///
/// Returns `None` for unknown extensions; callers decide whether unknown
/// files are skipped or routed to a fallback front-end.
pub fn detect_language(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    let language = match ext {
        "py" | "pyi" => "python",
        "rs" => "rust",
        "js" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "go" => "go",
        "java" => "java",
        "c" | "h" => "c",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "rb" => "ruby",
        "php" => "php",
        "kt" | "kts" => "kotlin",
        "cs" => "csharp",
        "swift" => "swift",
        _ => return None,
    };
    Some(language)
}
