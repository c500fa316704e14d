use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur in a language front-end
#[derive(Error, Debug)]
pub enum ParserError {
    /// Failed to read a source file
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    /// Syntax error in source code
    #[error("Syntax error in {0}:{1}:{2}: {3}")]
    Syntax(PathBuf, usize, usize, String),

    /// File too large to parse
    #[error("File {0} exceeds maximum size ({1} bytes)")]
    FileTooLarge(PathBuf, usize),

    /// No front-end registered for this file's language
    #[error("Unsupported language for {0}")]
    UnsupportedLanguage(PathBuf),

    /// Generic parsing error
    #[error("Parse error in {0}: {1}")]
    Parse(PathBuf, String),
}

/// Result type for parser operations
pub type ParserResult<T> = Result<T, ParserError>;
