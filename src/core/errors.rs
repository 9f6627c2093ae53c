//! Shared error types for the scanner and code emitter

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for markscan operations
#[derive(Debug, Error)]
pub enum Error {
    /// File system related errors
    #[error("File system error: {message}")]
    FileSystem {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Parsing errors
    #[error("Parse error in {file}:{line}:{column}: {message}")]
    Parse {
        file: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A directive whose argument is not a single marker path
    #[error("Malformed directive in {file}:{line}: {message}")]
    MalformedDirective {
        file: PathBuf,
        line: usize,
        message: String,
    },

    /// A directive whose marker path does not name any known item
    #[error("Unresolved directive in {file}:{line}: `{path}` does not name a marker item")]
    UnresolvedDirective {
        file: PathBuf,
        line: usize,
        path: String,
    },

    /// Two distinct groupings that would produce the same binding name
    #[error("Binding `{name}` would be generated for both `{first}` and `{second}`")]
    BindingCollision {
        name: String,
        first: String,
        second: String,
    },

    /// Generated output on disk differs from the current pass
    #[error("Generated output is out of date: {}", path.display())]
    StaleOutput { path: PathBuf },

    /// Pattern errors
    #[error(transparent)]
    Pattern(#[from] glob::PatternError),

    /// Directory walk errors
    #[error(transparent)]
    Walk(#[from] ignore::Error),
}

impl Error {
    /// Create a file system error with path context
    pub fn file_system(
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            message: message.into(),
            path: Some(path.into()),
            source: Some(source),
        }
    }

    /// Create a parse error from a syn error, using its span for the location
    pub fn parse(file: impl Into<PathBuf>, error: &syn::Error) -> Self {
        let start = error.span().start();
        Self::Parse {
            file: file.into(),
            line: start.line,
            column: start.column + 1,
            message: error.to_string(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
