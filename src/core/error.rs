use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while reading, parsing or batching DIAN documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DianError {
    /// The input file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The XML could not be turned into a document tree.
    #[error("XML error: {0}")]
    Xml(String),

    /// Invalid or unreadable parser configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// The worker pool could not be set up or a batch thread died.
    #[error("batch error: {0}")]
    Batch(String),
}

/// Per-file parse failure: the file that failed and why.
///
/// This is the "no record" outcome of [`parse_document`](crate::dian::parse_document).
/// It never aborts sibling files in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}: {message}", path.display())]
pub struct ParseFailure {
    /// File that could not be parsed.
    pub path: PathBuf,
    /// Human-readable diagnostic.
    pub message: String,
}

impl ParseFailure {
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap a crate error with the file it occurred in.
    pub fn from_error(path: &Path, err: &DianError) -> Self {
        Self::new(path, err.to_string())
    }
}
