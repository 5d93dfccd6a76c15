use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ShapesError {
    #[error("no download source configured for the `{0}` variant")]
    UnknownVariant(String),

    #[error("download request failed: {0}")]
    Http(String),

    #[error("download returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("download truncated: received {received} of {expected} bytes")]
    TruncatedDownload { received: u64, expected: u64 },

    #[error("archive error: {0}")]
    Archive(String),

    #[error("archive member escapes the extraction root: {0}")]
    PathTraversal(String),

    #[error("extraction finished but the dataset directory is missing: {0}")]
    ExtractionIncomplete(PathBuf),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
