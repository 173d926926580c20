//! Error types for cbr2kepub operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort a conversion run.
///
/// Every variant is fatal. Image validation problems are not errors; see
/// [`ValidationIssue`](crate::validate::ValidationIssue).
#[derive(Error, Debug)]
pub enum Error {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("{tool} is required to extract RAR archives but could not be run; {guidance}")]
    ExtractionToolMissing {
        tool: String,
        guidance: &'static str,
    },

    #[error("unsupported archive format: {0}")]
    UnsupportedArchive(String),

    #[error("archive extraction failed: {0}")]
    Extraction(String),

    #[error("no image files found in archive")]
    NoPagesFound,

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate container entry: {0}")]
    DuplicateEntry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    /// Wrap an I/O failure on a path we were trying to create or write.
    pub(crate) fn write(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::Write { path, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
