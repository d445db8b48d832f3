use std::path::PathBuf;

use thiserror::Error;

#[cfg(feature = "epub")]
use crate::loaders::epub::EpubError;

/// Errors returned by every public loading entry point.
///
/// Missing or malformed *metadata* is never an error; loaders leave the
/// corresponding [Properties](crate::Properties) fields empty instead.
#[derive(Error, Debug)]
pub enum LoaderError {
    /// The file extension is not one of the supported formats.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// The EPUB container, its `container.xml` or the OPF package is unusable.
    #[cfg(feature = "epub")]
    #[error("malformed archive: {0}")]
    MalformedArchive(#[from] EpubError),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    PdfError(#[from] lopdf::Error),

    #[cfg(feature = "csv")]
    #[error(transparent)]
    CsvError(#[from] csv::Error),

    /// The caller's [CancelSignal](crate::CancelSignal) fired while loading.
    #[error("load cancelled")]
    Cancelled,

    #[error("Invalid glob pattern: {0}")]
    PatternError(#[from] glob::PatternError),

    #[error("Glob error: {0}")]
    GlobError(#[from] glob::GlobError),
}

impl LoaderError {
    /// Maps an IO failure on `path` to [LoaderError::NotFound] when the file is missing.
    pub(crate) fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            LoaderError::NotFound(path.into())
        } else {
            LoaderError::IoError(err)
        }
    }
}
