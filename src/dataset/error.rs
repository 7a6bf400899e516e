use std::path::PathBuf;

use thiserror::Error;

use super::Label;

/// Errors raised while building or reading dataset views.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// An option or input list was rejected before any work happened.
    #[error("Invalid configuration: {0}")]
    Configuration(String),
    /// A class has fewer items than the per-class sample size.
    #[error("Cannot sample {requested} items for class {class}: only {available} available")]
    Sampling {
        /// Class id that came up short.
        class: Label,
        /// Requested per-class count.
        requested: usize,
        /// Items carrying that class id.
        available: usize,
    },
    /// Failed to read a file or directory.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },
    /// Image bytes could not be decoded.
    #[error("Failed to decode image {path}: {source}")]
    Decode {
        /// Image path.
        path: PathBuf,
        /// Decoder error.
        source: image::ImageError,
    },
    /// Index outside `[0, len)`.
    #[error("Index {index} out of range for dataset of length {len}")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Dataset length.
        len: usize,
    },
    /// A case folder name without a `-`-delimited case identifier.
    #[error("Folder name has no case identifier: {0}")]
    MalformedName(String),
    /// Split manifest could not be encoded or parsed.
    #[error("Invalid split manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl DatasetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
