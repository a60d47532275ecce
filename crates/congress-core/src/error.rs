//! Error types for loading and decoding records.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while listing, reading or decoding source documents.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Data directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Failed to list {path}: {source}")]
    ListDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {source_name}: {reason}")]
    Decode { source_name: String, reason: String },
}

/// Result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;

impl LoadError {
    /// Create a decode error for a named document.
    pub fn decode(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error only affects a single document.
    ///
    /// Record-scoped errors are skipped by the sync passes; the rest abort the run.
    pub fn is_record_scoped(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Decode { .. })
    }

    /// The document or directory the error refers to.
    pub fn source_name(&self) -> String {
        match self {
            Self::MissingDirectory(path) => path.display().to_string(),
            Self::ListDirectory { path, .. } | Self::Read { path, .. } => {
                path.display().to_string()
            }
            Self::Decode { source_name, .. } => source_name.clone(),
        }
    }
}
