//! Error types for graph store access and sync runs.

use congress_core::LoadError;
use thiserror::Error;

/// Errors raised by a graph store.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Cannot connect to graph store at {uri}: {reason}")]
    Connection { uri: String, reason: String },

    #[error("Graph query failed: {0}")]
    Query(String),

    #[error("Graph transaction failed: {0}")]
    Transaction(String),

    #[error("Batch rejected by graph store: {0}")]
    Rejected(String),

    #[error("Invalid graph configuration: {0}")]
    Config(String),
}

/// Result type for graph store operations.
pub type GraphResult<T> = Result<T, GraphError>;

impl GraphError {
    /// Connection failures abort a run; everything else is contained.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Connection { .. } | Self::Config(_))
    }
}

/// Errors that abort a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Load(#[from] LoadError),
}
