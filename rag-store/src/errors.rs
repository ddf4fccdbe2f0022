//! Unified error types for the crate.

use thiserror::Error;

/// Top-level error for rag-store operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Vector dimensionality differs from the collection's.
    #[error("vector size mismatch for id '{id}': got {got}, want {want}")]
    VectorSizeMismatch { id: String, got: usize, want: usize },

    /// More vectors in one upsert call than a single request may carry.
    #[error("upsert batch of {got} vectors exceeds the limit of {max}")]
    BatchTooLarge { got: usize, max: usize },

    /// Namespace was empty.
    #[error("namespace must not be empty")]
    EmptyNamespace,

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),
}
