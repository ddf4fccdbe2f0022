//! Typed error for the contextor crate.

use thiserror::Error;

use crate::pipeline::Stage;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// Request rejected before any external call.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// An embedding, index or completion call failed or timed out.
    #[error("{stage} failed: {message}")]
    Provider { stage: Stage, message: String },

    /// Errors from the underlying rag-store crate.
    #[error("RAG error: {0}")]
    Index(#[from] rag_store::RagError),

    /// Catalog could not be loaded.
    #[error("catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),

    /// Invalid environment configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl ContextorError {
    pub fn is_bad_request(&self) -> bool {
        matches!(self, ContextorError::BadRequest(_))
    }
}
