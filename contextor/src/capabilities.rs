//! External capabilities the pipeline depends on.
//!
//! Production implementations live in [`crate::adapters`]; call-counting
//! doubles in [`crate::mock`].

use ai_llm_service::types::ChatMessage;
use async_trait::async_trait;
use rag_store::{IndexMatch, IndexVector};
use thiserror::Error;

/// Failure reported by a capability. Carries the provider's message verbatim.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

impl CapabilityError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Text → fixed-dimension vector.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError>;
}

/// Namespaced similarity index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Creates backing storage if needed. No-op by default.
    async fn prepare(&self) -> Result<(), CapabilityError> {
        Ok(())
    }

    /// Writes one batch; all-or-nothing. Returns the number of vectors written.
    async fn upsert(
        &self,
        namespace: &str,
        batch: Vec<IndexVector>,
    ) -> Result<u64, CapabilityError>;

    /// Top-K matches by descending score.
    async fn query(
        &self,
        namespace: &str,
        vector: Vec<f32>,
        top_k: u64,
        include_metadata: bool,
    ) -> Result<Vec<IndexMatch>, CapabilityError>;
}

/// Chat completion over an ordered message list.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CapabilityError>;
}
