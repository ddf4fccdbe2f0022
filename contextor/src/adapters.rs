//! Capability implementations over `ai-llm-service` and `rag-store`.

use std::sync::Arc;

use ai_llm_service::{
    service_profiles::{LlmServiceProfiles, Profile},
    types::ChatMessage,
};
use async_trait::async_trait;
use rag_store::{IndexMatch, IndexVector, RagStore};

use crate::capabilities::{CapabilityError, CompletionClient, EmbeddingClient, VectorIndex};

/// Embeddings through the `embedding` profile.
pub struct ProfileEmbedder {
    svc: Arc<LlmServiceProfiles>,
}

impl ProfileEmbedder {
    pub fn new(svc: Arc<LlmServiceProfiles>) -> Self {
        Self { svc }
    }
}

#[async_trait]
impl EmbeddingClient for ProfileEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        self.svc
            .embed(text)
            .await
            .map_err(|e| CapabilityError::new(e.to_string()))
    }
}

/// Chat completion through one named profile.
pub struct ProfileCompleter {
    svc: Arc<LlmServiceProfiles>,
    profile: Profile,
}

impl ProfileCompleter {
    pub fn new(svc: Arc<LlmServiceProfiles>, profile: Profile) -> Self {
        Self { svc, profile }
    }
}

#[async_trait]
impl CompletionClient for ProfileCompleter {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CapabilityError> {
        self.svc
            .complete(self.profile, messages)
            .await
            .map_err(|e| CapabilityError::new(e.to_string()))
    }
}

#[async_trait]
impl VectorIndex for RagStore {
    async fn prepare(&self) -> Result<(), CapabilityError> {
        self.ensure_collection()
            .await
            .map_err(|e| CapabilityError::new(e.to_string()))
    }

    async fn upsert(
        &self,
        namespace: &str,
        batch: Vec<IndexVector>,
    ) -> Result<u64, CapabilityError> {
        RagStore::upsert(self, namespace, batch)
            .await
            .map_err(|e| CapabilityError::new(e.to_string()))
    }

    async fn query(
        &self,
        namespace: &str,
        vector: Vec<f32>,
        top_k: u64,
        include_metadata: bool,
    ) -> Result<Vec<IndexMatch>, CapabilityError> {
        RagStore::query(self, namespace, vector, top_k, include_metadata)
            .await
            .map_err(|e| CapabilityError::new(e.to_string()))
    }
}
