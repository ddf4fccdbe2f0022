//! Call-counting capability doubles for tests.
//!
//! Useful for exercising the pipeline without network access, here and in
//! dependent crates.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use ai_llm_service::types::ChatMessage;
use async_trait::async_trait;
use rag_store::{IndexMatch, IndexVector, Metadata};
use serde_json::json;
use tokio::sync::Mutex;

use crate::capabilities::{CapabilityError, CompletionClient, EmbeddingClient, VectorIndex};

/// Returns a fixed vector, or fails when built with [`MockEmbedder::failing`].
#[derive(Clone, Default)]
pub struct MockEmbedder {
    fail: bool,
    calls: Arc<AtomicUsize>,
    inputs: Arc<Mutex<Vec<String>>>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn inputs(&self) -> Vec<String> {
        self.inputs.lock().await.clone()
    }
}

#[async_trait]
impl EmbeddingClient for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().await.push(text.to_string());
        if self.fail {
            return Err(CapabilityError::new("mock embedder unavailable"));
        }
        Ok(vec![0.1, 0.2, 0.3])
    }
}

/// Serves canned matches and records upserted batches.
#[derive(Clone, Default)]
pub struct MockIndex {
    matches: Vec<IndexMatch>,
    fail: bool,
    query_calls: Arc<AtomicUsize>,
    upserts: Arc<Mutex<Vec<(String, Vec<IndexVector>)>>>,
}

impl MockIndex {
    pub fn with_matches(matches: Vec<IndexMatch>) -> Self {
        Self {
            matches,
            ..Self::default()
        }
    }

    /// Matches named `m0, m1, ..` with the given scores and simple metadata.
    pub fn with_scores(scores: &[f32]) -> Self {
        let matches = scores
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let mut md = Metadata::new();
                md.insert("name".into(), json!(format!("Product {i}")));
                md.insert("description".into(), json!(format!("Description {i}")));
                md.insert("type".into(), json!("esim"));
                IndexMatch {
                    id: format!("m{i}"),
                    score: *s,
                    metadata: Some(md),
                }
            })
            .collect();
        Self::with_matches(matches)
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub async fn upserts(&self) -> Vec<(String, Vec<IndexVector>)> {
        self.upserts.lock().await.clone()
    }
}

#[async_trait]
impl VectorIndex for MockIndex {
    async fn upsert(
        &self,
        namespace: &str,
        batch: Vec<IndexVector>,
    ) -> Result<u64, CapabilityError> {
        if self.fail {
            return Err(CapabilityError::new("mock index unavailable"));
        }
        let n = batch.len() as u64;
        self.upserts
            .lock()
            .await
            .push((namespace.to_string(), batch));
        Ok(n)
    }

    async fn query(
        &self,
        _namespace: &str,
        _vector: Vec<f32>,
        top_k: u64,
        include_metadata: bool,
    ) -> Result<Vec<IndexMatch>, CapabilityError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(CapabilityError::new("mock index unavailable"));
        }
        Ok(self
            .matches
            .iter()
            .take(top_k as usize)
            .cloned()
            .map(|mut m| {
                if !include_metadata {
                    m.metadata = None;
                }
                m
            })
            .collect())
    }
}

/// Returns a canned answer and records every message list it receives.
#[derive(Clone, Default)]
pub struct MockCompleter {
    answer: String,
    fail: bool,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl MockCompleter {
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Sleeps before answering (on the tokio clock).
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn received(&self) -> Vec<Vec<ChatMessage>> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompleter {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, CapabilityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().await.push(messages.to_vec());
        if let Some(d) = self.delay {
            tokio::time::sleep(d).await;
        }
        if self.fail {
            return Err(CapabilityError::new("mock completion unavailable"));
        }
        Ok(self.answer.clone())
    }
}
