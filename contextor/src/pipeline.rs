//! Search pipeline orchestrator.
//!
//! A run moves through
//! `Idle → Embedding → Searching → Enriching → Filtering → Composing → Completing → Responding`
//! and stops at the first failing stage. Only the three external calls can
//! fail; each is bounded by the configured step timeout.

use std::{fmt, future::Future, sync::Arc};

use catalog::Catalog;
use rag_store::IndexMatch;
use serde_json::Value;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    api_types::{SearchMatch, SearchRequest, SearchResponse},
    capabilities::{CapabilityError, CompletionClient, EmbeddingClient, VectorIndex},
    cfg::PipelineConfig,
    error::ContextorError,
    filter::filter_relevant,
    history::{ConversationStore, ConversationTurn},
    prompt::{PromptBranch, compose},
};

pub const MISSING_FIELDS: &str = "Missing userId or query";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Embedding,
    Searching,
    Enriching,
    Filtering,
    Composing,
    Completing,
    Responding,
    /// Used by the indexing job.
    Upserting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Idle => "idle",
            Stage::Embedding => "embedding",
            Stage::Searching => "searching",
            Stage::Enriching => "enriching",
            Stage::Filtering => "filtering",
            Stage::Composing => "composing",
            Stage::Completing => "completing",
            Stage::Responding => "responding",
            Stage::Upserting => "upserting",
        };
        f.write_str(s)
    }
}

/// Runs one external call under the step timeout, mapping failures to
/// [`ContextorError::Provider`].
pub(crate) async fn bounded<T, F>(
    stage: Stage,
    limit: std::time::Duration,
    fut: F,
) -> Result<T, ContextorError>
where
    F: Future<Output = Result<T, CapabilityError>>,
{
    match timeout(limit, fut).await {
        Ok(Ok(v)) => Ok(v),
        Ok(Err(e)) => {
            error!(%stage, error = %e, "provider call failed");
            Err(ContextorError::Provider {
                stage,
                message: e.to_string(),
            })
        }
        Err(_) => {
            error!(%stage, timeout_ms = limit.as_millis() as u64, "provider call timed out");
            Err(ContextorError::Provider {
                stage,
                message: format!("timed out after {limit:?}"),
            })
        }
    }
}

/// Retrieval-augmented answer generation for product queries.
pub struct SearchPipeline {
    embedder: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
    completer: Arc<dyn CompletionClient>,
    catalog: Arc<Catalog>,
    history: Arc<ConversationStore>,
    cfg: PipelineConfig,
}

impl SearchPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingClient>,
        index: Arc<dyn VectorIndex>,
        completer: Arc<dyn CompletionClient>,
        catalog: Arc<Catalog>,
        history: Arc<ConversationStore>,
        cfg: PipelineConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            completer,
            catalog,
            history,
            cfg,
        }
    }

    pub fn history(&self) -> &Arc<ConversationStore> {
        &self.history
    }

    /// Answers one query.
    ///
    /// # Errors
    /// - [`ContextorError::BadRequest`] when `userId` or `query` is blank; no
    ///   capability is called
    /// - [`ContextorError::Provider`] when embedding, search or completion fails
    #[instrument(skip_all, fields(user_id = %req.user_id))]
    pub async fn run(&self, req: SearchRequest) -> Result<SearchResponse, ContextorError> {
        let user_id = req.user_id.trim();
        let query = req.query.trim();
        if user_id.is_empty() || query.is_empty() {
            warn!(stage = %Stage::Idle, "rejected: {MISSING_FIELDS}");
            return Err(ContextorError::BadRequest(MISSING_FIELDS.to_string()));
        }
        let limit = self.cfg.step_timeout;

        debug!(stage = %Stage::Embedding, query_len = query.len());
        let vector = bounded(Stage::Embedding, limit, self.embedder.embed(&req.query)).await?;

        debug!(stage = %Stage::Searching, dim = vector.len(), top_k = self.cfg.top_k);
        let raw = bounded(
            Stage::Searching,
            limit,
            self.index
                .query(&self.cfg.namespace, vector, self.cfg.top_k, true),
        )
        .await?;

        debug!(stage = %Stage::Enriching, hits = raw.len());
        let matches: Vec<SearchMatch> = raw.into_iter().map(|m| self.enrich(m)).collect();

        debug!(stage = %Stage::Filtering, threshold = self.cfg.threshold);
        let filtered = filter_relevant(matches, self.cfg.threshold);

        let history = if req.prv_messages.is_empty() {
            self.history.get_recent(user_id).await
        } else {
            req.prv_messages
        };
        let prompt = compose(&req.query, &filtered, &history);
        debug!(
            stage = %Stage::Composing,
            branch = ?prompt.branch,
            relevant = filtered.len(),
            history = history.len()
        );

        debug!(stage = %Stage::Completing, messages = prompt.messages.len());
        let answer = bounded(
            Stage::Completing,
            limit,
            self.completer.complete(&prompt.messages),
        )
        .await?;

        let matches = match prompt.branch {
            PromptBranch::Fallback => {
                self.history
                    .append_exchange(
                        user_id,
                        ConversationTurn::user(req.query.clone()),
                        ConversationTurn::assistant(answer.clone()),
                    )
                    .await;
                Vec::new()
            }
            PromptBranch::Contextual => filtered,
        };

        info!(
            stage = %Stage::Responding,
            branch = ?prompt.branch,
            matches = matches.len(),
            "search answered"
        );

        Ok(SearchResponse {
            query: req.query,
            matches,
            answer,
        })
    }

    /// Index hit → response match. Metadata wins; the catalog fills gaps and
    /// supplies the group id. Unknown ids degrade to empty fields.
    fn enrich(&self, m: IndexMatch) -> SearchMatch {
        let record = self.catalog.find_by_id(&m.id);
        if record.is_none() {
            debug!(id = %m.id, "index id not in catalog");
        }
        let meta = m.metadata.unwrap_or_default();
        let text = |key: &str| meta.get(key).and_then(value_to_string);

        SearchMatch {
            name: text("name")
                .or_else(|| record.and_then(|r| r.name.clone()))
                .unwrap_or_default(),
            description: text("description")
                .or_else(|| record.and_then(|r| r.description.clone()))
                .unwrap_or_default(),
            kind: text("type")
                .or_else(|| record.map(|r| r.kind.clone()))
                .unwrap_or_default(),
            action: text("action").or_else(|| record.and_then(|r| r.action.clone())),
            group_id: record
                .and_then(|r| r.group_key())
                .unwrap_or_default()
                .to_string(),
            id: m.id,
            score: m.score,
        }
    }
}

fn value_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
