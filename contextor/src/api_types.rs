//! Request/response payloads shared with the HTTP layer.

use ai_llm_service::types::ChatMessage;
use serde::{Deserialize, Serialize};

use crate::history::ConversationTurn;

/// Pipeline input. Missing fields deserialize as empty and are rejected by
/// the pipeline, not by the JSON layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub prv_messages: Vec<ConversationTurn>,
}

/// A relevant product or Q&A hit, enriched from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatch {
    pub id: String,
    pub score: f32,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Empty when the id is not an eSIM in the catalog.
    pub group_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub matches: Vec<SearchMatch>,
    pub answer: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TuningRequest {
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TuningResponse {
    pub prompt: String,
    pub response: ChatMessage,
}

/// Outcome of one indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub indexed: u64,
    pub batches: u64,
    /// Records without text to embed.
    pub skipped: u64,
    pub duration_ms: u64,
}
