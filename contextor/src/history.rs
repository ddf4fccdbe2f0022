//! In-memory per-user conversation history.
//!
//! Storage is append-only for the process lifetime; reads are bounded to the
//! last [`HISTORY_WINDOW`] turns. Each user has its own lock, so an exchange
//! is appended as one unit and users never block each other beyond the map
//! lookup.

use std::{collections::HashMap, sync::Arc};

use ai_llm_service::types::{ChatMessage, Role};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::trace;

/// Number of turns returned by [`ConversationStore::get_recent`].
pub const HISTORY_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&ConversationTurn> for ChatMessage {
    fn from(t: &ConversationTurn) -> Self {
        ChatMessage {
            role: match t.role {
                TurnRole::User => Role::User,
                TurnRole::Assistant => Role::Assistant,
            },
            content: t.content.clone(),
        }
    }
}

type Turns = Arc<Mutex<Vec<ConversationTurn>>>;

#[derive(Debug, Default)]
pub struct ConversationStore {
    users: RwLock<HashMap<String, Turns>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last turns for `user_id` in append order; empty for unknown users.
    pub async fn get_recent(&self, user_id: &str) -> Vec<ConversationTurn> {
        let Some(turns) = self.users.read().await.get(user_id).cloned() else {
            return Vec::new();
        };
        let turns = turns.lock().await;
        let start = turns.len().saturating_sub(HISTORY_WINDOW);
        turns[start..].to_vec()
    }

    pub async fn append(&self, user_id: &str, turn: ConversationTurn) {
        let turns = self.turns_for(user_id).await;
        turns.lock().await.push(turn);
    }

    /// Appends a user turn and the assistant reply as one unit.
    pub async fn append_exchange(
        &self,
        user_id: &str,
        user: ConversationTurn,
        assistant: ConversationTurn,
    ) {
        let turns = self.turns_for(user_id).await;
        let mut turns = turns.lock().await;
        turns.push(user);
        turns.push(assistant);
        trace!(user_id, total = turns.len(), "exchange appended");
    }

    /// Total stored turns for a user (not bounded by the window).
    pub async fn total_turns(&self, user_id: &str) -> usize {
        let turns = self.users.read().await.get(user_id).cloned();
        match turns {
            Some(turns) => turns.lock().await.len(),
            None => 0,
        }
    }

    async fn turns_for(&self, user_id: &str) -> Turns {
        if let Some(t) = self.users.read().await.get(user_id) {
            return t.clone();
        }
        self.users
            .write()
            .await
            .entry(user_id.to_string())
            .or_default()
            .clone()
    }
}
