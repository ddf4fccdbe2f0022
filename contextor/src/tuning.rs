//! Direct question answering with the fine-tuned model, no retrieval.

use std::{sync::Arc, time::Duration};

use ai_llm_service::types::ChatMessage;
use tracing::{info, warn};

use crate::{
    api_types::TuningResponse,
    capabilities::CompletionClient,
    error::ContextorError,
    pipeline::{Stage, bounded},
};

pub const TUNING_SYSTEM_PROMPT: &str = "You are a fine-tuned assistant. Always respond strictly based on your training data and use a friendly tone.";
pub const PROMPT_REQUIRED: &str = "Prompt is required.";

pub struct FineTunedAssistant {
    completer: Arc<dyn CompletionClient>,
    step_timeout: Duration,
}

impl FineTunedAssistant {
    /// `completer` is expected to run the fine-tuned profile.
    pub fn new(completer: Arc<dyn CompletionClient>, step_timeout: Duration) -> Self {
        Self {
            completer,
            step_timeout,
        }
    }

    pub async fn ask(&self, prompt: &str) -> Result<TuningResponse, ContextorError> {
        if prompt.trim().is_empty() {
            warn!("rejected: {PROMPT_REQUIRED}");
            return Err(ContextorError::BadRequest(PROMPT_REQUIRED.to_string()));
        }

        let messages = [
            ChatMessage::system(TUNING_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ];
        let content = bounded(
            Stage::Completing,
            self.step_timeout,
            self.completer.complete(&messages),
        )
        .await?;

        info!(prompt_len = prompt.len(), "fine-tuned answer produced");
        Ok(TuningResponse {
            prompt: prompt.to_string(),
            response: ChatMessage::assistant(content),
        })
    }
}
