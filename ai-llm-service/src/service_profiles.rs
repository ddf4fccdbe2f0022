//! Shared LLM service with three profiles: `search`, `fine_tuned`, and `embedding`.
//!
//! - Lives in the same Tokio runtime as the application.
//! - Construct once, wrap in `Arc`, and pass clones to dependents.
//! - Caches underlying HTTP clients per config (endpoint+model+key+timeout).
//!
//! # Example
//! ```no_run
//! use std::sync::Arc;
//! use ai_llm_service::config::default_config::profiles_from_env;
//! use ai_llm_service::service_profiles::{LlmServiceProfiles, Profile};
//! use ai_llm_service::types::ChatMessage;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svc = Arc::new(LlmServiceProfiles::new(profiles_from_env()?, Some(10))?);
//!
//! let reply = svc
//!     .complete(Profile::Search, &[ChatMessage::user("Which eSIM works in Japan?")])
//!     .await?;
//! let emb = svc.embed("eSIM Japan 5GB").await?;
//! println!("{reply} / dim = {}", emb.len());
//! # Ok(()) }
//! ```

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    config::{
        default_config::ProfileConfigs, llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    health_service::{HealthService, HealthStatus},
    services::{ollama_service::OllamaService, open_ai_service::OpenAiService},
    types::ChatMessage,
};

/// Named chat profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// General model used by the product search path.
    Search,
    /// Fine-tuned model with near-deterministic sampling.
    FineTuned,
}

/// Shared service managing the chat and embedding profiles.
///
/// Internally caches Ollama/OpenAI clients keyed by their configuration to
/// avoid recreating HTTP clients on each call.
#[derive(Debug)]
pub struct LlmServiceProfiles {
    search: LlmModelConfig,
    fine_tuned: LlmModelConfig,
    embedding: LlmModelConfig,

    ollama: RwLock<HashMap<ClientKey, Arc<OllamaService>>>,
    openai: RwLock<HashMap<ClientKey, Arc<OpenAiService>>>,

    health: HealthService,
}

impl LlmServiceProfiles {
    /// Creates the service from resolved profile configs.
    ///
    /// # Errors
    /// Returns [`AiLlmError::HttpTransport`] if the health client cannot be built.
    pub fn new(
        profiles: ProfileConfigs,
        health_timeout_secs: Option<u64>,
    ) -> Result<Self, AiLlmError> {
        Ok(Self {
            search: profiles.search,
            fine_tuned: profiles.fine_tuned,
            embedding: profiles.embedding,
            ollama: RwLock::new(HashMap::new()),
            openai: RwLock::new(HashMap::new()),
            health: HealthService::new(health_timeout_secs)?,
        })
    }

    /// Runs a chat completion with the given profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] if the provider call fails.
    pub async fn complete(
        &self,
        profile: Profile,
        messages: &[ChatMessage],
    ) -> Result<String, AiLlmError> {
        let cfg = self.config(profile);
        debug!(?profile, model = %cfg.model, messages = messages.len(), "chat completion");
        match cfg.provider {
            LlmProvider::Ollama => self.get_or_init_ollama(cfg).await?.chat(messages).await,
            LlmProvider::OpenAI => self.get_or_init_openai(cfg).await?.chat(messages).await,
        }
    }

    /// Computes an embedding using the **embedding** profile.
    ///
    /// # Errors
    /// Returns [`AiLlmError`] for blank input or a failing provider call.
    pub async fn embed(&self, input: &str) -> Result<Vec<f32>, AiLlmError> {
        match self.embedding.provider {
            LlmProvider::Ollama => {
                let cli = self.get_or_init_ollama(&self.embedding).await?;
                cli.embeddings(input).await
            }
            LlmProvider::OpenAI => {
                let cli = self.get_or_init_openai(&self.embedding).await?;
                cli.embeddings(input).await
            }
        }
    }

    /// Returns a health snapshot for all distinct profiles.
    pub async fn health_all(&self) -> Vec<HealthStatus> {
        let mut list = Vec::<LlmModelConfig>::with_capacity(3);
        for cfg in [&self.search, &self.fine_tuned, &self.embedding] {
            if !list.iter().any(|c| ClientKey::from(c) == ClientKey::from(cfg)) {
                list.push(cfg.clone());
            }
        }
        self.health.check_many(&list).await
    }

    /// Returns the config behind a chat profile.
    pub fn config(&self, profile: Profile) -> &LlmModelConfig {
        match profile {
            Profile::Search => &self.search,
            Profile::FineTuned => &self.fine_tuned,
        }
    }

    /// Returns the embedding config.
    pub fn embedding_config(&self) -> &LlmModelConfig {
        &self.embedding
    }

    /* --------------------- Internals --------------------- */

    async fn get_or_init_ollama(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OllamaService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.ollama.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.ollama.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        let cli = Arc::new(OllamaService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }

    async fn get_or_init_openai(
        &self,
        cfg: &LlmModelConfig,
    ) -> Result<Arc<OpenAiService>, AiLlmError> {
        let key = ClientKey::from(cfg);
        if let Some(cli) = self.openai.read().await.get(&key).cloned() {
            return Ok(cli);
        }
        let mut w = self.openai.write().await;
        if let Some(cli) = w.get(&key) {
            return Ok(cli.clone());
        }
        let cli = Arc::new(OpenAiService::new(cfg.clone())?);
        w.insert(key, cli.clone());
        Ok(cli)
    }
}

/// Cache key identifying a unique client config.
///
/// Sampling options are part of the key so the search and fine-tuned
/// profiles never share a client even when they target the same model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ClientKey {
    provider: LlmProvider,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Option<u64>,
    max_tokens: Option<u32>,
    temperature_bits: Option<u32>,
    top_p_bits: Option<u32>,
}

impl From<&LlmModelConfig> for ClientKey {
    fn from(cfg: &LlmModelConfig) -> Self {
        Self {
            provider: cfg.provider,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
            timeout: cfg.timeout_secs,
            max_tokens: cfg.max_tokens,
            temperature_bits: cfg.temperature.map(f32::to_bits),
            top_p_bits: cfg.top_p.map(f32::to_bits),
        }
    }
}
