//! Default LLM configs loaded strictly from environment variables.
//!
//! This module builds the three named profiles used by the application:
//!
//! - **search**     → general chat model for the product search path
//!   (provider-default sampling)
//! - **fine_tuned** → fine-tuned chat model, near-deterministic sampling
//!   (`temperature = 0.0`, `top_p = 0.1`, `max_tokens = 150`)
//! - **embedding**  → embedding generator for queries and catalog records
//!
//! The two chat profiles are intentionally kept apart: they carry different
//! sampling parameters and must not be merged.
//!
//! # Environment variables
//!
//! Common:
//! - `LLM_KIND`          = provider kind (`openai` default, or `ollama`)
//! - `LLM_TIMEOUT_SECS`  = HTTP timeout for chat calls (default 60)
//! - `SEARCH_MODEL`      = search chat model (default `gpt-3.5-turbo` for OpenAI)
//! - `FINE_TUNED_MODEL`  = fine-tuned chat model (falls back to `SEARCH_MODEL`)
//! - `EMBEDDING_MODEL`   = embedding model (default `text-embedding-ada-002` for OpenAI)
//!
//! OpenAI-specific:
//! - `OPENAI_API_KEY` (mandatory)
//! - `OPENAI_URL` (default `https://api.openai.com`)
//!
//! Ollama-specific:
//! - `OLLAMA_URL` or `OLLAMA_PORT` (mandatory)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{AiLlmError, ConfigError, env_opt},
};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";
pub const DEFAULT_SEARCH_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";

/// Sampling for the fine-tuned path.
pub const FINE_TUNED_MAX_TOKENS: u32 = 150;
pub const FINE_TUNED_TEMPERATURE: f32 = 0.0;
pub const FINE_TUNED_TOP_P: f32 = 0.1;

const DEFAULT_CHAT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_EMBEDDING_TIMEOUT_SECS: u64 = 30;

/// The three profiles resolved from the environment.
#[derive(Debug, Clone)]
pub struct ProfileConfigs {
    pub search: LlmModelConfig,
    pub fine_tuned: LlmModelConfig,
    pub embedding: LlmModelConfig,
}

/// Resolves all profiles from process environment.
///
/// # Errors
/// See [`profiles_from_lookup`].
pub fn profiles_from_env() -> Result<ProfileConfigs, AiLlmError> {
    profiles_from_lookup(env_opt)
}

/// Resolves all profiles from an arbitrary key lookup.
///
/// `get` must return `None` for unset or blank keys.
///
/// # Errors
///
/// - [`ConfigError::UnsupportedProvider`] for an unknown `LLM_KIND`
/// - [`ConfigError::MissingVar`] for missing mandatory keys
/// - [`ConfigError::InvalidNumber`] for unparsable timeouts/ports
/// - any validation error from [`LlmModelConfig::validate`]
pub fn profiles_from_lookup<F>(get: F) -> Result<ProfileConfigs, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = match get("LLM_KIND") {
        Some(kind) => kind.parse::<LlmProvider>()?,
        None => LlmProvider::OpenAI,
    };

    let (endpoint, api_key) = match provider {
        LlmProvider::OpenAI => {
            let key = get("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?;
            let url = get("OPENAI_URL").unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string());
            (url, Some(key))
        }
        LlmProvider::Ollama => (ollama_endpoint(&get)?, None),
    };

    let search_model = match (get("SEARCH_MODEL"), provider) {
        (Some(m), _) => m,
        (None, LlmProvider::OpenAI) => DEFAULT_SEARCH_MODEL.to_string(),
        (None, LlmProvider::Ollama) => return Err(ConfigError::MissingVar("SEARCH_MODEL").into()),
    };
    let fine_tuned_model = get("FINE_TUNED_MODEL").unwrap_or_else(|| search_model.clone());
    let embedding_model = match (get("EMBEDDING_MODEL"), provider) {
        (Some(m), _) => m,
        (None, LlmProvider::OpenAI) => DEFAULT_EMBEDDING_MODEL.to_string(),
        (None, LlmProvider::Ollama) => {
            return Err(ConfigError::MissingVar("EMBEDDING_MODEL").into());
        }
    };

    let chat_timeout = parse_u64(&get, "LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CHAT_TIMEOUT_SECS);

    let search = LlmModelConfig {
        provider,
        model: search_model,
        endpoint: endpoint.clone(),
        api_key: api_key.clone(),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(chat_timeout),
    };

    let fine_tuned = LlmModelConfig {
        provider,
        model: fine_tuned_model,
        endpoint: endpoint.clone(),
        api_key: api_key.clone(),
        max_tokens: Some(FINE_TUNED_MAX_TOKENS),
        temperature: Some(FINE_TUNED_TEMPERATURE),
        top_p: Some(FINE_TUNED_TOP_P),
        timeout_secs: Some(chat_timeout),
    };

    let embedding = LlmModelConfig {
        provider,
        model: embedding_model,
        endpoint,
        api_key,
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(DEFAULT_EMBEDDING_TIMEOUT_SECS),
    };

    search.validate()?;
    fine_tuned.validate()?;
    embedding.validate()?;

    Ok(ProfileConfigs {
        search,
        fine_tuned,
        embedding,
    })
}

/// Resolves the Ollama endpoint.
///
/// Precedence:
/// 1. `OLLAMA_URL` if present and non-empty
/// 2. `OLLAMA_PORT` → `http://localhost:{port}`
fn ollama_endpoint<F>(get: &F) -> Result<String, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = get("OLLAMA_URL") {
        return Ok(url);
    }
    if let Some(port) = get("OLLAMA_PORT") {
        port.trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidNumber {
                var: "OLLAMA_PORT",
                reason: "expected u16 (1..=65535)",
            })?;
        return Ok(format!("http://localhost:{}", port.trim()));
    }
    Err(ConfigError::MissingVar("OLLAMA_URL or OLLAMA_PORT").into())
}

fn parse_u64<F>(get: &F, var: &'static str) -> Result<Option<u64>, AiLlmError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(v) => v.trim().parse::<u64>().map(Some).map_err(|_| {
            ConfigError::InvalidNumber {
                var,
                reason: "expected u64",
            }
            .into()
        }),
        None => Ok(None),
    }
}
