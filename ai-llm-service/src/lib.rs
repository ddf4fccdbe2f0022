//! Shared LLM access for the eSIM assistant: OpenAI/Ollama clients,
//! environment-driven profiles, health probes and a library-scoped log layer.

pub mod config;
pub mod error_handler;
pub mod health_service;
pub mod service_profiles;
pub mod services;
pub mod telemetry;
pub mod types;
