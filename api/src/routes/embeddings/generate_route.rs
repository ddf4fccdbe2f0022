//! POST /api/embeddings/generate: (re)indexes the whole catalog.

use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Serialize;

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

pub const GENERATED: &str = "Embeddings generated and stored successfully!";
pub const GENERATE_FAILED: &str = "Failed to generate embeddings";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub message: &'static str,
    pub indexed: u64,
    pub batches: u64,
    pub skipped: u64,
    pub duration_ms: u64,
}

/// Runs synchronously: the response is sent once every batch is stored.
pub async fn generate_embeddings(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<GenerateResponse>> {
    let stats = state
        .indexer
        .run()
        .await
        .map_err(|e| AppError::from_contextor(e, GENERATE_FAILED))?;

    Ok(Json(GenerateResponse {
        message: GENERATED,
        indexed: stats.indexed,
        batches: stats.batches,
        skipped: stats.skipped,
        duration_ms: stats.duration_ms,
    }))
}
