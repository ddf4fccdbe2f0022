//! GET /health: provider probes and catalog size.

use std::sync::Arc;

use ai_llm_service::health_service::HealthStatus;
use axum::{Json, extract::State};
use serde::Serialize;

use crate::core::app_state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `"ok"` when every probed provider answered, `"degraded"` otherwise.
    pub status: &'static str,
    pub catalog_records: usize,
    pub providers: Vec<HealthStatus>,
}

/// Always 200; provider failures show up as `ok: false` entries.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let providers = match &state.llm {
        Some(llm) => llm.health_all().await,
        None => Vec::new(),
    };
    let status = if providers.iter().all(|p| p.ok) {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        catalog_records: state.catalog.len(),
        providers,
    })
}
