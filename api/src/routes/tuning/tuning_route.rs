//! POST /api/tuning: asks the fine-tuned model directly.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use contextor::{TuningRequest, TuningResponse};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

pub const TUNING_FAILED: &str = "Something went wrong while processing your request.";

pub async fn tuning(
    State(state): State<Arc<AppState>>,
    body: Result<Json<TuningRequest>, JsonRejection>,
) -> AppResult<Json<TuningResponse>> {
    let Json(req) = body?;
    let resp = state
        .tuning
        .ask(&req.prompt)
        .await
        .map_err(|e| AppError::from_contextor(e, TUNING_FAILED))?;
    Ok(Json(resp))
}
