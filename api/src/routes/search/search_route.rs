//! POST /api/search: answers a product query with retrieval context.

use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use contextor::{SearchRequest, SearchResponse};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
};

pub const SEARCH_FAILED: &str = "Something went wrong during the search.";

/// Handler: POST /api/search
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:3000/api/search \
///   -H 'content-type: application/json' \
///   -d '{"userId":"u1","query":"eSIM for Japan, 5GB","prvMessages":[]}'
/// ```
pub async fn search(
    State(state): State<Arc<AppState>>,
    body: Result<Json<SearchRequest>, JsonRejection>,
) -> AppResult<Json<SearchResponse>> {
    let Json(req) = body?;
    let resp = state
        .pipeline
        .run(req)
        .await
        .map_err(|e| AppError::from_contextor(e, SEARCH_FAILED))?;
    Ok(Json(resp))
}
