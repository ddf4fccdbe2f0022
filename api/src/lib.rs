use std::{env, sync::Arc};

mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

pub use crate::core::app_state::AppState;
pub use crate::error_handler::AppError;
use crate::routes::{
    embeddings::generate_route::generate_embeddings, health_route::health,
    search::search_route::search, tuning::tuning_route::tuning,
};

const DEFAULT_ADDRESS: &str = "0.0.0.0:3000";

/// Builds the HTTP router over shared state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(search))
        .route("/api/tuning", post(tuning))
        .route("/api/embeddings/generate", post(generate_embeddings))
        .route("/health", get(health))
        .with_state(Arc::new(state))
}

/// Serves the API on `API_ADDRESS` until Ctrl+C.
pub async fn start(state: AppState) -> Result<(), AppError> {
    let addr = env::var("API_ADDRESS").unwrap_or_else(|_| DEFAULT_ADDRESS.to_string());

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| AppError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(%addr, "listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        // Without a signal handler the server runs until killed.
        error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
