use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use contextor::ContextorError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Llm(#[from] ai_llm_service::error_handler::AiLlmError),

    #[error(transparent)]
    Index(#[from] rag_store::RagError),

    #[error(transparent)]
    Catalog(#[from] catalog::CatalogError),

    // --- IO / server ---
    #[error("failed to bind listener on {addr}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request ---
    #[error("{0}")]
    BadRequest(String),

    /// Failure after the request was accepted; `message` is what the client sees.
    #[error("{message}")]
    Internal { message: &'static str },
}

impl AppError {
    /// Maps a pipeline error to a response. Client mistakes keep their
    /// message; everything else is logged and replaced by `generic`.
    pub fn from_contextor(err: ContextorError, generic: &'static str) -> Self {
        match err {
            ContextorError::BadRequest(msg) => AppError::BadRequest(msg),
            other => {
                error!(error = %other, "request failed");
                AppError::Internal { message: generic }
            }
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Malformed, mistyped or non-JSON bodies are all client errors.
impl From<JsonRejection> for AppError {
    fn from(err: JsonRejection) -> Self {
        AppError::BadRequest(err.body_text())
    }
}
