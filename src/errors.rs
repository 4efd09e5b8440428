use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::cache::CacheError;
use crate::defillama::LlamaClientError;
use crate::firestore::FirestoreError;
use crate::insights::ListingError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An upstream call failed; `message` is what the dashboard sees.
    #[error("{message}: {source}")]
    Upstream {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn upstream(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        AppError::Upstream {
            message: message.into(),
            source: source.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Upstream { message, source } => {
                tracing::error!(error = %source, "{message}");
                (StatusCode::INTERNAL_SERVER_ERROR, message.clone())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".into())
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<LlamaClientError> for AppError {
    fn from(e: LlamaClientError) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<FirestoreError> for AppError {
    fn from(e: FirestoreError) -> Self {
        AppError::Internal(e.into())
    }
}

impl From<ListingError> for AppError {
    fn from(e: ListingError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<CacheError> for AppError {
    fn from(e: CacheError) -> Self {
        AppError::Internal(e.into())
    }
}
