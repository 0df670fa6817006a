//! API error type

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::json;
use thiserror::Error;

use crate::core::model::ValidateError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidateError),
    #[error("player '{0}' has already voted")]
    DuplicateVote(String),
    #[error("{0}")]
    NotFound(String),
    #[error("internal error")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Validation(_) | ApiError::DuplicateVote(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if let ApiError::Store(e) = &self {
            tracing::error!("store failure: {}", e);
        }

        (
            status,
            Json(json!({
                "success": false,
                "message": self.to_string()
            })),
        )
            .into_response()
    }
}
