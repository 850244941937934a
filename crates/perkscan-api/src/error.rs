//! Error types for the perk API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use perkscan_store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("perk {0} not found")]
    PerkNotFound(i64),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::PerkNotFound(id) => {
                (StatusCode::NOT_FOUND, format!("Perk {} not found", id))
            }
            ApiError::Store(e) => {
                tracing::error!("store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
