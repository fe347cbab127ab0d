use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::database::StoreError;
use crate::query::QueryError;

/// Application-level error type for HTTP handlers.
///
/// Form validation failures and empty searches are not errors here: they are
/// ordinary pages and redirects carrying a message. Everything in this enum
/// ends the request with a JSON `{ "error", "code" }` body.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Media error: {0}")]
    Media(#[from] std::io::Error),

    #[error("Invalid or missing authorization header")]
    Unauthorized,
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn listing_not_found(id: impl ToString) -> Self {
        AppError::NotFound {
            entity: "Listing",
            id: id.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::Query(QueryError::InvalidSortKey(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_SORT_KEY", self.to_string())
            }
            AppError::Store(StoreError::UnknownCategory(_)) => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_CATEGORY", self.to_string())
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Media(err) => {
                tracing::error!(error = %err, "Media error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, Json(body)).into_response()
    }
}
