use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::database::AppState;
use crate::error::AppError;

/// Middleware guarding the add, edit and delete routes
///
/// When the state carries an admin token, the request must send the same
/// value in its `Authorization` header. Without a configured token every
/// request passes.
pub async fn admin_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(expected) = state.admin_token.as_deref() {
        let provided = headers
            .get("Authorization")
            .and_then(|value| value.to_str().ok());

        if provided != Some(expected) {
            tracing::warn!(path = %request.uri().path(), "rejected write without valid admin token");
            return Err(AppError::Unauthorized);
        }
    }

    Ok(next.run(request).await)
}
