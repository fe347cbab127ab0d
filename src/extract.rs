//! Request extractors that reject with [`AppError`] instead of axum's
//! plain-text rejections

use axum::extract::{FromRequestParts, Path, Query};
use axum::http::request::Parts;

use crate::error::AppError;
use crate::model::ListParams;

/// The `{id}` segment of a listing URL
///
/// Anything that is not a non-negative integer names no listing, so it is a
/// 404 rather than a malformed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingId(pub u64);

impl<S> FromRequestParts<S> for ListingId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        raw.parse()
            .map(ListingId)
            .map_err(|_| AppError::listing_not_found(raw))
    }
}

/// Query string of the browse page
#[derive(Debug, Default)]
pub struct ListQuery(pub ListParams);

impl<S> FromRequestParts<S> for ListQuery
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<ListParams>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
        Ok(ListQuery(params))
    }
}
