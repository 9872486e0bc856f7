use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::services::auth::gate::BEARER_TOKEN_MISSING;
use crate::state::AppState;

use super::AuthCtx;

/// Extractor handing `AuthCtx` to handlers.
/// Requires check_jwt on the route; without it the request is rejected with 401.
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .map(AuthCtxExtractor)
            .ok_or_else(|| AppError::Unauthorized(BEARER_TOKEN_MISSING.to_string()))
    }
}
