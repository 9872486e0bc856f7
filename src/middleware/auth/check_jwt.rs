//! Bearer JWT check → AuthCtx in request extensions
//!
//! Each route group declares, at registration time, the scope it needs (or
//! none). The decision itself is `AuthorizationGate::authorize`; this module
//! only adapts it to axum and logs rejections.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthorizationGate, Outcome, RejectKind};
use crate::state::AppState;

#[derive(Clone)]
struct JwtGuard {
    gate: Arc<AuthorizationGate>,
    required_scope: Option<&'static str>,
}

/// Require a valid bearer token (and `required_scope`, if given) on every route of `router`.
///
/// ```ignore
/// let lectures = Router::new().route("/courses/lectures", get(list_course_lectures));
/// let lectures = check_jwt::apply(lectures, &state, Some("read:courses"));
/// ```
pub fn apply(
    router: Router<AppState>,
    state: &AppState,
    required_scope: Option<&'static str>,
) -> Router<AppState> {
    let guard = JwtGuard {
        gate: state.gate.clone(),
        required_scope,
    };
    // route_layer: unmatched paths stay 404 instead of turning into 401
    router.route_layer(middleware::from_fn_with_state(guard, check_jwt))
}

async fn check_jwt(
    State(guard): State<JwtGuard>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    match guard.gate.authorize(req.headers(), guard.required_scope).await {
        Outcome::Proceed(claims) => {
            req.extensions_mut().insert(AuthCtx::from_claims(claims));
            Ok(next.run(req).await)
        }
        Outcome::Reject { kind, message } => {
            match kind {
                RejectKind::Unauthorized => {
                    tracing::warn!(reason = %message, "access token rejected")
                }
                RejectKind::InsufficientScope => tracing::info!(
                    required_scope = guard.required_scope,
                    "insufficient scope"
                ),
            }
            Err(AppError::rejected(kind, message))
        }
    }
}
