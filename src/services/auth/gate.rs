//! Request authorization: bearer token -> verified claims -> scope check.
//!
//! `authorize` is a plain async function over the request headers. It does not
//! log and keeps no state between calls; the HTTP wiring lives in
//! `middleware::auth::check_jwt`.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, header};

use super::claims::DecodedClaims;
use super::TokenVerifier;

pub const BEARER_TOKEN_MISSING: &str = "Bearer token missing";
pub const INSUFFICIENT_SCOPE: &str = "Insufficient scope";
pub const VERIFY_TIMED_OUT: &str = "Token verification timed out";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectKind {
    /// 401
    Unauthorized,
    /// 403
    InsufficientScope,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Proceed(DecodedClaims),
    Reject { kind: RejectKind, message: String },
}

impl Outcome {
    fn reject(kind: RejectKind, message: impl Into<String>) -> Self {
        Self::Reject {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Clone)]
pub struct AuthorizationGate {
    verifier: Arc<dyn TokenVerifier>,
    verify_timeout: Duration,
}

impl std::fmt::Debug for AuthorizationGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGate")
            .field("verify_timeout", &self.verify_timeout)
            .finish_non_exhaustive()
    }
}

impl AuthorizationGate {
    pub fn new(verifier: Arc<dyn TokenVerifier>, verify_timeout: Duration) -> Self {
        Self {
            verifier,
            verify_timeout,
        }
    }

    pub async fn authorize(&self, headers: &HeaderMap, required_scope: Option<&str>) -> Outcome {
        let Some(token) = bearer_token(headers) else {
            return Outcome::reject(RejectKind::Unauthorized, BEARER_TOKEN_MISSING);
        };

        let claims =
            match tokio::time::timeout(self.verify_timeout, self.verifier.verify(token)).await {
                Ok(Ok(claims)) => claims,
                Ok(Err(err)) => return Outcome::reject(RejectKind::Unauthorized, err.to_string()),
                Err(_) => return Outcome::reject(RejectKind::Unauthorized, VERIFY_TIMED_OUT),
            };

        if let Some(required) = required_scope
            && !claims.has_scope(required)
        {
            return Outcome::reject(RejectKind::InsufficientScope, INSUFFICIENT_SCOPE);
        }

        Outcome::Proceed(claims)
    }
}

/// `Authorization: Bearer <token>`; `None` when absent, another scheme, or blank.
/// The scheme name is matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
