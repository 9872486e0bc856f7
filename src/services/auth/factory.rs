/// Factory: build the `AuthorizationGate` from the startup `TrustConfig`.
use std::sync::Arc;

use crate::services::auth::{AuthorizationGate, JwtVerifier, TrustConfig, jwks::JwksClient};

pub fn build_authorization_gate(trust: &TrustConfig) -> anyhow::Result<Arc<AuthorizationGate>> {
    // Key fetches share the verification budget
    let jwks = JwksClient::new(trust.jwks_cache_ttl, trust.verify_timeout)?
        .with_min_refetch_interval(trust.jwks_min_refetch_interval);
    let verifier = JwtVerifier::new(trust.clone(), jwks);

    Ok(Arc::new(AuthorizationGate::new(
        Arc::new(verifier),
        trust.verify_timeout,
    )))
}
