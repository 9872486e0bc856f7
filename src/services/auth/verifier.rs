use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use super::claims::DecodedClaims;
use super::jwks::JwksClient;
use super::trust::TrustConfig;

/// Why a token was not accepted. `Display` is what the client sees.
#[derive(Debug, Clone, Error)]
pub enum VerifyError {
    #[error("Malformed token")]
    Malformed,
    #[error("Signature algorithm of {0:?} is not supported")]
    UnsupportedAlgorithm(Algorithm),
    #[error("Client secret is required for {0:?} tokens")]
    MissingSecret(Algorithm),
    #[error("Token key id (kid) missing")]
    MissingKeyId,
    #[error("Signing key {0} not found")]
    UnknownKey(String),
    #[error("Could not fetch signing keys: {0}")]
    KeyFetch(String),
    #[error("Signature verification failed")]
    InvalidSignature,
    #[error("Expired token")]
    Expired,
    #[error("Token is not yet valid")]
    NotYetValid,
    #[error("Invalid token issuer")]
    InvalidIssuer,
    #[error("Invalid token audience")]
    InvalidAudience,
    #[error("Missing required claim: {0}")]
    MissingClaim(String),
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            ErrorKind::InvalidAudience => Self::InvalidAudience,
            ErrorKind::MissingRequiredClaim(name) => Self::MissingClaim(name.clone()),
            _ => Self::Malformed,
        }
    }
}

/// Boundary to the token verification library.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<DecodedClaims, VerifyError>;
}

/// Only `iss` is read before the signature is checked.
#[derive(Deserialize)]
struct UnverifiedIssuer {
    #[serde(default)]
    iss: Option<String>,
}

/// jsonwebtoken-backed verifier: HS* via client secret, asymmetric algs via the issuer's JWKS.
pub struct JwtVerifier {
    trust: TrustConfig,
    jwks: JwksClient,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("trust", &self.trust)
            .finish()
    }
}

impl JwtVerifier {
    pub fn new(trust: TrustConfig, jwks: JwksClient) -> Self {
        Self { trust, jwks }
    }

    fn validation(&self, alg: Algorithm) -> Validation {
        let mut validation = Validation::new(alg);
        validation.set_issuer(self.trust.authorized_issuers.as_slice());
        validation.set_audience(&[&self.trust.api_identifier]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = self.trust.leeway_seconds;
        validation
    }

    async fn decoding_key(
        &self,
        token: &str,
        alg: Algorithm,
        kid: Option<&str>,
    ) -> Result<DecodingKey, VerifyError> {
        if is_hmac(alg) {
            let secret = self
                .trust
                .client_secret
                .as_deref()
                .ok_or(VerifyError::MissingSecret(alg))?;
            return Ok(DecodingKey::from_secret(secret.as_bytes()));
        }

        // Check the issuer before touching the network
        let unverified = jsonwebtoken::dangerous::insecure_decode::<UnverifiedIssuer>(token)
            .map_err(|_| VerifyError::Malformed)?;
        let issuer = unverified
            .claims
            .iss
            .filter(|iss| self.trust.is_authorized_issuer(iss))
            .ok_or(VerifyError::InvalidIssuer)?;

        let kid = kid.ok_or(VerifyError::MissingKeyId)?;
        self.jwks.decoding_key(&issuer, kid).await
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<DecodedClaims, VerifyError> {
        let header = jsonwebtoken::decode_header(token).map_err(|_| VerifyError::Malformed)?;

        if !self.trust.supports(header.alg) {
            return Err(VerifyError::UnsupportedAlgorithm(header.alg));
        }

        let key = self
            .decoding_key(token, header.alg, header.kid.as_deref())
            .await?;

        let data =
            jsonwebtoken::decode::<DecodedClaims>(token, &key, &self.validation(header.alg))?;
        Ok(data.claims)
    }
}

fn is_hmac(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use base64::Engine as _;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::{Value, json};

    use super::*;
    use crate::services::auth::jwks::tests::{JwksServer, client as jwks_client, sign_rs256};

    pub(crate) const ISSUER: &str = "https://tenant.auth0.com/";
    pub(crate) const AUDIENCE: &str = "https://api.courses.example.com";
    pub(crate) const SECRET: &str = "test-client-secret-0123456789abcdef";

    pub(crate) fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    pub(crate) fn claims(scope: Option<&str>) -> Value {
        let mut claims = json!({
            "iss": ISSUER,
            "aud": AUDIENCE,
            "sub": "auth0|student-1",
            "iat": now(),
            "exp": now() + 600,
        });
        if let Some(scope) = scope {
            claims["scope"] = json!(scope);
        }
        claims
    }

    pub(crate) fn sign_with(alg: Algorithm, secret: &str, claims: &Value) -> String {
        jsonwebtoken::encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    pub(crate) fn sign(claims: &Value) -> String {
        sign_with(Algorithm::HS256, SECRET, claims)
    }

    pub(crate) fn trust() -> TrustConfig {
        TrustConfig::new(vec![ISSUER.to_string()], AUDIENCE, vec![Algorithm::HS256])
            .with_client_secret(SECRET)
    }

    pub(crate) fn verifier_with(trust: TrustConfig) -> JwtVerifier {
        let jwks = JwksClient::new(Duration::from_secs(60), Duration::from_secs(1)).unwrap();
        JwtVerifier::new(trust, jwks)
    }

    fn message(result: Result<DecodedClaims, VerifyError>) -> String {
        result.unwrap_err().to_string()
    }

    #[tokio::test]
    async fn accepts_well_formed_token() {
        let token = sign(&claims(Some("read:courses")));
        let decoded = verifier_with(trust()).verify(&token).await.unwrap();

        assert_eq!(decoded.sub.as_deref(), Some("auth0|student-1"));
        assert_eq!(decoded.iss.as_deref(), Some(ISSUER));
        assert_eq!(decoded.scope.as_deref(), Some("read:courses"));
        assert!(decoded.extra.get("iat").is_some());
    }

    #[tokio::test]
    async fn rejects_wrong_signature() {
        let token = sign_with(Algorithm::HS256, "another-secret-entirely", &claims(None));
        assert_eq!(
            message(verifier_with(trust()).verify(&token).await),
            "Signature verification failed"
        );
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let mut expired = claims(None);
        expired["exp"] = json!(now() - 3600);
        let token = sign(&expired);
        assert_eq!(message(verifier_with(trust()).verify(&token).await), "Expired token");
    }

    #[tokio::test]
    async fn rejects_wrong_issuer() {
        let mut foreign = claims(None);
        foreign["iss"] = json!("https://other.auth0.com/");
        let token = sign(&foreign);
        assert_eq!(
            message(verifier_with(trust()).verify(&token).await),
            "Invalid token issuer"
        );
    }

    #[tokio::test]
    async fn rejects_wrong_audience() {
        let mut foreign = claims(None);
        foreign["aud"] = json!("https://another-api.example.com");
        let token = sign(&foreign);
        assert_eq!(
            message(verifier_with(trust()).verify(&token).await),
            "Invalid token audience"
        );
    }

    #[tokio::test]
    async fn rejects_token_without_exp() {
        let mut no_exp = claims(None);
        no_exp.as_object_mut().unwrap().remove("exp");
        let token = sign(&no_exp);
        assert_eq!(
            message(verifier_with(trust()).verify(&token).await),
            "Missing required claim: exp"
        );
    }

    #[tokio::test]
    async fn rejects_algorithm_outside_allow_list() {
        let token = sign_with(Algorithm::HS384, SECRET, &claims(None));
        assert_eq!(
            message(verifier_with(trust()).verify(&token).await),
            "Signature algorithm of HS384 is not supported"
        );
    }

    #[tokio::test]
    async fn rejects_hmac_without_client_secret() {
        let mut trust = trust();
        trust.client_secret = None;
        let token = sign(&claims(None));
        assert_eq!(
            message(verifier_with(trust).verify(&token).await),
            "Client secret is required for HS256 tokens"
        );
    }

    #[tokio::test]
    async fn rejects_garbage() {
        assert_eq!(
            message(verifier_with(trust()).verify("not-a-jwt").await),
            "Malformed token"
        );
    }

    #[tokio::test]
    async fn asymmetric_token_from_unknown_issuer_fails_before_key_fetch() {
        // Header claims RS256; the signature is never checked because the
        // issuer is rejected first, so no JWKS request is made.
        let header = r#"{"alg":"RS256","typ":"JWT","kid":"k1"}"#;
        let payload = r#"{"iss":"http://127.0.0.1:1/","aud":"x","exp":9999999999}"#;
        let token = format!(
            "{}.{}.c2lnbmF0dXJl",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );

        let trust = TrustConfig::new(vec![ISSUER.to_string()], AUDIENCE, vec![Algorithm::RS256]);
        assert_eq!(
            message(verifier_with(trust).verify(&token).await),
            "Invalid token issuer"
        );
    }

    fn rs256_verifier(issuer: &str, min_refetch_interval: Duration) -> JwtVerifier {
        let trust = TrustConfig::new(vec![issuer.to_string()], AUDIENCE, vec![Algorithm::RS256]);
        JwtVerifier::new(trust, jwks_client(min_refetch_interval))
    }

    fn issued_by(issuer: &str, sub: &str) -> Value {
        let mut claims = claims(Some("read:lectures"));
        claims["iss"] = json!(issuer);
        claims["sub"] = json!(sub);
        claims
    }

    #[tokio::test]
    async fn accepts_rs256_token_and_reuses_cached_keys() {
        let server = JwksServer::start(&["k1"]).await;
        let verifier = rs256_verifier(&server.issuer, Duration::from_secs(60));
        let token = sign_rs256(Some("k1"), &issued_by(&server.issuer, "auth0|student-1"));

        for _ in 0..2 {
            let decoded = verifier.verify(&token).await.unwrap();
            assert_eq!(decoded.sub.as_deref(), Some("auth0|student-1"));
            assert!(decoded.has_scope("read:lectures"));
        }
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn rs256_rotated_key_is_fetched() {
        let server = JwksServer::start(&["k1"]).await;
        let verifier = rs256_verifier(&server.issuer, Duration::ZERO);
        let claims = issued_by(&server.issuer, "auth0|student-1");

        verifier.verify(&sign_rs256(Some("k1"), &claims)).await.unwrap();
        server.publish(&["k2"]);
        verifier.verify(&sign_rs256(Some("k2"), &claims)).await.unwrap();

        assert_eq!(server.hits(), 2);
    }

    #[tokio::test]
    async fn rs256_unknown_kid_is_rejected() {
        let server = JwksServer::start(&["k1"]).await;
        let verifier = rs256_verifier(&server.issuer, Duration::from_secs(60));
        let claims = issued_by(&server.issuer, "auth0|student-1");

        verifier.verify(&sign_rs256(Some("k1"), &claims)).await.unwrap();
        assert_eq!(
            message(verifier.verify(&sign_rs256(Some("ghost"), &claims)).await),
            "Signing key ghost not found"
        );
        assert_eq!(server.hits(), 1);
    }

    #[tokio::test]
    async fn rs256_without_kid_is_rejected_before_fetch() {
        let server = JwksServer::start(&["k1"]).await;
        let verifier = rs256_verifier(&server.issuer, Duration::from_secs(60));
        let token = sign_rs256(None, &issued_by(&server.issuer, "auth0|student-1"));

        assert_eq!(
            message(verifier.verify(&token).await),
            "Token key id (kid) missing"
        );
        assert_eq!(server.hits(), 0);
    }

    #[tokio::test]
    async fn rs256_tampered_payload_fails_signature_check() {
        let server = JwksServer::start(&["k1"]).await;
        let verifier = rs256_verifier(&server.issuer, Duration::from_secs(60));

        let genuine = sign_rs256(Some("k1"), &issued_by(&server.issuer, "auth0|student-1"));
        let forged = sign_rs256(Some("k1"), &issued_by(&server.issuer, "auth0|admin"));
        let genuine: Vec<&str> = genuine.split('.').collect();
        let forged: Vec<&str> = forged.split('.').collect();
        let spliced = format!("{}.{}.{}", genuine[0], forged[1], genuine[2]);

        assert_eq!(
            message(verifier.verify(&spliced).await),
            "Signature verification failed"
        );
    }
}
