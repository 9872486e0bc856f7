/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - check_jwt middleware が検証済み claims から組み立てて request extensions に格納する
 *
 * Notes
 * - トークン検証と scope チェックは services::auth / middleware の責務
 */
use crate::services::auth::DecodedClaims;

/// Context attached to requests that passed the authorization gate.
///
/// Holds the full decoded token; request-scoped, dropped with the request.
#[derive(Debug, Clone)]
pub struct AuthCtx {
    pub claims: DecodedClaims,
}

impl AuthCtx {
    pub fn from_claims(claims: DecodedClaims) -> Self {
        Self { claims }
    }

    /// Token `sub`, matched against `users.subject`. Blank counts as absent.
    pub fn subject(&self) -> Option<&str> {
        self.claims.sub.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_subject_counts_as_absent() {
        let ctx = AuthCtx::from_claims(DecodedClaims {
            sub: Some(String::new()),
            scope: Some("read:courses read:lectures".into()),
            ..Default::default()
        });
        assert!(ctx.subject().is_none());
        assert_eq!(ctx.claims.scopes(), vec!["read:courses", "read:lectures"]);
    }
}
