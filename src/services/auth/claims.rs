use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims of a verified access token.
///
/// Registered claims used by the API are typed; everything else (custom
/// namespaced claims, `azp`, `iat`, ...) stays in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub iss: Option<String>,
    // string or array of strings; audience checks are done by jsonwebtoken
    #[serde(default)]
    pub aud: Value,
    #[serde(default)]
    pub exp: Option<u64>,
    /// Space-delimited permission list.
    #[serde(default)]
    pub scope: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DecodedClaims {
    /// Scope tokens, split on single spaces. Missing and empty scope both yield nothing.
    pub fn scopes(&self) -> Vec<&str> {
        match self.scope.as_deref() {
            None | Some("") => Vec::new(),
            Some(scope) => scope.split(' ').collect(),
        }
    }

    pub fn has_scope(&self, required: &str) -> bool {
        self.scopes().contains(&required)
    }
}
