pub mod claims;
pub mod factory;
pub mod gate;
pub mod jwks;
pub mod trust;
pub mod verifier;

pub use claims::DecodedClaims;
pub use factory::build_authorization_gate;
pub use gate::{AuthorizationGate, Outcome, RejectKind};
pub use trust::TrustConfig;
pub use verifier::{JwtVerifier, TokenVerifier};
