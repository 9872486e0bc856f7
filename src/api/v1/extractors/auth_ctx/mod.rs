/*!
 * Authentication context extractor
 *
 * Responsibility:
 * - Hand the verified caller (AuthCtx) to handlers
 * - axum glue lives in core, the type itself in types
 */

mod core;
mod types;

pub use core::AuthCtxExtractor;
pub use types::AuthCtx;
