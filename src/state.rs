/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, gate: AuthorizationGate
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::AuthorizationGate;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub gate: Arc<AuthorizationGate>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, gate: Arc<AuthorizationGate>) -> Self {
        Self { db, gate }
    }
}
