/*
 * Responsibility
 * - users テーブル: トークンの subject (JWT `sub`) を内部ユーザー ID に対応付ける
 */
use sqlx::PgPool;

use crate::repos::error::RepoError;

pub async fn find_id_by_subject(db: &PgPool, subject: &str) -> Result<Option<i64>, RepoError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT id
        FROM users
        WHERE subject = $1
        "#,
    )
    .bind(subject)
    .fetch_optional(db)
    .await?;

    Ok(id)
}
