/*
 * Responsibility
 * - 受講 (taking_courses) の存在確認
 */
use sqlx::PgPool;

use crate::repos::error::RepoError;

pub async fn exists(db: &PgPool, user_id: i64, course_id: i64) -> Result<bool, RepoError> {
    let exists = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM taking_courses
            WHERE user_id = $1 AND course_id = $2
        )
        "#,
    )
    .bind(user_id)
    .bind(course_id)
    .fetch_one(db)
    .await?;

    Ok(exists)
}
