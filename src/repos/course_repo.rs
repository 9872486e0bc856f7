/*
 * Responsibility
 * - コースカタログの読み取り: courses -> parts -> lessons -> lectures
 * - 子要素は親 ID の集合ごとに階層単位で取得 (N+1 なし)
 * - 並び順はここで固定: (position, id)
 */
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoError;

#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PartRow {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct LessonRow {
    pub id: i64,
    pub part_id: i64,
    pub title: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct LectureRow {
    pub id: i64,
    pub lesson_id: i64,
    pub title: String,
    pub video_url: Option<String>,
    pub duration_seconds: Option<i32>,
}

/// Everything below a set of courses, one query per level.
#[derive(Debug, Default)]
pub struct CourseTree {
    pub parts: Vec<PartRow>,
    pub lessons: Vec<LessonRow>,
    pub lectures: Vec<LectureRow>,
}

pub async fn list(db: &PgPool) -> Result<Vec<CourseRow>, RepoError> {
    let rows = sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT id, name, title, description, created_at, updated_at
        FROM courses
        ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(rows)
}

pub async fn find_by_name(db: &PgPool, name: &str) -> Result<Option<CourseRow>, RepoError> {
    let row = sqlx::query_as::<_, CourseRow>(
        r#"
        SELECT id, name, title, description, created_at, updated_at
        FROM courses
        WHERE name = $1
        "#,
    )
    .bind(name)
    .fetch_optional(db)
    .await?;

    Ok(row)
}

pub async fn load_tree(db: &PgPool, course_ids: &[i64]) -> Result<CourseTree, RepoError> {
    if course_ids.is_empty() {
        return Ok(CourseTree::default());
    }

    let parts = sqlx::query_as::<_, PartRow>(
        r#"
        SELECT id, course_id, title
        FROM parts
        WHERE course_id = ANY($1)
        ORDER BY position, id
        "#,
    )
    .bind(course_ids)
    .fetch_all(db)
    .await?;

    let part_ids: Vec<i64> = parts.iter().map(|p| p.id).collect();
    let lessons = sqlx::query_as::<_, LessonRow>(
        r#"
        SELECT id, part_id, title
        FROM lessons
        WHERE part_id = ANY($1)
        ORDER BY position, id
        "#,
    )
    .bind(&part_ids)
    .fetch_all(db)
    .await?;

    let lesson_ids: Vec<i64> = lessons.iter().map(|l| l.id).collect();
    let lectures = sqlx::query_as::<_, LectureRow>(
        r#"
        SELECT id, lesson_id, title, video_url, duration_seconds
        FROM lectures
        WHERE lesson_id = ANY($1)
        ORDER BY position, id
        "#,
    )
    .bind(&lesson_ids)
    .fetch_all(db)
    .await?;

    Ok(CourseTree {
        parts,
        lessons,
        lectures,
    })
}
