/*
 * Responsibility
 * - /courses 系 handler: コース一覧とネストした講義ツリー
 * - /courses/{name}/lectures は呼び出し元がそのコースを受講していることも確認する
 */
use axum::{
    Json,
    extract::{Path, State},
};
use sqlx::PgPool;

use crate::{
    api::v1::{
        dto::courses::{CourseLecturesResponse, CourseResponse, Data, nest_courses},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::{
        course_repo::{self, CourseRow},
        taking_course_repo, user_repo,
    },
    state::AppState,
};

const MAX_COURSE_NAME_LEN: usize = 64;

pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Data<Vec<CourseResponse>>>, AppError> {
    let rows = course_repo::list(&state.db).await?;
    let res = rows.into_iter().map(CourseResponse::from).collect();

    Ok(Json(Data::new(res)))
}

pub async fn list_course_lectures(
    State(state): State<AppState>,
) -> Result<Json<Data<Vec<CourseLecturesResponse>>>, AppError> {
    let courses = course_repo::list(&state.db).await?;
    let ids: Vec<i64> = courses.iter().map(|c| c.id).collect();
    let tree = course_repo::load_tree(&state.db, &ids).await?;

    Ok(Json(Data::new(nest_courses(courses, tree))))
}

pub async fn get_course_lectures(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Path(name): Path<String>,
) -> Result<Json<Data<CourseLecturesResponse>>, AppError> {
    validate_course_name(&name)?;

    let course = require_course(course_repo::find_by_name(&state.db, &name).await?)?;

    let enrollment = lookup_enrollment(&state.db, ctx.subject(), course.id).await?;
    if let Err(err) = enrollment.require_taking() {
        tracing::debug!(course = %course.name, ?enrollment, "not taking course");
        return Err(err);
    }

    let tree = course_repo::load_tree(&state.db, &[course.id]).await?;
    let course = nest_courses(vec![course], tree)
        .pop()
        .ok_or(AppError::Internal)?;

    Ok(Json(Data::new(course)))
}

/// What the enrollment lookup found for the caller of `/courses/{name}/lectures`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Enrollment {
    NoSubject,
    UnknownUser,
    NotTaking,
    Taking,
}

impl Enrollment {
    /// Unknown subject and missing enrollment look the same to the caller.
    fn require_taking(self) -> Result<(), AppError> {
        match self {
            Enrollment::Taking => Ok(()),
            Enrollment::NoSubject | Enrollment::UnknownUser | Enrollment::NotTaking => {
                Err(AppError::not_found("Taking course not found"))
            }
        }
    }
}

fn require_course(course: Option<CourseRow>) -> Result<CourseRow, AppError> {
    course.ok_or(AppError::not_found("Course not found"))
}

async fn lookup_enrollment(
    db: &PgPool,
    subject: Option<&str>,
    course_id: i64,
) -> Result<Enrollment, AppError> {
    let Some(subject) = subject else {
        return Ok(Enrollment::NoSubject);
    };
    let Some(user_id) = user_repo::find_id_by_subject(db, subject).await? else {
        return Ok(Enrollment::UnknownUser);
    };

    if taking_course_repo::exists(db, user_id, course_id).await? {
        Ok(Enrollment::Taking)
    } else {
        Ok(Enrollment::NotTaking)
    }
}

/// Course names are URL slugs: `[a-z0-9_-]`, 1..=64 chars.
fn validate_course_name(name: &str) -> Result<(), AppError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_COURSE_NAME_LEN
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(AppError::bad_request("INVALID_COURSE_NAME", "invalid course name"))
    }
}
