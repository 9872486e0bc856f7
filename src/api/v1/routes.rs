/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - Bearer が必要なルートグループと要求 scope をここで決める
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{
    courses::{get_course_lectures, list_course_lectures, list_courses},
    health::health,
};
use crate::middleware::auth::check_jwt;
use crate::state::AppState;

pub const READ_COURSES: &str = "read:courses";
pub const READ_LECTURES: &str = "read:lectures";

pub fn routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses));

    let catalog = check_jwt::apply(
        Router::new().route("/courses/lectures", get(list_course_lectures)),
        state,
        Some(READ_COURSES),
    );

    let enrolled = check_jwt::apply(
        Router::new().route("/courses/{name}/lectures", get(get_course_lectures)),
        state,
        Some(READ_LECTURES),
    );

    public.merge(catalog).merge(enrolled)
}
