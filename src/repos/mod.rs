pub mod course_repo;
pub mod error;
pub mod taking_course_repo;
pub mod user_repo;
