/*
 * Responsibility
 * - Course / Lecture の response DTO
 * - フラットな行からネストした course -> parts -> lessons -> lectures を組み立てる
 */
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::repos::course_repo::{CourseRow, CourseTree, LectureRow, LessonRow, PartRow};

/// `{"data": ...}` envelope shared by every course endpoint.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseResponse {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CourseRow> for CourseResponse {
    fn from(row: CourseRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            title: row.title,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseLecturesResponse {
    pub id: i64,
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub parts: Vec<PartResponse>,
}

#[derive(Debug, Serialize)]
pub struct PartResponse {
    pub id: i64,
    pub title: String,
    pub lessons: Vec<LessonResponse>,
}

#[derive(Debug, Serialize)]
pub struct LessonResponse {
    pub id: i64,
    pub title: String,
    pub lectures: Vec<LectureResponse>,
}

#[derive(Debug, Serialize)]
pub struct LectureResponse {
    pub id: i64,
    pub title: String,
    pub video_url: Option<String>,
    pub duration_seconds: Option<i32>,
}

/// Nest `tree` under `courses`. Child order follows the row order; rows whose
/// parent is not part of the input are dropped.
pub fn nest_courses(courses: Vec<CourseRow>, tree: CourseTree) -> Vec<CourseLecturesResponse> {
    let mut lectures_by_lesson = group_by(tree.lectures, |l: &LectureRow| l.lesson_id);
    let mut lessons_by_part = group_by(tree.lessons, |l: &LessonRow| l.part_id);
    let mut parts_by_course = group_by(tree.parts, |p: &PartRow| p.course_id);

    courses
        .into_iter()
        .map(|course| {
            let parts = parts_by_course
                .remove(&course.id)
                .unwrap_or_default()
                .into_iter()
                .map(|part| {
                    let lessons = lessons_by_part
                        .remove(&part.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|lesson| LessonResponse {
                            lectures: lectures_by_lesson
                                .remove(&lesson.id)
                                .unwrap_or_default()
                                .into_iter()
                                .map(LectureResponse::from)
                                .collect(),
                            id: lesson.id,
                            title: lesson.title,
                        })
                        .collect();

                    PartResponse {
                        id: part.id,
                        title: part.title,
                        lessons,
                    }
                })
                .collect();

            CourseLecturesResponse {
                id: course.id,
                name: course.name,
                title: course.title,
                description: course.description,
                parts,
            }
        })
        .collect()
}

impl From<LectureRow> for LectureResponse {
    fn from(row: LectureRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            video_url: row.video_url,
            duration_seconds: row.duration_seconds,
        }
    }
}

fn group_by<T>(rows: Vec<T>, key: impl Fn(&T) -> i64) -> HashMap<i64, Vec<T>> {
    let mut grouped: HashMap<i64, Vec<T>> = HashMap::new();
    for row in rows {
        grouped.entry(key(&row)).or_default().push(row);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(id: i64, name: &str) -> CourseRow {
        CourseRow {
            id,
            name: name.into(),
            title: name.to_uppercase(),
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn part(id: i64, course_id: i64) -> PartRow {
        PartRow {
            id,
            course_id,
            title: format!("part {id}"),
        }
    }

    fn lesson(id: i64, part_id: i64) -> LessonRow {
        LessonRow {
            id,
            part_id,
            title: format!("lesson {id}"),
        }
    }

    fn lecture(id: i64, lesson_id: i64) -> LectureRow {
        LectureRow {
            id,
            lesson_id,
            title: format!("lecture {id}"),
            video_url: Some(format!("https://videos.example.com/{id}")),
            duration_seconds: Some(300),
        }
    }

    #[test]
    fn nests_children_under_their_parents_in_row_order() {
        let tree = CourseTree {
            parts: vec![part(20, 1), part(10, 1), part(30, 2)],
            lessons: vec![lesson(100, 10), lesson(101, 20), lesson(102, 10)],
            lectures: vec![lecture(1000, 102), lecture(1001, 100), lecture(1002, 102)],
        };

        let nested = nest_courses(vec![course(1, "serverside"), course(2, "frontend")], tree);

        assert_eq!(nested.len(), 2);
        let serverside = &nested[0];
        assert_eq!(serverside.name, "serverside");
        assert_eq!(
            serverside.parts.iter().map(|p| p.id).collect::<Vec<_>>(),
            vec![20, 10]
        );

        let part_10 = &serverside.parts[1];
        assert_eq!(
            part_10.lessons.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![100, 102]
        );
        assert_eq!(
            part_10.lessons[1]
                .lectures
                .iter()
                .map(|l| l.id)
                .collect::<Vec<_>>(),
            vec![1000, 1002]
        );

        let frontend = &nested[1];
        assert_eq!(frontend.parts.len(), 1);
        assert!(frontend.parts[0].lessons.is_empty());
    }

    #[test]
    fn drops_orphans() {
        let tree = CourseTree {
            parts: vec![part(10, 99)],
            lessons: vec![lesson(100, 77)],
            lectures: vec![lecture(1000, 55)],
        };

        let nested = nest_courses(vec![course(1, "serverside")], tree);
        assert!(nested[0].parts.is_empty());
    }

    #[test]
    fn data_envelope_serializes_under_data_key() {
        let body = serde_json::to_value(Data::new(vec![LectureResponse::from(lecture(7, 1))]))
            .unwrap();
        assert_eq!(body["data"][0]["id"], 7);
        assert_eq!(body["data"][0]["duration_seconds"], 300);
    }
}
