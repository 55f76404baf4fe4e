//! Read-side helpers the pages use to render lists.
//!
//! References from teachers and files to courses are weak. A course id that no
//! longer resolves renders as [`UNKNOWN_LABEL`] instead of failing.

use std::collections::HashMap;

use crate::models::{Course, CourseFile};

pub const UNKNOWN_LABEL: &str = "Unknown";

/// `"CS101 - Intro"`.
pub fn course_label(course: &Course) -> String {
    format!("{} - {}", course.code, course.name)
}

pub fn course_label_by_id(courses: &[Course], id: &str) -> String {
    courses
        .iter()
        .find(|course| course.id == id)
        .map(course_label)
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

/// Label per course id, for rendering many rows at once.
pub fn course_labels(courses: &[Course]) -> HashMap<&str, String> {
    courses
        .iter()
        .map(|course| (course.id.as_str(), course_label(course)))
        .collect()
}

/// Joined labels for a teacher's course list, unresolved ids as "Unknown".
pub fn course_list_label(courses: &[Course], ids: &[String]) -> String {
    let labels = course_labels(courses);
    ids.iter()
        .map(|id| {
            labels
                .get(id.as_str())
                .cloned()
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Case-insensitive substring match on code or name. A blank query keeps all.
pub fn search_courses<'a>(courses: &'a [Course], query: &str) -> Vec<&'a Course> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return courses.iter().collect();
    }

    courses
        .iter()
        .filter(|course| {
            course.code.to_lowercase().contains(&query) || course.name.to_lowercase().contains(&query)
        })
        .collect()
}

/// Files attached to `course_id`; a blank id keeps all.
pub fn files_for_course<'a>(files: &'a [CourseFile], course_id: &str) -> Vec<&'a CourseFile> {
    if course_id.trim().is_empty() {
        return files.iter().collect();
    }
    files.iter().filter(|file| file.course_id == course_id).collect()
}
