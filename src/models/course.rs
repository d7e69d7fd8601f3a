use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{non_empty, positive_id, CourseMetadata, ModelError};
use crate::error::{Error, Result};

/// Course as returned by `GET /api/courses`.
#[derive(Debug, Deserialize)]
pub struct CoursePayload {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub university: Option<String>,
    #[serde(default)]
    pub university_course_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub enrolled: Option<bool>,
    #[serde(default)]
    pub accepted: Option<bool>,
    #[serde(default)]
    pub semester: Option<String>,
    #[serde(default)]
    pub semester_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub semester_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub img_uri: Option<String>,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: u64,
    pub name: String,
    pub university: Option<String>,
    pub university_course_id: Option<String>,
    pub description: Option<String>,
    pub active: bool,
    pub enrolled: bool,
    pub accepted: bool,
    pub semester: Option<String>,
    pub semester_start_date: Option<DateTime<Utc>>,
    pub semester_end_date: Option<DateTime<Utc>>,
    pub img_uri: Option<String>,
    pub date_created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Course {
    pub fn from_payload(payload: CoursePayload) -> std::result::Result<Self, ModelError> {
        Ok(Course {
            id: positive_id("course.id", payload.id)?,
            name: payload.name,
            university: non_empty(payload.university),
            university_course_id: non_empty(payload.university_course_id),
            description: non_empty(payload.description),
            active: payload.active,
            enrolled: payload.enrolled.unwrap_or(false),
            accepted: payload.accepted.unwrap_or(false),
            semester: non_empty(payload.semester),
            semester_start_date: payload.semester_start_date,
            semester_end_date: payload.semester_end_date,
            img_uri: non_empty(payload.img_uri),
            date_created: payload.date_created,
            last_updated: payload.last_updated,
        })
    }

    pub fn metadata(&self) -> CourseMetadata {
        CourseMetadata {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Picks the course with the given id out of a course listing.
pub fn find_course(courses: Vec<Course>, course_id: u64) -> Result<Course> {
    courses
        .into_iter()
        .find(|course| course.id == course_id)
        .ok_or_else(|| Error::NotFound {
            resource: format!("course with id {course_id}"),
        })
}
