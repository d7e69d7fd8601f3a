use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{
    non_empty, positive_id, ActivityMetadata, CategoryMetadata, Course, ModelError,
    SubmissionStatus,
};

/// Activity as returned by the activity list and detail endpoints. The
/// list response omits unit tests and sometimes the long description.
#[derive(Debug, Deserialize)]
pub struct ActivityPayload {
    pub id: i64,
    #[serde(default)]
    pub course_id: Option<i64>,
    pub category_id: i64,
    pub category_name: String,
    #[serde(default)]
    pub category_description: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub language: String,
    #[serde(default)]
    pub activity_unit_tests: Option<String>,
    pub file_id: i64,
    #[serde(default)]
    pub submission_status: Option<String>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub is_iotested: bool,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub last_submission_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Grouping of activities inside a course. Never fetched on its own; it is
/// derived from the `category_*` fields every activity carries.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub course: Arc<Course>,
    pub id: u64,
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn metadata(&self) -> CategoryMetadata {
        CategoryMetadata {
            id: self.id,
            name: self.name.clone(),
            course: self.course.metadata(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
    pub course: Arc<Course>,
    pub category: Category,
    pub id: u64,
    pub name: String,
    pub description: String,
    pub language: String,
    pub activity_unit_tests: Option<String>,
    pub file_id: u64,
    pub submission_status: Option<SubmissionStatus>,
    pub points: Option<u32>,
    pub is_iotested: bool,
    pub active: bool,
    pub last_submission_date: Option<DateTime<Utc>>,
    pub date_created: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Activity {
    pub fn from_payload(course: Arc<Course>, payload: ActivityPayload) -> Result<Self, ModelError> {
        let category = Category {
            course: Arc::clone(&course),
            id: positive_id("activity.category_id", payload.category_id)?,
            name: payload.category_name,
            description: payload.category_description.unwrap_or_default(),
        };

        Ok(Activity {
            id: positive_id("activity.id", payload.id)?,
            file_id: positive_id("activity.file_id", payload.file_id)?,
            submission_status: SubmissionStatus::parse_optional(
                payload.submission_status.as_deref(),
            )?,
            course,
            category,
            name: payload.name,
            description: payload.description.unwrap_or_default(),
            language: payload.language,
            activity_unit_tests: non_empty(payload.activity_unit_tests),
            points: payload.points,
            is_iotested: payload.is_iotested,
            active: payload.active,
            last_submission_date: payload.last_submission_date,
            date_created: payload.date_created,
            last_updated: payload.last_updated,
        })
    }

    pub fn metadata(&self) -> ActivityMetadata {
        ActivityMetadata {
            id: self.id,
            name: self.name.clone(),
            language: self.language.clone(),
            course: self.course.metadata(),
            category: self.category.metadata(),
        }
    }
}
