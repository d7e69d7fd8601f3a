// Domain model: read-only projections of server responses.
//
// Every entity is built from a `*Payload` wire struct through a
// `from_payload` constructor, which is where ids are checked and wire quirks
// (empty-string statuses, flat category fields) are normalized.

mod activity;
mod course;
mod metadata;
mod status;
mod submission;

pub use activity::{Activity, ActivityPayload, Category};
pub use course::{find_course, Course, CoursePayload};
pub use metadata::{ActivityMetadata, CategoryMetadata, CourseMetadata};
pub use status::SubmissionStatus;
pub use submission::{Submission, SubmissionPayload, SubmissionResult, UnitTestResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    #[error("`{field}` must be a positive integer, got {value}")]
    NonPositiveId { field: &'static str, value: i64 },

    #[error("unknown submission status `{0}`")]
    UnknownStatus(String),
}

/// Checks that a wire identifier is a positive integer.
pub(crate) fn positive_id(field: &'static str, value: i64) -> Result<u64, ModelError> {
    if value > 0 {
        Ok(value as u64)
    } else {
        Err(ModelError::NonPositiveId { field, value })
    }
}

/// Maps absent and empty strings to `None`.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
