use std::fmt;
use std::str::FromStr;

use super::ModelError;

/// Execution state of a submission as reported by the grader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionStatus {
    Pending,
    Enqueued,
    Processing,
    BuildError,
    RuntimeError,
    Failure,
    Success,
    TimeOut,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "PENDING",
            SubmissionStatus::Enqueued => "ENQUEUED",
            SubmissionStatus::Processing => "PROCESSING",
            SubmissionStatus::BuildError => "BUILD_ERROR",
            SubmissionStatus::RuntimeError => "RUNTIME_ERROR",
            SubmissionStatus::Failure => "FAILURE",
            SubmissionStatus::Success => "SUCCESS",
            SubmissionStatus::TimeOut => "TIME_OUT",
        }
    }

    /// Still waiting on the grader.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            SubmissionStatus::Pending | SubmissionStatus::Enqueued | SubmissionStatus::Processing
        )
    }

    /// Normalizes the wire value: absent and `""` both mean "no status".
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, ModelError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }
}

impl FromStr for SubmissionStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = match s {
            "PENDING" => SubmissionStatus::Pending,
            "ENQUEUED" => SubmissionStatus::Enqueued,
            "PROCESSING" => SubmissionStatus::Processing,
            "BUILD_ERROR" => SubmissionStatus::BuildError,
            "RUNTIME_ERROR" => SubmissionStatus::RuntimeError,
            "FAILURE" => SubmissionStatus::Failure,
            "SUCCESS" => SubmissionStatus::Success,
            "TIME_OUT" => SubmissionStatus::TimeOut,
            other => return Err(ModelError::UnknownStatus(other.to_string())),
        };
        Ok(status)
    }
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
