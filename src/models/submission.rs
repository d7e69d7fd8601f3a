use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{non_empty, positive_id, Activity, ModelError, SubmissionStatus};

/// Outcome of a single unit test in a graded submission.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnitTestResult {
    pub id: u64,
    pub test_name: String,
    pub passed: bool,
    #[serde(default)]
    pub error_messages: Option<String>,
}

/// Submission-shaped response. The list, final-submission, result and
/// set-final endpoints all answer with subsets of these fields, so every
/// field except the id is optional.
#[derive(Debug, Default, Deserialize)]
pub struct SubmissionPayload {
    pub id: i64,
    pub activity_id: Option<i64>,
    pub submission_file_name: Option<String>,
    pub submission_file_type: Option<String>,
    pub submission_file_id: Option<i64>,
    pub is_iotested: Option<bool>,
    pub activity_starting_files_name: Option<String>,
    pub activity_starting_files_type: Option<String>,
    pub activity_starting_files_id: Option<i64>,
    pub activity_language: Option<String>,
    #[serde(alias = "activity_unit_tests_content")]
    pub activity_unit_tests: Option<String>,
    pub submission_status: Option<String>,
    pub is_final_solution: Option<bool>,
    pub exit_message: Option<String>,
    pub stderr: Option<String>,
    pub stdout: Option<String>,
    pub io_test_run_results: Option<Vec<serde_json::Value>>,
    pub unit_test_run_results: Option<Vec<UnitTestResult>>,
    pub submission_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub activity: Arc<Activity>,
    pub id: u64,
    pub submission_file_name: String,
    pub submission_file_type: String,
    pub submission_file_id: Option<u64>,
    pub is_iotested: bool,
    pub activity_starting_files_name: String,
    pub activity_starting_files_type: String,
    pub activity_starting_files_id: Option<u64>,
    pub activity_language: String,
    pub activity_unit_tests: Option<String>,
    pub submission_status: Option<SubmissionStatus>,
    pub is_final_solution: bool,
    pub exit_message: Option<String>,
    pub stderr: Option<String>,
    pub stdout: Option<String>,
    pub io_test_run_results: Vec<serde_json::Value>,
    pub unit_test_run_results: Vec<UnitTestResult>,
    pub submission_date: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn from_payload(activity: Arc<Activity>, payload: SubmissionPayload) -> Result<Self, ModelError> {
        let mut submission = Submission {
            activity,
            id: positive_id("submission.id", payload.id)?,
            submission_file_name: String::new(),
            submission_file_type: String::new(),
            submission_file_id: None,
            is_iotested: false,
            activity_starting_files_name: String::new(),
            activity_starting_files_type: String::new(),
            activity_starting_files_id: None,
            activity_language: String::new(),
            activity_unit_tests: None,
            submission_status: None,
            is_final_solution: false,
            exit_message: None,
            stderr: None,
            stdout: None,
            io_test_run_results: Vec::new(),
            unit_test_run_results: Vec::new(),
            submission_date: None,
        };
        submission.apply(payload)?;
        Ok(submission)
    }

    /// Overwrites every field the payload carries, leaving the rest as is.
    fn apply(&mut self, payload: SubmissionPayload) -> Result<(), ModelError> {
        self.id = positive_id("submission.id", payload.id)?;
        if let Some(name) = payload.submission_file_name {
            self.submission_file_name = name;
        }
        if let Some(kind) = payload.submission_file_type {
            self.submission_file_type = kind;
        }
        if let Some(id) = payload.submission_file_id {
            self.submission_file_id = Some(positive_id("submission.submission_file_id", id)?);
        }
        if let Some(flag) = payload.is_iotested {
            self.is_iotested = flag;
        }
        if let Some(name) = payload.activity_starting_files_name {
            self.activity_starting_files_name = name;
        }
        if let Some(kind) = payload.activity_starting_files_type {
            self.activity_starting_files_type = kind;
        }
        if let Some(id) = payload.activity_starting_files_id {
            self.activity_starting_files_id =
                Some(positive_id("submission.activity_starting_files_id", id)?);
        }
        if let Some(language) = payload.activity_language {
            self.activity_language = language;
        }
        if payload.activity_unit_tests.is_some() {
            self.activity_unit_tests = non_empty(payload.activity_unit_tests);
        }
        if payload.submission_status.is_some() {
            self.submission_status =
                SubmissionStatus::parse_optional(payload.submission_status.as_deref())?;
        }
        if let Some(flag) = payload.is_final_solution {
            self.is_final_solution = flag;
        }
        if payload.exit_message.is_some() {
            self.exit_message = payload.exit_message;
        }
        if payload.stderr.is_some() {
            self.stderr = payload.stderr;
        }
        if payload.stdout.is_some() {
            self.stdout = payload.stdout;
        }
        if let Some(results) = payload.io_test_run_results {
            self.io_test_run_results = results;
        }
        if let Some(results) = payload.unit_test_run_results {
            self.unit_test_run_results = results;
        }
        if payload.submission_date.is_some() {
            self.submission_date = payload.submission_date;
        }
        Ok(())
    }

    pub fn passed_tests(&self) -> usize {
        self.unit_test_run_results.iter().filter(|t| t.passed).count()
    }
}

/// A submission's graded outcome. `submission` is the submission the result
/// was requested for; `latest` is that submission with every field the
/// result response carried applied on top.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionResult {
    pub submission: Submission,
    pub latest: Submission,
}

impl SubmissionResult {
    pub fn from_payload(submission: &Submission, payload: SubmissionPayload) -> Result<Self, ModelError> {
        let mut latest = submission.clone();
        latest.apply(payload)?;
        Ok(SubmissionResult {
            submission: submission.clone(),
            latest,
        })
    }

    pub fn activity(&self) -> &Arc<Activity> {
        &self.latest.activity
    }

    pub fn status(&self) -> Option<SubmissionStatus> {
        self.latest.submission_status
    }

    pub fn unit_test_results(&self) -> &[UnitTestResult] {
        &self.latest.unit_test_run_results
    }
}
