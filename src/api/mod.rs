// API client module: a blocking client for the MyRPL REST API. Every
// authenticated call goes through `execute`, which supplies the stored
// token when none is loaded and renews it once on a 401.

mod credentials;
mod transport;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

pub use credentials::Credentials;
pub use transport::{ApiRequest, ApiResponse, FileUpload, HttpTransport, RequestBody, Transport};

use crate::error::{Error, Result};
use crate::models::{
    Activity, ActivityPayload, Course, CoursePayload, ModelError, Submission, SubmissionPayload,
    SubmissionResult,
};
use crate::secrets::{FileSecretStore, SecretStore};
use credentials::LoginResponse;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Client for one MyRPL origin. Holds the transport, the secret store used
/// for renewal, and the credentials currently in use. Only `login` and
/// `set_credentials` write the credentials; every request reads them.
pub struct ApiClient<T = HttpTransport, S = FileSecretStore> {
    transport: T,
    secrets: S,
    base_url: String,
    credentials: Option<Credentials>,
}

impl<T: Transport, S: SecretStore> ApiClient<T, S> {
    pub fn new(transport: T, secrets: S, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ApiClient {
            transport,
            secrets,
            base_url,
            credentials: None,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Current `Authorization` header value, if any.
    pub fn authorization(&self) -> Option<String> {
        self.credentials.as_ref().map(Credentials::header_value)
    }

    pub fn secrets(&self) -> &S {
        &self.secrets
    }

    pub fn secrets_mut(&mut self) -> &mut S {
        &mut self.secrets
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Logs in without authentication and makes the returned token the
    /// client's credentials.
    pub fn login(&mut self, username_or_email: &str, password: &str) -> Result<Credentials> {
        let body = serde_json::json!({
            "username_or_email": username_or_email,
            "password": password,
        });
        let request = ApiRequest {
            method: Method::POST,
            url: self.url("/api/auth/login"),
            authorization: None,
            body: RequestBody::Json(body),
        };

        let response = check_status(&request.url, self.transport.send(&request)?)?;
        let login: LoginResponse = parse(&request.url, &response.body)?;
        let credentials = login.into_credentials().ok_or_else(|| Error::Auth {
            reason: "no access token in login response".to_string(),
        })?;

        info!("logged in");
        self.credentials = Some(credentials.clone());
        Ok(credentials)
    }

    /// Logs in again with the stored username and password and persists
    /// the new token. Single shot: callers do not loop on it.
    pub fn renew_token(&mut self) -> Result<()> {
        let (username, password) = self.secrets.stored_credentials()?;
        let (Some(username), Some(password)) = (username, password) else {
            return Err(Error::MissingCredentials);
        };

        let credentials = self.login(&username, &password)?;
        self.secrets.store_token(&credentials.access_token)?;
        info!("access token renewed");
        Ok(())
    }

    fn ensure_authorization(&mut self) -> Result<()> {
        if self.credentials.is_none() {
            if let Some(token) = self.secrets.stored_token()? {
                debug!("using stored access token");
                self.credentials = Some(Credentials::bearer(token));
            }
        }
        Ok(())
    }

    /// Sends an authenticated request, renewing the token and retrying once
    /// if the server answers 401.
    fn execute(&mut self, method: Method, path: &str, body: RequestBody) -> Result<ApiResponse> {
        self.ensure_authorization()?;
        let mut request = ApiRequest {
            method,
            url: self.url(path),
            authorization: self.authorization(),
            body,
        };

        let response = self.transport.send(&request)?;
        if response.status != StatusCode::UNAUTHORIZED {
            return check_status(&request.url, response);
        }

        warn!(url = %request.url, "token rejected, renewing");
        self.renew_token()?;
        request.authorization = self.authorization();
        let response = self.transport.send(&request)?;
        check_status(&request.url, response)
    }

    fn call<R: DeserializeOwned>(&mut self, method: Method, path: &str, body: RequestBody) -> Result<R> {
        let url = self.url(path);
        let response = self.execute(method, path, body)?;
        parse(&url, &response.body)
    }

    fn get<R: DeserializeOwned>(&mut self, path: &str) -> Result<R> {
        self.call(Method::GET, path, RequestBody::Empty)
    }

    pub fn fetch_courses(&mut self) -> Result<Vec<Course>> {
        let payloads: Vec<CoursePayload> = self.get("/api/courses")?;
        let courses = payloads
            .into_iter()
            .map(Course::from_payload)
            .collect::<std::result::Result<Vec<_>, ModelError>>()?;
        Ok(courses)
    }

    pub fn fetch_activities(&mut self, course: &Arc<Course>) -> Result<Vec<Activity>> {
        let payloads: Vec<ActivityPayload> =
            self.get(&format!("/api/courses/{}/activities", course.id))?;
        let activities = payloads
            .into_iter()
            .map(|payload| Activity::from_payload(Arc::clone(course), payload))
            .collect::<std::result::Result<Vec<_>, ModelError>>()?;
        Ok(activities)
    }

    /// Full detail of one activity by id.
    pub fn fetch_activity(&mut self, course: &Arc<Course>, activity_id: u64) -> Result<Activity> {
        let payload: ActivityPayload = self.get(&format!(
            "/api/courses/{}/activities/{}",
            course.id, activity_id
        ))?;
        Ok(Activity::from_payload(Arc::clone(course), payload)?)
    }

    /// Re-fetches an activity from the detail endpoint, which carries the
    /// fields the list omits (unit tests, long descriptions).
    pub fn fetch_activity_info(&mut self, activity: &Activity) -> Result<Activity> {
        self.fetch_activity(&activity.course, activity.id)
    }

    /// File name to content mapping for starter code or a submission.
    pub fn fetch_files(&mut self, file_id: u64) -> Result<BTreeMap<String, String>> {
        self.get(&format!("/api/getFileForStudent/{file_id}"))
    }

    pub fn fetch_submissions(&mut self, activity: &Arc<Activity>) -> Result<Vec<Submission>> {
        let payloads: Vec<SubmissionPayload> = self.get(&format!(
            "/api/courses/{}/activities/{}/submissions",
            activity.course.id, activity.id
        ))?;
        let submissions = payloads
            .into_iter()
            .map(|payload| Submission::from_payload(Arc::clone(activity), payload))
            .collect::<std::result::Result<Vec<_>, ModelError>>()?;
        Ok(submissions)
    }

    pub fn fetch_final_submission(&mut self, activity: &Arc<Activity>) -> Result<Submission> {
        let payload: SubmissionPayload = self.get(&format!(
            "/api/courses/{}/activities/{}/finalSubmission",
            activity.course.id, activity.id
        ))?;
        let mut submission = Submission::from_payload(Arc::clone(activity), payload)?;
        submission.is_final_solution = true;
        Ok(submission)
    }

    pub fn fetch_submission_result(&mut self, submission: &Submission) -> Result<SubmissionResult> {
        let payload: SubmissionPayload =
            self.get(&format!("/api/submissions/{}/result", submission.id))?;
        Ok(SubmissionResult::from_payload(submission, payload)?)
    }

    /// Uploads `file_path` as a new submission for `activity`.
    pub fn submit(
        &mut self,
        activity: &Arc<Activity>,
        file_path: &Path,
        description: &str,
    ) -> Result<Submission> {
        let bytes = fs::read(file_path)?;
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "submission".to_string());
        let mime = mime_guess::from_path(file_path)
            .first_raw()
            .unwrap_or(FALLBACK_MIME)
            .to_string();

        info!(file = %file_name, %mime, activity = activity.id, "submitting");
        let upload = FileUpload {
            file_name,
            mime,
            bytes,
            description: description.to_string(),
        };
        let payload: SubmissionPayload = self.call(
            Method::POST,
            &format!(
                "/api/courses/{}/activities/{}/submissions",
                activity.course.id, activity.id
            ),
            RequestBody::Multipart(upload),
        )?;
        Ok(Submission::from_payload(Arc::clone(activity), payload)?)
    }

    /// Marks `submission` as the activity's final solution.
    pub fn set_final_submission(&mut self, submission: &Submission) -> Result<Submission> {
        let payload: SubmissionPayload = self.call(
            Method::PUT,
            &format!("/api/submissions/{}/final", submission.id),
            RequestBody::Empty,
        )?;
        let mut updated = Submission::from_payload(Arc::clone(&submission.activity), payload)?;
        updated.is_final_solution = true;
        Ok(updated)
    }
}

fn check_status(url: &str, response: ApiResponse) -> Result<ApiResponse> {
    if response.status.is_success() {
        Ok(response)
    } else {
        Err(Error::HttpStatus {
            status: response.status,
            url: url.to_string(),
            body: response.body,
        })
    }
}

fn parse<R: DeserializeOwned>(url: &str, body: &str) -> Result<R> {
    serde_json::from_str(body).map_err(|source| Error::Deserialize {
        url: url.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests;
