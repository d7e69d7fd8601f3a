// HTTP transport seam. `ApiClient` describes each call as a plain
// `ApiRequest` value so the exact same request can be reissued after a token
// renewal; `HttpTransport` turns that description into a reqwest call.

use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::error::Result;

/// A file upload plus the free-text description that goes with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(FileUpload),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub authorization: Option<String>,
    pub body: RequestBody,
}

#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

pub trait Transport {
    /// Sends one request. Non-2xx statuses are returned, not raised; only
    /// connection-level failures are errors here.
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse>;
}

/// Blocking reqwest transport with a fixed User-Agent and timeout.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self.client.request(request.method.clone(), &request.url);
        if let Some(value) = &request.authorization {
            builder = builder.header(AUTHORIZATION, value.as_str());
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(upload) => {
                let part = multipart::Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.mime)?;
                let form = multipart::Form::new()
                    .part("file", part)
                    .text("description", upload.description.clone());
                builder.multipart(form)
            }
        };

        let response = builder.send()?;
        let status = response.status();
        let body = response.text()?;
        debug!(%status, url = %request.url, "received response");
        Ok(ApiResponse { status, body })
    }
}
