// Fixtures and a scripted transport shared by unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

use crate::api::{ApiClient, ApiRequest, ApiResponse, Transport};
use crate::error::Result;
use crate::models::{Activity, ActivityPayload, Course, CoursePayload};
use crate::secrets::MemorySecretStore;

pub const BASE_URL: &str = "https://rpl.test";

/// Replays queued responses per (method, path) and records every request.
/// The last queued response for a route keeps being served.
#[derive(Default)]
pub struct FakeTransport {
    routes: RefCell<HashMap<(Method, String), VecDeque<ApiResponse>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        let body = match body {
            Value::String(text) => text,
            other => other.to_string(),
        };
        let response = ApiResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body,
        };
        self.routes
            .borrow_mut()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    /// Request paths (base URL stripped) in the order they were sent.
    pub fn paths(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|r| r.url.trim_start_matches(BASE_URL).to_string())
            .collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.paths().iter().filter(|p| p.as_str() == path).count()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.requests.borrow_mut().push(request.clone());
        let path = request.url.trim_start_matches(BASE_URL).to_string();
        let mut routes = self.routes.borrow_mut();
        let response = match routes.get_mut(&(request.method.clone(), path)) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(response.unwrap_or(ApiResponse {
            status: StatusCode::NOT_FOUND,
            body: "no route".to_string(),
        }))
    }
}

pub fn client(
    transport: FakeTransport,
    secrets: MemorySecretStore,
) -> ApiClient<FakeTransport, MemorySecretStore> {
    ApiClient::new(transport, secrets, BASE_URL)
}

pub fn course_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "university": "FIUBA",
        "university_course_id": "75.29/95.06",
        "description": "Curso de prueba",
        "active": true,
        "semester": "2C-2023",
        "semester_start_date": "2023-08-13T00:00:00Z",
        "semester_end_date": "2024-01-01T00:00:00Z",
        "date_created": "2023-08-03T16:52:59Z",
        "last_updated": "2023-08-03T16:52:59Z"
    })
}

pub fn activity_json(id: u64, category_id: u64, category: &str, name: &str, status: &str) -> Value {
    json!({
        "id": id,
        "course_id": 57,
        "category_id": category_id,
        "category_name": category,
        "category_description": format!("Descripción de {category}"),
        "name": name,
        "description": format!("Enunciado de {name}"),
        "language": "PYTHON3",
        "is_iotested": false,
        "active": true,
        "points": 1,
        "file_id": id * 100,
        "submission_status": status,
        "date_created": "2023-08-03T16:52:59Z",
        "last_updated": "2024-06-22T21:25:30Z"
    })
}

pub fn test_course(id: u64, name: &str) -> Course {
    let payload: CoursePayload = serde_json::from_value(course_json(id, name)).unwrap();
    Course::from_payload(payload).unwrap()
}

pub fn test_activity(id: u64, status: Option<&str>) -> Activity {
    let payload: ActivityPayload = serde_json::from_value(activity_json(
        id,
        630,
        "0 - TP0",
        "Alumno más bajo",
        status.unwrap_or(""),
    ))
    .unwrap();
    Activity::from_payload(Arc::new(test_course(57, "Teoría de Algoritmos")), payload).unwrap()
}
