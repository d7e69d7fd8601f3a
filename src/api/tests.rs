use super::*;
use crate::models::SubmissionStatus;
use crate::secrets::MemorySecretStore;
use crate::test_support::{
    activity_json, client, course_json, test_activity, test_course, FakeTransport,
};
use serde_json::json;

fn login_ok(transport: &FakeTransport, token: &str) {
    transport.respond(
        Method::POST,
        "/api/auth/login",
        200,
        json!({"token_type": "Bearer", "access_token": token}),
    );
}

#[test]
fn login_sets_authorization_header() {
    let transport = FakeTransport::new();
    login_ok(&transport, "test_token");
    let mut api = client(transport, MemorySecretStore::new());

    let credentials = api.login("test@example.com", "password").unwrap();

    assert_eq!(credentials.access_token, "test_token");
    assert_eq!(api.authorization().as_deref(), Some("Bearer test_token"));

    let requests = api.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::POST);
    assert!(requests[0].url.ends_with("/api/auth/login"));
    assert_eq!(requests[0].authorization, None);
    assert_eq!(
        requests[0].body,
        RequestBody::Json(json!({
            "username_or_email": "test@example.com",
            "password": "password"
        }))
    );
}

#[test]
fn login_honors_returned_token_type() {
    let transport = FakeTransport::new();
    transport.respond(
        Method::POST,
        "/api/auth/login",
        200,
        json!({"token_type": "JWT", "access_token": "abc"}),
    );
    let mut api = client(transport, MemorySecretStore::new());

    api.login("user", "pass").unwrap();
    assert_eq!(api.authorization().as_deref(), Some("JWT abc"));
}

#[test]
fn login_without_access_token_fails() {
    let transport = FakeTransport::new();
    transport.respond(Method::POST, "/api/auth/login", 200, json!({"token_type": "Bearer"}));
    let mut api = client(transport, MemorySecretStore::new());

    let err = api.login("user", "pass").unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
    assert_eq!(api.credentials(), None);
}

#[test]
fn login_rejected_by_server_propagates_status() {
    let transport = FakeTransport::new();
    transport.respond(Method::POST, "/api/auth/login", 401, json!("bad credentials"));
    let mut api = client(transport, MemorySecretStore::new());

    let err = api.login("user", "wrong").unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status, .. } if status == StatusCode::UNAUTHORIZED));
}

#[test]
fn fetch_courses_uses_stored_token() {
    let transport = FakeTransport::new();
    transport.respond(
        Method::GET,
        "/api/courses",
        200,
        json!([
            course_json(1, "Curso de prueba 1"),
            course_json(57, "Teoría de Algoritmos"),
            course_json(63, "FundamentosMendez 2024 1C"),
        ]),
    );
    let mut secrets = MemorySecretStore::new();
    secrets.store_token("stored").unwrap();
    let mut api = client(transport, secrets);

    let courses = api.fetch_courses().unwrap();

    assert_eq!(courses.len(), 3);
    assert_eq!(courses[1].id, 57);
    assert_eq!(courses[1].name, "Teoría de Algoritmos");
    let requests = api.transport().requests();
    assert_eq!(requests[0].method, Method::GET);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer stored"));
}

#[test]
fn fetch_activities_injects_course_and_normalizes_status() {
    let transport = FakeTransport::new();
    transport.respond(
        Method::GET,
        "/api/courses/57/activities",
        200,
        json!([
            activity_json(5259, 630, "0 - TP0", "Alumno más bajo", "SUCCESS"),
            activity_json(5790, 694, "1 - División y Conquista", "04 - Picos", ""),
        ]),
    );
    let mut api = client(transport, MemorySecretStore::new());
    let course = Arc::new(test_course(57, "Teoría de Algoritmos"));

    let activities = api.fetch_activities(&course).unwrap();

    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0].course, course);
    assert_eq!(activities[0].category.id, 630);
    assert_eq!(activities[0].submission_status, Some(SubmissionStatus::Success));
    assert_eq!(activities[1].category.name, "1 - División y Conquista");
    assert_eq!(activities[1].submission_status, None);
    assert_eq!(activities[1].activity_unit_tests, None);
}

#[test]
fn fetch_activity_info_returns_detail_with_same_course() {
    let mut detail = activity_json(5259, 630, "0 - TP0", "Alumno más bajo", "");
    detail["activity_unit_tests"] = json!("import unittest\n");
    detail["language"] = json!("python");

    let transport = FakeTransport::new();
    transport.respond(Method::GET, "/api/courses/57/activities/5259", 200, detail);
    let mut api = client(transport, MemorySecretStore::new());
    let activity = test_activity(5259, Some("SUCCESS"));

    let updated = api.fetch_activity_info(&activity).unwrap();

    assert_eq!(updated.id, 5259);
    assert_eq!(updated.course, activity.course);
    assert_eq!(updated.language, "python");
    assert_eq!(updated.activity_unit_tests.as_deref(), Some("import unittest\n"));
}

#[test]
fn fetch_files_returns_name_to_content_map() {
    let transport = FakeTransport::new();
    transport.respond(
        Method::GET,
        "/api/getFileForStudent/3",
        200,
        json!({
            "file_1.py": "def initial_code():\n    pass",
            "file_2.py": "def da_function():\n    pass"
        }),
    );
    let mut api = client(transport, MemorySecretStore::new());

    let files = api.fetch_files(3).unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files["file_1.py"], "def initial_code():\n    pass");
    assert_eq!(api.transport().paths(), vec!["/api/getFileForStudent/3"]);
}

#[test]
fn expired_token_is_renewed_once_and_request_retried() {
    let transport = FakeTransport::new();
    transport
        .respond(Method::GET, "/api/courses", 401, json!("expired"))
        .respond(Method::GET, "/api/courses", 200, json!([course_json(57, "TDA")]));
    login_ok(&transport, "new_token");
    let mut secrets = MemorySecretStore::with_credentials("test@example.com", "password");
    secrets.store_token("expired_token").unwrap();
    let mut api = client(transport, secrets);

    let courses = api.fetch_courses().unwrap();

    assert_eq!(courses.len(), 1);
    assert_eq!(
        api.transport().paths(),
        vec!["/api/courses", "/api/auth/login", "/api/courses"]
    );
    let requests = api.transport().requests();
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer expired_token"));
    assert_eq!(requests[2].authorization.as_deref(), Some("Bearer new_token"));
    assert_eq!(requests[0].method, requests[2].method);
    assert_eq!(requests[0].body, requests[2].body);
    assert_eq!(
        api.secrets().stored_token().unwrap().as_deref(),
        Some("new_token")
    );
}

#[test]
fn second_unauthorized_response_is_not_retried() {
    let transport = FakeTransport::new();
    transport.respond(Method::GET, "/api/courses", 401, json!("expired"));
    login_ok(&transport, "new_token");
    let mut api = client(
        transport,
        MemorySecretStore::with_credentials("test@example.com", "password"),
    );

    let err = api.fetch_courses().unwrap_err();

    assert!(matches!(err, Error::HttpStatus { status, .. } if status == StatusCode::UNAUTHORIZED));
    assert_eq!(api.transport().count("/api/courses"), 2);
    assert_eq!(api.transport().count("/api/auth/login"), 1);
}

#[test]
fn renewal_without_credentials_makes_no_request() {
    let mut api = client(FakeTransport::new(), MemorySecretStore::new());

    let err = api.renew_token().unwrap_err();

    assert!(matches!(err, Error::MissingCredentials));
    assert!(api.transport().requests().is_empty());
}

#[test]
fn unauthorized_without_credentials_surfaces_missing_credentials() {
    let transport = FakeTransport::new();
    transport.respond(Method::GET, "/api/courses", 401, json!("no token"));
    let mut api = client(transport, MemorySecretStore::new());

    let err = api.fetch_courses().unwrap_err();

    assert!(matches!(err, Error::MissingCredentials));
    assert_eq!(api.transport().paths(), vec!["/api/courses"]);
}

#[test]
fn renew_token_stores_and_applies_new_token() {
    let transport = FakeTransport::new();
    login_ok(&transport, "new_token");
    let mut api = client(
        transport,
        MemorySecretStore::with_credentials("test@example.com", "password"),
    );

    api.renew_token().unwrap();

    assert_eq!(api.authorization().as_deref(), Some("Bearer new_token"));
    assert_eq!(
        api.secrets().stored_token().unwrap().as_deref(),
        Some("new_token")
    );
}

#[test]
fn other_http_errors_propagate_without_renewal() {
    let transport = FakeTransport::new();
    transport.respond(Method::GET, "/api/courses", 500, json!("boom"));
    let mut api = client(
        transport,
        MemorySecretStore::with_credentials("test@example.com", "password"),
    );

    let err = api.fetch_courses().unwrap_err();

    match err {
        Error::HttpStatus { status, body, .. } => {
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, "boom");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(api.transport().count("/api/auth/login"), 0);
}

#[test]
fn unexpected_shape_is_a_deserialize_error() {
    let transport = FakeTransport::new();
    transport.respond(Method::GET, "/api/courses", 200, json!({"courses": []}));
    let mut api = client(transport, MemorySecretStore::new());

    assert!(matches!(api.fetch_courses(), Err(Error::Deserialize { .. })));
}

#[test]
fn fetch_submissions_keeps_activity_reference() {
    let transport = FakeTransport::new();
    transport.respond(
        Method::GET,
        "/api/courses/57/activities/5259/submissions",
        200,
        json!([
            {"id": 569096, "submission_file_id": 579801, "submission_status": "FAILURE"},
            {"id": 569100, "submission_file_id": 579805, "submission_status": "SUCCESS", "is_final_solution": true}
        ]),
    );
    let mut api = client(transport, MemorySecretStore::new());
    let activity = Arc::new(test_activity(5259, Some("SUCCESS")));

    let submissions = api.fetch_submissions(&activity).unwrap();

    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0].activity, activity);
    assert_eq!(submissions[0].submission_status, Some(SubmissionStatus::Failure));
    assert!(submissions[1].is_final_solution);
}

#[test]
fn final_submission_is_marked_final() {
    let transport = FakeTransport::new();
    transport.respond(
        Method::GET,
        "/api/courses/57/activities/5259/finalSubmission",
        200,
        json!({
            "id": 569100,
            "submission_file_name": "57_5259_2192",
            "submission_file_type": "application/gzip",
            "submission_file_id": 579805,
            "activity_language": "python_3.7",
            "is_iotested": false,
            "activity_unit_tests_content": ""
        }),
    );
    let mut api = client(transport, MemorySecretStore::new());
    let activity = Arc::new(test_activity(5259, Some("SUCCESS")));

    let submission = api.fetch_final_submission(&activity).unwrap();

    assert_eq!(submission.id, 569100);
    assert_eq!(submission.activity, activity);
    assert_eq!(submission.activity_language, "python_3.7");
    assert!(submission.is_final_solution);
}

#[test]
fn submission_result_overrides_stale_fields() {
    let activity = Arc::new(test_activity(5259, Some("FAILURE")));
    let submission = Submission::from_payload(
        Arc::clone(&activity),
        serde_json::from_value(json!({
            "id": 569096,
            "submission_status": "PROCESSING",
            "stdout": ""
        }))
        .unwrap(),
    )
    .unwrap();

    let transport = FakeTransport::new();
    transport.respond(
        Method::GET,
        "/api/submissions/569096/result",
        200,
        json!({
            "id": 569096,
            "submission_status": "FAILURE",
            "exit_message": "Completed all stages",
            "unit_test_run_results": [
                {"id": 1403361, "test_name": "test_bastante_al_final", "passed": false, "error_messages": "Traceback"},
                {"id": 1403362, "test_name": "test_bastante_al_inicio", "passed": false}
            ]
        }),
    );
    let mut api = client(transport, MemorySecretStore::new());

    let result = api.fetch_submission_result(&submission).unwrap();

    assert_eq!(result.submission, submission);
    assert_eq!(result.activity(), &activity);
    assert_eq!(result.status(), Some(SubmissionStatus::Failure));
    assert_eq!(result.latest.exit_message.as_deref(), Some("Completed all stages"));
    assert_eq!(result.unit_test_results().len(), 2);
}

#[test]
fn submit_sends_multipart_with_guessed_mime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, "print('Hello, World!')").unwrap();

    let transport = FakeTransport::new();
    transport.respond(
        Method::POST,
        "/api/courses/57/activities/5259/submissions",
        200,
        json!({"id": 4, "activity_id": 5259, "submission_file_name": "notes.txt", "submission_status": "PENDING"}),
    );
    let mut api = client(transport, MemorySecretStore::new());
    let activity = Arc::new(test_activity(5259, None));

    let submission = api.submit(&activity, &path, "Test submission").unwrap();

    assert_eq!(submission.id, 4);
    assert_eq!(submission.submission_status, Some(SubmissionStatus::Pending));
    let requests = api.transport().requests();
    assert_eq!(requests[0].method, Method::POST);
    assert_eq!(
        requests[0].body,
        RequestBody::Multipart(FileUpload {
            file_name: "notes.txt".into(),
            mime: "text/plain".into(),
            bytes: b"print('Hello, World!')".to_vec(),
            description: "Test submission".into(),
        })
    );
}

#[test]
fn submit_falls_back_to_octet_stream() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solution.zzqx");
    std::fs::write(&path, [0u8, 1, 2]).unwrap();

    let transport = FakeTransport::new();
    transport.respond(
        Method::POST,
        "/api/courses/57/activities/5259/submissions",
        200,
        json!({"id": 5}),
    );
    let mut api = client(transport, MemorySecretStore::new());
    let activity = Arc::new(test_activity(5259, None));

    api.submit(&activity, &path, "").unwrap();

    match &api.transport().requests()[0].body {
        RequestBody::Multipart(upload) => assert_eq!(upload.mime, FALLBACK_MIME),
        other => panic!("unexpected body: {other:?}"),
    }
}

#[test]
fn set_final_submission_puts_and_returns_final() {
    let activity = Arc::new(test_activity(5845, None));
    let submission = Submission::from_payload(
        Arc::clone(&activity),
        serde_json::from_value(json!({"id": 695375, "is_final_solution": false})).unwrap(),
    )
    .unwrap();

    let transport = FakeTransport::new();
    transport.respond(
        Method::PUT,
        "/api/submissions/695375/final",
        200,
        json!({
            "id": 695375,
            "submission_file_name": "57_5845_2192",
            "submission_file_id": 706421,
            "activity_language": "python_3.7",
            "activity_unit_tests_content": ""
        }),
    );
    let mut api = client(transport, MemorySecretStore::new());

    let updated = api.set_final_submission(&submission).unwrap();

    assert_eq!(updated.id, 695375);
    assert_eq!(updated.activity, activity);
    assert_eq!(updated.submission_file_id, Some(706421));
    assert!(updated.is_final_solution);
}
