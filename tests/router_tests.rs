// tests/router_tests.rs

mod common;

use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

async fn send(app: axum::Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request build should succeed");

    let resp = app.oneshot(req).await.expect("router should respond");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn unknown_attempts_are_not_found() {
    let app = common::app();
    let missing = Uuid::new_v4();

    let cases = [
        (Method::GET, format!("/api/exams/{missing}/questions"), "".to_string()),
        (Method::GET, format!("/api/exams/{missing}/results"), "".to_string()),
        (Method::GET, format!("/api/exams/{missing}/report"), "".to_string()),
        (
            Method::POST,
            format!("/api/exams/{missing}/submit"),
            r#"{"answers":[]}"#.to_string(),
        ),
        (
            Method::DELETE,
            format!("/api/attempts/{missing}"),
            format!(r#"{{"user_id":"{}"}}"#, Uuid::new_v4()),
        ),
    ];

    for (method, uri, body) in cases {
        let (status, json) = send(app.clone(), method, &uri, &body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "expected NOT_FOUND for {uri}");
        assert_eq!(json["error"], "attempt not found");
    }
}

#[tokio::test]
async fn malformed_attempt_id_is_rejected() {
    let app = common::app();

    let (status, _) = send(app, Method::GET, "/api/exams/not-a-uuid/questions", "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn results_of_open_attempt_conflict() {
    let app = common::app();

    let (status, started) = send(
        app.clone(),
        Method::POST,
        "/api/hard/start",
        r#"{"email":"router@example.com","name":"Router"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(started["question_count"], 20);

    let attempt_id = started["attempt_id"].as_str().unwrap();
    let (status, json) = send(
        app,
        Method::GET,
        &format!("/api/exams/{attempt_id}/results"),
        "",
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"], "exam not yet submitted");
}

#[tokio::test]
async fn history_of_unknown_user_is_not_found() {
    let app = common::app();

    let (status, json) = send(
        app,
        Method::GET,
        &format!("/api/users/{}/attempts", Uuid::new_v4()),
        "",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "user not found");
}
