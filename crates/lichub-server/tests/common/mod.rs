#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{HeaderMap, Request, StatusCode};
use chrono::Utc;
use lichub_server::app;
use lichub_server::config::ServerConfig;
use lichub_server::state::AppState;
use lichub_storage::attachments::AttachmentStore;
use lichub_storage::store::EntityStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;

pub struct TestContext {
    pub temp_dir: TempDir,
    pub state: AppState,
    pub app: axum::Router,
}

pub async fn build_test_context() -> TestContext {
    let temp_dir = tempfile::tempdir().expect("temp dir should create");
    let db_path = temp_dir.path().join("lichub.db");
    let url = format!("sqlite://{}?mode=rwc", db_path.display());
    let store = Arc::new(
        EntityStore::new(&url)
            .await
            .expect("store should initialize"),
    );
    let attachments = Arc::new(AttachmentStore::new(temp_dir.path().join("uploads")));

    let state = AppState {
        store,
        attachments,
        start_time: Utc::now(),
        config: Arc::new(ServerConfig::default()),
    };
    let app = app::build_http_app(state.clone());

    TestContext {
        temp_dir,
        state,
        app,
    }
}

async fn decode_body(resp: axum::response::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice::<Value>(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
    };
    (status, json)
}

pub async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let req_body = body.unwrap_or(Value::Null).to_string();
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(req_body))
        .expect("request should build");

    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    decode_body(resp).await
}

pub async fn request_no_body(app: &axum::Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    decode_body(resp).await
}

/// Raw request for binary endpoints; returns status, headers, and the
/// unparsed body bytes.
pub async fn request_raw(
    app: &axum::Router,
    method: &str,
    uri: &str,
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("body should read");
    (status, headers, bytes.to_vec())
}

const BOUNDARY: &str = "lichub-test-boundary";

/// Hand-assemble a multipart/form-data body from text fields plus an
/// optional binary `file` field.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn request_multipart(
    app: &axum::Router,
    method: &str,
    uri: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(fields, file)))
        .expect("request should build");
    let resp = app
        .clone()
        .oneshot(req)
        .await
        .expect("request should be handled");
    decode_body(resp).await
}

pub async fn create_customer(app: &axum::Router, name: &str) -> i64 {
    let (status, body) = request_json(
        app,
        "POST",
        "/customers",
        Some(json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create customer: {body}");
    body["id"].as_i64().expect("customer id should exist")
}

pub async fn create_channel(app: &axum::Router, name: &str, customer_ids: &[i64]) -> i64 {
    let (status, body) = request_json(
        app,
        "POST",
        "/channels",
        Some(json!({
            "name": name,
            "type": "direct_sales",
            "customer_ids": customer_ids,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create channel: {body}");
    body["id"].as_i64().expect("channel id should exist")
}

pub async fn create_license(
    app: &axum::Router,
    customer_id: i64,
    start_date: &str,
    end_date: &str,
) -> i64 {
    let (status, body) = request_json(
        app,
        "POST",
        "/licenses",
        Some(json!({
            "customer_id": customer_id,
            "license_object": "core",
            "start_date": start_date,
            "end_date": end_date,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create license: {body}");
    body["id"].as_i64().expect("license id should exist")
}

pub fn date_from_today(days: i64) -> String {
    (Utc::now().date_naive() + chrono::Duration::days(days))
        .format("%Y-%m-%d")
        .to_string()
}
