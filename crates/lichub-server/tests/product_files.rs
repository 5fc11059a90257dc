mod common;

use axum::http::StatusCode;
use common::{build_test_context, request_multipart, request_no_body, request_raw};

#[tokio::test]
async fn product_create_requires_name_and_version() {
    let ctx = build_test_context().await;

    let (status, body) =
        request_multipart(&ctx.app, "POST", "/products", &[("name", "Core")], None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("required"));
}

#[tokio::test]
async fn product_rejects_disallowed_extension() {
    let ctx = build_test_context().await;

    let (status, body) = request_multipart(
        &ctx.app,
        "POST",
        "/products",
        &[("name", "Core"), ("version", "v1.0.0")],
        Some(("payload.sh", b"#!/bin/sh".as_slice())),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("unsupported file type"));
}

#[tokio::test]
async fn product_crud_without_attachment() {
    let ctx = build_test_context().await;

    let (status, body) = request_multipart(
        &ctx.app,
        "POST",
        "/products",
        &[
            ("name", "Core System"),
            ("version", "v2.1.0"),
            ("description", "core business system"),
        ],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().expect("product id should exist");
    assert_eq!(body["file_path"], serde_json::Value::Null);

    let (status, body) = request_no_body(&ctx.app, "GET", &format!("/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Core System");

    // Download without an attachment is a 404.
    let (status, _) =
        request_no_body(&ctx.app, "GET", &format!("/products/{id}/download")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request_no_body(&ctx.app, "DELETE", &format!("/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = request_no_body(&ctx.app, "GET", &format!("/products/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_replace_serves_new_bytes_and_leaves_no_orphan() {
    let ctx = build_test_context().await;

    let (status, body) = request_multipart(
        &ctx.app,
        "POST",
        "/products",
        &[("name", "Core"), ("version", "v1.0.0")],
        Some(("installer.zip", b"first payload".as_slice())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();
    assert_eq!(body["file_name"], "installer.zip");
    assert_eq!(body["file_size"].as_i64(), Some(13));
    let first_path = body["file_path"].as_str().unwrap().to_string();
    assert!(ctx.state.attachments.exists(&first_path).await);

    let (status, _, bytes) =
        request_raw(&ctx.app, "GET", &format!("/products/{id}/download")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"first payload");

    // Replace the attachment; the old file must be removed from storage.
    let (status, body) = request_multipart(
        &ctx.app,
        "PUT",
        &format!("/products/{id}"),
        &[("name", "Core"), ("version", "v1.1.0")],
        Some(("installer-v2.zip", b"second payload!".as_slice())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second_path = body["file_path"].as_str().unwrap().to_string();
    assert_ne!(first_path, second_path);
    assert!(!ctx.state.attachments.exists(&first_path).await);
    assert!(ctx.state.attachments.exists(&second_path).await);

    let (status, headers, bytes) =
        request_raw(&ctx.app, "GET", &format!("/products/{id}/download")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"second payload!");
    let disposition = headers
        .get("content-disposition")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(disposition.contains("installer-v2.zip"));
}

#[tokio::test]
async fn update_without_new_file_keeps_attachment() {
    let ctx = build_test_context().await;

    let (_, body) = request_multipart(
        &ctx.app,
        "POST",
        "/products",
        &[("name", "Core"), ("version", "v1.0.0")],
        Some(("manual.pdf", b"%PDF-1.4".as_slice())),
    )
    .await;
    let id = body["id"].as_i64().unwrap();
    let path = body["file_path"].as_str().unwrap().to_string();

    let (status, body) = request_multipart(
        &ctx.app,
        "PUT",
        &format!("/products/{id}"),
        &[("name", "Core"), ("version", "v1.0.1")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["file_path"], path.as_str());
    assert!(ctx.state.attachments.exists(&path).await);

    let (status, _, bytes) =
        request_raw(&ctx.app, "GET", &format!("/products/{id}/download")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"%PDF-1.4");
}

#[tokio::test]
async fn delete_product_removes_stored_file() {
    let ctx = build_test_context().await;

    let (_, body) = request_multipart(
        &ctx.app,
        "POST",
        "/products",
        &[("name", "Core"), ("version", "v1.0.0")],
        Some(("setup.exe", b"MZ binary".as_slice())),
    )
    .await;
    let id = body["id"].as_i64().unwrap();
    let path = body["file_path"].as_str().unwrap().to_string();
    assert!(ctx.state.attachments.exists(&path).await);

    let (status, _) = request_no_body(&ctx.app, "DELETE", &format!("/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!ctx.state.attachments.exists(&path).await);
}
