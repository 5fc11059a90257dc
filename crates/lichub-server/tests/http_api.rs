mod common;

use axum::http::StatusCode;
use common::{
    build_test_context, create_channel, create_customer, create_license, date_from_today,
    request_json, request_no_body,
};
use serde_json::json;

#[tokio::test]
async fn health_reports_version_and_storage() {
    let ctx = build_test_context().await;
    let (status, body) = request_no_body(&ctx.app, "GET", "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["version"].is_string());
    assert_eq!(body["storage_status"], "ok");
}

#[tokio::test]
async fn channel_create_requires_name_and_type() {
    let ctx = build_test_context().await;

    let (status, body) = request_json(&ctx.app, "POST", "/channels", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("required"));

    let (status, body) = request_json(
        &ctx.app,
        "POST",
        "/channels",
        Some(json!({ "name": "East", "type": "carrier_pigeon" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("unknown channel type"));
}

#[tokio::test]
async fn channel_association_update_is_full_replace() {
    let ctx = build_test_context().await;

    let c1 = create_customer(&ctx.app, "Acme").await;
    let c2 = create_customer(&ctx.app, "Globex").await;
    let c3 = create_customer(&ctx.app, "Initech").await;
    let ch = create_channel(&ctx.app, "East Region", &[c1, c2]).await;

    // Full replace: [c1, c2] -> [c2, c3].
    let (status, _) = request_json(
        &ctx.app,
        "PUT",
        &format!("/channels/{ch}"),
        Some(json!({
            "name": "East Region",
            "type": "direct_sales",
            "customer_ids": [c2, c3],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request_no_body(&ctx.app, "GET", &format!("/channels/{ch}")).await;
    assert_eq!(status, StatusCode::OK);
    let mut ids: Vec<i64> = body["customers"]
        .as_array()
        .expect("customers should be an array")
        .iter()
        .map(|c| c["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![c2, c3]);
}

#[tokio::test]
async fn channel_list_aggregates_related_names() {
    let ctx = build_test_context().await;

    let c1 = create_customer(&ctx.app, "Acme").await;
    let c2 = create_customer(&ctx.app, "Globex").await;
    create_channel(&ctx.app, "East", &[c1, c2]).await;

    let (status, body) = request_no_body(&ctx.app, "GET", "/channels").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().expect("channel list should be an array");
    assert_eq!(rows.len(), 1);
    let names = rows[0]["customer_names"].as_str().unwrap_or_default();
    assert!(names.contains("Acme"));
    assert!(names.contains("Globex"));
}

#[tokio::test]
async fn channel_update_rejects_unknown_association_ids() {
    let ctx = build_test_context().await;
    let ch = create_channel(&ctx.app, "East", &[]).await;

    let (status, body) = request_json(
        &ctx.app,
        "PUT",
        &format!("/channels/{ch}"),
        Some(json!({
            "name": "East",
            "type": "direct_sales",
            "customer_ids": [999],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("does not exist"));
}

#[tokio::test]
async fn missing_channel_returns_not_found() {
    let ctx = build_test_context().await;

    let (status, body) = request_no_body(&ctx.app, "GET", "/channels/77").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = request_no_body(&ctx.app, "DELETE", "/channels/77").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn customer_delete_cascades_to_licenses_and_associations() {
    let ctx = build_test_context().await;

    let cu = create_customer(&ctx.app, "Acme").await;
    let ch = create_channel(&ctx.app, "East", &[cu]).await;
    create_license(&ctx.app, cu, "2024-01-01", "2024-12-31").await;
    create_license(&ctx.app, cu, "2024-01-01", "2025-06-30").await;

    let (status, _) = request_no_body(&ctx.app, "DELETE", &format!("/customers/{cu}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request_no_body(&ctx.app, "GET", &format!("/customers/{cu}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = request_no_body(&ctx.app, "GET", "/licenses").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (status, body) =
        request_no_body(&ctx.app, "GET", &format!("/licenses/customer/{cu}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().is_empty());

    let (_, body) = request_no_body(&ctx.app, "GET", &format!("/channels/{ch}")).await;
    assert!(body["customers"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn customer_list_reports_license_count() {
    let ctx = build_test_context().await;

    let with_licenses = create_customer(&ctx.app, "Acme").await;
    let without = create_customer(&ctx.app, "Globex").await;
    create_license(&ctx.app, with_licenses, "2024-01-01", "2024-12-31").await;
    create_license(&ctx.app, with_licenses, "2024-01-01", "2025-12-31").await;

    let (status, body) = request_no_body(&ctx.app, "GET", "/customers").await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    let count_of = |id: i64| {
        rows.iter()
            .find(|r| r["id"].as_i64() == Some(id))
            .map(|r| r["license_count"].as_i64().unwrap())
            .unwrap()
    };
    assert_eq!(count_of(with_licenses), 2);
    assert_eq!(count_of(without), 0);
}

#[tokio::test]
async fn license_rejects_invalid_date_range() {
    let ctx = build_test_context().await;
    let cu = create_customer(&ctx.app, "Acme").await;

    for end in ["2024-01-01", "2023-12-31"] {
        let (status, body) = request_json(
            &ctx.app,
            "POST",
            "/licenses",
            Some(json!({
                "customer_id": cu,
                "license_object": "core",
                "start_date": "2024-01-01",
                "end_date": end,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap_or_default()
            .contains("end_date must be after start_date"));
    }
}

#[tokio::test]
async fn license_rejects_unknown_customer_as_validation_error() {
    let ctx = build_test_context().await;

    let (status, body) = request_json(
        &ctx.app,
        "POST",
        "/licenses",
        Some(json!({
            "customer_id": 42,
            "license_object": "core",
            "start_date": "2024-01-01",
            "end_date": "2024-12-31",
        })),
    )
    .await;
    // A bad reference is a validation failure, not a 404.
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("does not exist"));
}

#[tokio::test]
async fn license_requires_all_mandatory_fields() {
    let ctx = build_test_context().await;

    let (status, body) = request_json(
        &ctx.app,
        "POST",
        "/licenses",
        Some(json!({ "license_object": "core" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("required"));
}

#[tokio::test]
async fn license_rejects_malformed_dates_and_negative_points() {
    let ctx = build_test_context().await;
    let cu = create_customer(&ctx.app, "Acme").await;

    let (status, body) = request_json(
        &ctx.app,
        "POST",
        "/licenses",
        Some(json!({
            "customer_id": cu,
            "license_object": "core",
            "start_date": "01/01/2024",
            "end_date": "2024-12-31",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("YYYY-MM-DD"));

    let (status, body) = request_json(
        &ctx.app,
        "POST",
        "/licenses",
        Some(json!({
            "customer_id": cu,
            "license_object": "core",
            "start_date": "2024-01-01",
            "end_date": "2024-12-31",
            "valid_points": -5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap_or_default()
        .contains("non-negative"));
}

#[tokio::test]
async fn license_update_and_delete_unknown_id_return_not_found() {
    let ctx = build_test_context().await;
    let cu = create_customer(&ctx.app, "Acme").await;

    let (status, _) = request_json(
        &ctx.app,
        "PUT",
        "/licenses/99",
        Some(json!({
            "customer_id": cu,
            "license_object": "core",
            "start_date": "2024-01-01",
            "end_date": "2024-12-31",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Existence wins over payload validation: a broken payload against
    // an unknown id is still a 404, not a 400.
    let (status, _) = request_json(
        &ctx.app,
        "PUT",
        "/licenses/99",
        Some(json!({
            "customer_id": cu,
            "license_object": "core",
            "start_date": "2024-12-31",
            "end_date": "2024-01-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request_no_body(&ctx.app, "DELETE", "/licenses/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn license_views_carry_classification() {
    let ctx = build_test_context().await;
    let cu = create_customer(&ctx.app, "Acme").await;
    let id = create_license(&ctx.app, cu, &date_from_today(-30), &date_from_today(5)).await;

    let (status, body) = request_no_body(&ctx.app, "GET", &format!("/licenses/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["days_left"].as_i64(), Some(5));
    assert_eq!(body["status"], "critical");
    assert_eq!(body["customer_name"], "Acme");
}

#[tokio::test]
async fn expiry_reports_use_the_classifier_windows() {
    let ctx = build_test_context().await;
    let cu = create_customer(&ctx.app, "Acme").await;

    let expired = create_license(&ctx.app, cu, &date_from_today(-40), &date_from_today(-1)).await;
    let critical = create_license(&ctx.app, cu, &date_from_today(-10), &date_from_today(5)).await;
    let warning = create_license(&ctx.app, cu, &date_from_today(-10), &date_from_today(30)).await;
    let normal = create_license(&ctx.app, cu, &date_from_today(-10), &date_from_today(60)).await;

    let (status, body) = request_no_body(&ctx.app, "GET", "/licenses/expiring/soon").await;
    assert_eq!(status, StatusCode::OK);
    let soon: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_i64().unwrap())
        .collect();
    // Ordered soonest first, window is [today, today+30] inclusive.
    assert_eq!(soon, vec![critical, warning]);
    assert!(!soon.contains(&expired));
    assert!(!soon.contains(&normal));

    let (status, body) = request_no_body(&ctx.app, "GET", "/licenses/expired/all").await;
    assert_eq!(status, StatusCode::OK);
    let expired_ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["id"].as_i64().unwrap())
        .collect();
    assert_eq!(expired_ids, vec![expired]);
    assert_eq!(body[0]["status"], "expired");
}

#[tokio::test]
async fn available_option_endpoints_are_sorted_by_name() {
    let ctx = build_test_context().await;

    create_customer(&ctx.app, "Zeta Corp").await;
    create_customer(&ctx.app, "Alpha Ltd").await;
    create_channel(&ctx.app, "East", &[]).await;

    for uri in [
        "/channels/available/customers",
        "/licenses/available/customers",
    ] {
        let (status, body) = request_no_body(&ctx.app, "GET", uri).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Alpha Ltd", "Zeta Corp"]);
    }

    let (status, body) = request_no_body(&ctx.app, "GET", "/customers/available/channels").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "East");
    assert_eq!(body[0]["type"], "direct_sales");
}

#[tokio::test]
async fn customer_detail_expands_relations() {
    let ctx = build_test_context().await;

    let cu = create_customer(&ctx.app, "Acme").await;
    create_channel(&ctx.app, "East", &[cu]).await;
    create_license(&ctx.app, cu, "2024-01-01", "2024-12-31").await;

    let (status, body) = request_no_body(&ctx.app, "GET", &format!("/customers/{cu}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["channels"].as_array().unwrap().len(), 1);
    assert_eq!(body["licenses"].as_array().unwrap().len(), 1);
    assert_eq!(body["channels"][0]["name"], "East");
}

#[tokio::test]
async fn dashboard_overview_aggregates_counts_and_statuses() {
    let ctx = build_test_context().await;

    let cu = create_customer(&ctx.app, "Acme").await;
    create_channel(&ctx.app, "East", &[cu]).await;
    create_license(&ctx.app, cu, &date_from_today(-40), &date_from_today(-1)).await;
    create_license(&ctx.app, cu, &date_from_today(-10), &date_from_today(60)).await;

    let (status, body) = request_no_body(&ctx.app, "GET", "/dashboard/overview").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["customers"].as_u64(), Some(1));
    assert_eq!(body["channels"].as_u64(), Some(1));
    assert_eq!(body["licenses"].as_u64(), Some(2));
    assert_eq!(body["license_summary"]["expired"].as_u64(), Some(1));
    assert_eq!(body["license_summary"]["normal"].as_u64(), Some(1));
}

#[tokio::test]
async fn responses_carry_trace_id_header() {
    let ctx = build_test_context().await;
    let (_, headers, _) = common::request_raw(&ctx.app, "GET", "/health").await;
    assert!(headers.contains_key("x-trace-id"));
}
