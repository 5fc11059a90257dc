use crate::api::{bad_request, not_found, store_error, ErrorResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use lichub_common::types::{CustomerOption, LicenseInput, LicenseView};
use lichub_storage::store::NewLicense;
use serde_json::{json, Value};
use utoipa_axum::{router::OpenApiRouter, routes};

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ErrorResponse> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| bad_request(&format!("{field} must be a YYYY-MM-DD date")))
}

/// Resolve the wire payload into a validated write. Date ordering and
/// the non-negative points rule are checked here; the owning customer's
/// existence is checked inside the store transaction.
fn validate_license_input(input: LicenseInput) -> Result<NewLicense, ErrorResponse> {
    const REQUIRED: &str = "customer_id, license_object, start_date and end_date are required";
    let customer_id = input.customer_id.ok_or_else(|| bad_request(REQUIRED))?;
    let license_object = input
        .license_object
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request(REQUIRED))?;
    let start_raw = input.start_date.ok_or_else(|| bad_request(REQUIRED))?;
    let end_raw = input.end_date.ok_or_else(|| bad_request(REQUIRED))?;
    let start_date = parse_date("start_date", &start_raw)?;
    let end_date = parse_date("end_date", &end_raw)?;
    if end_date <= start_date {
        return Err(bad_request("end_date must be after start_date"));
    }
    let valid_points = input.valid_points.unwrap_or(0);
    if valid_points < 0 {
        return Err(bad_request("valid_points must be non-negative"));
    }
    Ok(NewLicense {
        customer_id,
        license_object,
        start_date,
        end_date,
        feature_code: input.feature_code,
        valid_points,
        description: input.description,
    })
}

/// List licenses joined with customer fields and classified against the
/// current time.
#[utoipa::path(
    get,
    path = "/licenses",
    tag = "Licenses",
    responses(
        (status = 200, description = "License list", body = Vec<LicenseView>),
        (status = 500, description = "Server error", body = crate::api::ApiError)
    )
)]
async fn list_licenses(
    State(state): State<AppState>,
) -> Result<Json<Vec<LicenseView>>, ErrorResponse> {
    let records = state
        .store
        .list_licenses()
        .await
        .map_err(|e| store_error("list licenses", e))?;
    let now = Utc::now();
    Ok(Json(
        records
            .into_iter()
            .map(|r| LicenseView::classified(r, now))
            .collect(),
    ))
}

/// License detail.
#[utoipa::path(
    get,
    path = "/licenses/{id}",
    tag = "Licenses",
    params(("id" = i64, Path, description = "License id")),
    responses(
        (status = 200, description = "License detail", body = LicenseView),
        (status = 404, description = "License not found", body = crate::api::ApiError)
    )
)]
async fn get_license(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LicenseView>, ErrorResponse> {
    match state.store.get_license(id).await {
        Ok(Some(record)) => Ok(Json(LicenseView::classified(record, Utc::now()))),
        Ok(None) => Err(not_found(&format!("license with id {id} not found"))),
        Err(e) => Err(store_error("get license", e)),
    }
}

/// Licenses owned by one customer, newest first.
#[utoipa::path(
    get,
    path = "/licenses/customer/{customer_id}",
    tag = "Licenses",
    params(("customer_id" = i64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer's licenses", body = Vec<LicenseView>)
    )
)]
async fn licenses_by_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<i64>,
) -> Result<Json<Vec<LicenseView>>, ErrorResponse> {
    let records = state
        .store
        .licenses_by_customer(customer_id)
        .await
        .map_err(|e| store_error("list customer licenses", e))?;
    let now = Utc::now();
    Ok(Json(
        records
            .into_iter()
            .map(|r| LicenseView::classified(r, now))
            .collect(),
    ))
}

/// Create a license. Rejects an unknown customer and a non-positive
/// date range with validation errors.
#[utoipa::path(
    post,
    path = "/licenses",
    tag = "Licenses",
    request_body = LicenseInput,
    responses(
        (status = 201, description = "License created"),
        (status = 400, description = "Validation error", body = crate::api::ApiError)
    )
)]
async fn create_license(
    State(state): State<AppState>,
    Json(input): Json<LicenseInput>,
) -> Result<(StatusCode, Json<Value>), ErrorResponse> {
    let new = validate_license_input(input)?;
    let id = state
        .store
        .insert_license(&new)
        .await
        .map_err(|e| store_error("create license", e))?;
    tracing::info!(id, customer_id = new.customer_id, "license created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "license created" })),
    ))
}

/// Update a license. Same validation rules as create.
#[utoipa::path(
    put,
    path = "/licenses/{id}",
    tag = "Licenses",
    request_body = LicenseInput,
    params(("id" = i64, Path, description = "License id")),
    responses(
        (status = 200, description = "License updated"),
        (status = 400, description = "Validation error", body = crate::api::ApiError),
        (status = 404, description = "License not found", body = crate::api::ApiError)
    )
)]
async fn update_license(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<LicenseInput>,
) -> Result<Json<Value>, ErrorResponse> {
    // Existence first: updating an unknown id is a 404 regardless of
    // what the payload looks like.
    if !state
        .store
        .license_exists(id)
        .await
        .map_err(|e| store_error("update license", e))?
    {
        return Err(not_found(&format!("license with id {id} not found")));
    }
    let new = validate_license_input(input)?;
    state
        .store
        .update_license(id, &new)
        .await
        .map_err(|e| store_error("update license", e))?;
    tracing::info!(id, "license updated");
    Ok(Json(json!({ "message": "license updated" })))
}

/// Delete a license.
#[utoipa::path(
    delete,
    path = "/licenses/{id}",
    tag = "Licenses",
    params(("id" = i64, Path, description = "License id")),
    responses(
        (status = 200, description = "License deleted"),
        (status = 404, description = "License not found", body = crate::api::ApiError)
    )
)]
async fn delete_license(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ErrorResponse> {
    state
        .store
        .delete_license(id)
        .await
        .map_err(|e| store_error("delete license", e))?;
    tracing::info!(id, "license deleted");
    Ok(Json(json!({ "message": "license deleted" })))
}

/// Licenses expiring within the next 30 days (inclusive), soonest
/// first. The window shares its boundaries with the classifier.
#[utoipa::path(
    get,
    path = "/licenses/expiring/soon",
    tag = "Licenses",
    responses(
        (status = 200, description = "Expiring licenses", body = Vec<LicenseView>)
    )
)]
async fn expiring_soon(
    State(state): State<AppState>,
) -> Result<Json<Vec<LicenseView>>, ErrorResponse> {
    let now = Utc::now();
    let records = state
        .store
        .licenses_expiring_soon(now.date_naive())
        .await
        .map_err(|e| store_error("list expiring licenses", e))?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| LicenseView::classified(r, now))
            .collect(),
    ))
}

/// Licenses whose end date has passed, most recently expired first.
#[utoipa::path(
    get,
    path = "/licenses/expired/all",
    tag = "Licenses",
    responses(
        (status = 200, description = "Expired licenses", body = Vec<LicenseView>)
    )
)]
async fn expired_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<LicenseView>>, ErrorResponse> {
    let now = Utc::now();
    let records = state
        .store
        .licenses_expired(now.date_naive())
        .await
        .map_err(|e| store_error("list expired licenses", e))?;
    Ok(Json(
        records
            .into_iter()
            .map(|r| LicenseView::classified(r, now))
            .collect(),
    ))
}

/// Customers available as license owners, ordered by name.
#[utoipa::path(
    get,
    path = "/licenses/available/customers",
    tag = "Licenses",
    responses(
        (status = 200, description = "Customer options", body = Vec<CustomerOption>)
    )
)]
async fn license_customer_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerOption>>, ErrorResponse> {
    state
        .store
        .customer_options()
        .await
        .map(Json)
        .map_err(|e| store_error("list customer options", e))
}

pub fn license_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_licenses))
        .routes(routes!(create_license))
        .routes(routes!(expiring_soon))
        .routes(routes!(expired_all))
        .routes(routes!(license_customer_options))
        .routes(routes!(licenses_by_customer))
        .routes(routes!(get_license))
        .routes(routes!(update_license))
        .routes(routes!(delete_license))
}
