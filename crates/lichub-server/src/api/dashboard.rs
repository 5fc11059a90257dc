use crate::api::{store_error, ErrorResponse};
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use lichub_common::expiry;
use lichub_common::types::LicenseStatus;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Dashboard overview data
#[derive(Serialize, ToSchema)]
struct DashboardOverview {
    /// Total products
    products: u64,
    /// Total channels
    channels: u64,
    /// Total customers
    customers: u64,
    /// Total licenses
    licenses: u64,
    /// License counts by lifecycle status
    license_summary: LicenseSummary,
    /// Service uptime in seconds
    uptime_secs: i64,
}

#[derive(Serialize, ToSchema)]
struct LicenseSummary {
    total: u64,
    normal: u64,
    warning: u64,
    critical: u64,
    expired: u64,
}

/// Entity counts and license status aggregates, classified with the
/// same rules the license endpoints use.
#[utoipa::path(
    get,
    path = "/dashboard/overview",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Dashboard overview", body = DashboardOverview),
        (status = 500, description = "Server error", body = crate::api::ApiError)
    )
)]
async fn dashboard_overview(
    State(state): State<AppState>,
) -> Result<Json<DashboardOverview>, ErrorResponse> {
    let products = state
        .store
        .count_products()
        .await
        .map_err(|e| store_error("count products", e))?;
    let channels = state
        .store
        .count_channels()
        .await
        .map_err(|e| store_error("count channels", e))?;
    let customers = state
        .store
        .count_customers()
        .await
        .map_err(|e| store_error("count customers", e))?;

    let records = state
        .store
        .list_licenses()
        .await
        .map_err(|e| store_error("list licenses", e))?;

    let now = Utc::now();
    let mut summary = LicenseSummary {
        total: records.len() as u64,
        normal: 0,
        warning: 0,
        critical: 0,
        expired: 0,
    };
    for record in &records {
        let (_, status) = expiry::classify(record.end_date, now);
        match status {
            LicenseStatus::Normal => summary.normal += 1,
            LicenseStatus::Warning => summary.warning += 1,
            LicenseStatus::Critical => summary.critical += 1,
            LicenseStatus::Expired => summary.expired += 1,
        }
    }

    let uptime = (Utc::now() - state.start_time).num_seconds();

    Ok(Json(DashboardOverview {
        products,
        channels,
        customers,
        licenses: summary.total,
        license_summary: summary,
        uptime_secs: uptime,
    }))
}

pub fn dashboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(dashboard_overview))
}
