pub mod channels;
pub mod customers;
pub mod dashboard;
pub mod licenses;
pub mod products;

use crate::state::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use lichub_storage::error::StoreError;
use serde::Serialize;
use serde_json::{json, Value};
use utoipa::ToSchema;
use utoipa_axum::{router::OpenApiRouter, routes};

/// Error body shape for every non-2xx response.
#[derive(Serialize, ToSchema)]
pub struct ApiError {
    pub error: String,
}

/// Handlers return this on failure; axum renders it as
/// `{"error": "..."}` with the given status.
pub(crate) type ErrorResponse = (StatusCode, Json<Value>);

pub(crate) fn bad_request(msg: &str) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": msg })))
}

pub(crate) fn not_found(msg: &str) -> ErrorResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": msg })))
}

/// Generic 500. The caller is expected to have logged the detail; the
/// wire carries nothing beyond this.
pub(crate) fn internal_error() -> ErrorResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal server error" })),
    )
}

/// Map a store failure onto the wire taxonomy: missing references are
/// validation failures (400), absent targets are 404, anything else is
/// logged server-side and surfaced as a generic 500.
pub(crate) fn store_error(context: &'static str, err: StoreError) -> ErrorResponse {
    match err {
        StoreError::NotFound { entity, id } => not_found(&format!("{entity} with id {id} not found")),
        StoreError::MissingReference { entity, id } => {
            bad_request(&format!("{entity} with id {id} does not exist"))
        }
        other => {
            tracing::error!(error = %other, context, "storage operation failed");
            internal_error()
        }
    }
}

/// Health check response
#[derive(Serialize, ToSchema)]
struct HealthResponse {
    /// Service version
    version: String,
    /// Uptime in seconds
    uptime_secs: i64,
    /// Database connectivity ("ok" or "unavailable")
    storage_status: String,
}

/// Service health: version, uptime, and database connectivity.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = (Utc::now() - state.start_time).num_seconds();
    let storage_status = match state.store.ping().await {
        Ok(()) => "ok".to_string(),
        Err(e) => {
            tracing::error!(error = %e, "storage ping failed");
            "unavailable".to_string()
        }
    };
    Json(HealthResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime,
        storage_status,
    })
}

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health))
        .merge(products::product_routes())
        .merge(channels::channel_routes())
        .merge(customers::customer_routes())
        .merge(licenses::license_routes())
        .merge(dashboard::dashboard_routes())
}
