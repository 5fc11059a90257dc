use crate::state::AppState;
use crate::{api, logging};
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::middleware;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "lichub API",
        description = "Business entity and license management REST API",
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Products", description = "Product catalog and attachments"),
        (name = "Channels", description = "Sales channel management"),
        (name = "Customers", description = "Customer management"),
        (name = "Licenses", description = "License lifecycle and expiry reports"),
        (name = "Dashboard", description = "Aggregated overview")
    )
)]
struct ApiDoc;

pub fn build_http_app(state: AppState) -> Router {
    let (router, spec) = api::routes().split_for_parts();

    let mut merged_spec = ApiDoc::openapi();
    merged_spec.merge(spec);

    let cors = if state.config.cors_allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Leave headroom above the per-file cap for the multipart framing.
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes() + 1024 * 1024);

    router
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/v1/openapi.json", merged_spec))
        .layer(cors)
        .layer(body_limit)
        .layer(middleware::from_fn(logging::request_logging))
}
