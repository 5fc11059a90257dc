use crate::api::{bad_request, not_found, store_error, ErrorResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lichub_common::types::{
    ChannelDetail, ChannelInput, ChannelListItem, ChannelType, CustomerOption, ProductOption,
};
use lichub_storage::store::NewChannel;
use serde_json::{json, Value};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Resolve the wire payload into a validated write, naming the violated
/// rule on failure.
fn validate_channel_input(input: ChannelInput) -> Result<NewChannel, ErrorResponse> {
    let name = input
        .name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request("channel name and type are required"))?;
    let type_str = input
        .channel_type
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request("channel name and type are required"))?;
    let channel_type: ChannelType = type_str
        .parse()
        .map_err(|_| bad_request(&format!("unknown channel type: {type_str}")))?;
    Ok(NewChannel {
        name,
        channel_type,
        description: input.description,
        contact_person: input.contact_person,
        contact_phone: input.contact_phone,
        contact_email: input.contact_email,
        customer_ids: input.customer_ids,
        product_ids: input.product_ids,
    })
}

/// List channels with aggregated customer/product names.
#[utoipa::path(
    get,
    path = "/channels",
    tag = "Channels",
    responses(
        (status = 200, description = "Channel list", body = Vec<ChannelListItem>),
        (status = 500, description = "Server error", body = crate::api::ApiError)
    )
)]
async fn list_channels(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChannelListItem>>, ErrorResponse> {
    state
        .store
        .list_channels()
        .await
        .map(Json)
        .map_err(|e| store_error("list channels", e))
}

/// Channel detail with expanded customers and products.
#[utoipa::path(
    get,
    path = "/channels/{id}",
    tag = "Channels",
    params(("id" = i64, Path, description = "Channel id")),
    responses(
        (status = 200, description = "Channel detail", body = ChannelDetail),
        (status = 404, description = "Channel not found", body = crate::api::ApiError)
    )
)]
async fn get_channel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ChannelDetail>, ErrorResponse> {
    match state.store.get_channel(id).await {
        Ok(Some(detail)) => Ok(Json(detail)),
        Ok(None) => Err(not_found(&format!("channel with id {id} not found"))),
        Err(e) => Err(store_error("get channel", e)),
    }
}

/// Create a channel together with its associations.
#[utoipa::path(
    post,
    path = "/channels",
    tag = "Channels",
    request_body = ChannelInput,
    responses(
        (status = 201, description = "Channel created"),
        (status = 400, description = "Validation error", body = crate::api::ApiError)
    )
)]
async fn create_channel(
    State(state): State<AppState>,
    Json(input): Json<ChannelInput>,
) -> Result<(StatusCode, Json<Value>), ErrorResponse> {
    let new = validate_channel_input(input)?;
    let id = state
        .store
        .insert_channel(&new)
        .await
        .map_err(|e| store_error("create channel", e))?;
    tracing::info!(id, name = %new.name, "channel created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "channel created" })),
    ))
}

/// Update a channel; the submitted association lists replace the stored
/// ones in full.
#[utoipa::path(
    put,
    path = "/channels/{id}",
    tag = "Channels",
    request_body = ChannelInput,
    params(("id" = i64, Path, description = "Channel id")),
    responses(
        (status = 200, description = "Channel updated"),
        (status = 400, description = "Validation error", body = crate::api::ApiError),
        (status = 404, description = "Channel not found", body = crate::api::ApiError)
    )
)]
async fn update_channel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<ChannelInput>,
) -> Result<Json<Value>, ErrorResponse> {
    // Existence first: updating an unknown id is a 404 regardless of
    // what the payload looks like.
    if !state
        .store
        .channel_exists(id)
        .await
        .map_err(|e| store_error("update channel", e))?
    {
        return Err(not_found(&format!("channel with id {id} not found")));
    }
    let new = validate_channel_input(input)?;
    state
        .store
        .update_channel(id, &new)
        .await
        .map_err(|e| store_error("update channel", e))?;
    tracing::info!(id, "channel updated");
    Ok(Json(json!({ "message": "channel updated" })))
}

/// Delete a channel and its association rows.
#[utoipa::path(
    delete,
    path = "/channels/{id}",
    tag = "Channels",
    params(("id" = i64, Path, description = "Channel id")),
    responses(
        (status = 200, description = "Channel deleted"),
        (status = 404, description = "Channel not found", body = crate::api::ApiError)
    )
)]
async fn delete_channel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ErrorResponse> {
    state
        .store
        .delete_channel(id)
        .await
        .map_err(|e| store_error("delete channel", e))?;
    tracing::info!(id, "channel deleted");
    Ok(Json(json!({ "message": "channel deleted" })))
}

/// Customers available for channel association, ordered by name.
#[utoipa::path(
    get,
    path = "/channels/available/customers",
    tag = "Channels",
    responses(
        (status = 200, description = "Customer options", body = Vec<CustomerOption>)
    )
)]
async fn channel_customer_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerOption>>, ErrorResponse> {
    state
        .store
        .customer_options()
        .await
        .map(Json)
        .map_err(|e| store_error("list customer options", e))
}

/// Products available for channel association, ordered by name.
#[utoipa::path(
    get,
    path = "/channels/available/products",
    tag = "Channels",
    responses(
        (status = 200, description = "Product options", body = Vec<ProductOption>)
    )
)]
async fn channel_product_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductOption>>, ErrorResponse> {
    state
        .store
        .product_options()
        .await
        .map(Json)
        .map_err(|e| store_error("list product options", e))
}

pub fn channel_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_channels))
        .routes(routes!(create_channel))
        .routes(routes!(get_channel))
        .routes(routes!(update_channel))
        .routes(routes!(delete_channel))
        .routes(routes!(channel_customer_options))
        .routes(routes!(channel_product_options))
}
