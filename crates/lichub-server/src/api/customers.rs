use crate::api::{bad_request, not_found, store_error, ErrorResponse};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use lichub_common::types::{
    ChannelOption, CustomerDetail, CustomerInput, CustomerListItem, ProductOption,
};
use lichub_storage::store::NewCustomer;
use serde_json::{json, Value};
use utoipa_axum::{router::OpenApiRouter, routes};

fn validate_customer_input(input: CustomerInput) -> Result<NewCustomer, ErrorResponse> {
    let name = input
        .name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request("customer name is required"))?;
    Ok(NewCustomer {
        name,
        industry: input.industry,
        contact_person: input.contact_person,
        contact_phone: input.contact_phone,
        contact_email: input.contact_email,
        address: input.address,
        delivery_person: input.delivery_person,
        deployment_plan: input.deployment_plan,
        channel_ids: input.channel_ids,
        product_ids: input.product_ids,
    })
}

/// List customers with aggregated names and license counts.
#[utoipa::path(
    get,
    path = "/customers",
    tag = "Customers",
    responses(
        (status = 200, description = "Customer list", body = Vec<CustomerListItem>),
        (status = 500, description = "Server error", body = crate::api::ApiError)
    )
)]
async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerListItem>>, ErrorResponse> {
    state
        .store
        .list_customers()
        .await
        .map(Json)
        .map_err(|e| store_error("list customers", e))
}

/// Customer detail with expanded channels, products, and licenses.
#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer detail", body = CustomerDetail),
        (status = 404, description = "Customer not found", body = crate::api::ApiError)
    )
)]
async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CustomerDetail>, ErrorResponse> {
    match state.store.get_customer(id).await {
        Ok(Some(detail)) => Ok(Json(detail)),
        Ok(None) => Err(not_found(&format!("customer with id {id} not found"))),
        Err(e) => Err(store_error("get customer", e)),
    }
}

/// Create a customer together with its associations.
#[utoipa::path(
    post,
    path = "/customers",
    tag = "Customers",
    request_body = CustomerInput,
    responses(
        (status = 201, description = "Customer created"),
        (status = 400, description = "Validation error", body = crate::api::ApiError)
    )
)]
async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<CustomerInput>,
) -> Result<(StatusCode, Json<Value>), ErrorResponse> {
    let new = validate_customer_input(input)?;
    let id = state
        .store
        .insert_customer(&new)
        .await
        .map_err(|e| store_error("create customer", e))?;
    tracing::info!(id, name = %new.name, "customer created");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": id, "message": "customer created" })),
    ))
}

/// Update a customer; association lists replace in full.
#[utoipa::path(
    put,
    path = "/customers/{id}",
    tag = "Customers",
    request_body = CustomerInput,
    params(("id" = i64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer updated"),
        (status = 400, description = "Validation error", body = crate::api::ApiError),
        (status = 404, description = "Customer not found", body = crate::api::ApiError)
    )
)]
async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<CustomerInput>,
) -> Result<Json<Value>, ErrorResponse> {
    // Existence first: updating an unknown id is a 404 regardless of
    // what the payload looks like.
    if !state
        .store
        .customer_exists(id)
        .await
        .map_err(|e| store_error("update customer", e))?
    {
        return Err(not_found(&format!("customer with id {id} not found")));
    }
    let new = validate_customer_input(input)?;
    state
        .store
        .update_customer(id, &new)
        .await
        .map_err(|e| store_error("update customer", e))?;
    tracing::info!(id, "customer updated");
    Ok(Json(json!({ "message": "customer updated" })))
}

/// Delete a customer, its licenses, and its association rows.
#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "Customers",
    params(("id" = i64, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer deleted"),
        (status = 404, description = "Customer not found", body = crate::api::ApiError)
    )
)]
async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ErrorResponse> {
    state
        .store
        .delete_customer(id)
        .await
        .map_err(|e| store_error("delete customer", e))?;
    tracing::info!(id, "customer deleted");
    Ok(Json(json!({ "message": "customer deleted" })))
}

/// Channels available for customer association, ordered by name.
#[utoipa::path(
    get,
    path = "/customers/available/channels",
    tag = "Customers",
    responses(
        (status = 200, description = "Channel options", body = Vec<ChannelOption>)
    )
)]
async fn customer_channel_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChannelOption>>, ErrorResponse> {
    state
        .store
        .channel_options()
        .await
        .map(Json)
        .map_err(|e| store_error("list channel options", e))
}

/// Products available for customer association, ordered by name.
#[utoipa::path(
    get,
    path = "/customers/available/products",
    tag = "Customers",
    responses(
        (status = 200, description = "Product options", body = Vec<ProductOption>)
    )
)]
async fn customer_product_options(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductOption>>, ErrorResponse> {
    state
        .store
        .product_options()
        .await
        .map(Json)
        .map_err(|e| store_error("list product options", e))
}

pub fn customer_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_customers))
        .routes(routes!(create_customer))
        .routes(routes!(get_customer))
        .routes(routes!(update_customer))
        .routes(routes!(delete_customer))
        .routes(routes!(customer_channel_options))
        .routes(routes!(customer_product_options))
}
