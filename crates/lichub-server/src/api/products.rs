use crate::api::{bad_request, internal_error, not_found, store_error, ErrorResponse};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::Response;
use axum::Json;
use bytes::Bytes;
use lichub_common::types::{AttachmentMeta, Product, ProductInput};
use lichub_storage::attachments::{AttachmentStore, MAX_FILE_SIZE};
use lichub_storage::store::NewProduct;
use serde_json::{json, Value};
use utoipa_axum::{router::OpenApiRouter, routes};

/// Parse the multipart form: text fields `name`, `version`,
/// `description` plus an optional binary `file` field. Unknown fields
/// are ignored.
async fn parse_product_form(
    multipart: &mut Multipart,
) -> Result<(ProductInput, Option<(String, Bytes)>), ErrorResponse> {
    let mut input = ProductInput::default();
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(&format!("invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "name" => {
                input.name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(&format!("invalid field 'name': {e}")))?,
                );
            }
            "version" => {
                input.version = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(&format!("invalid field 'version': {e}")))?,
                );
            }
            "description" => {
                input.description = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| bad_request(&format!("invalid field 'description': {e}")))?,
                );
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                if file_name.is_empty() {
                    return Err(bad_request("uploaded file must have a filename"));
                }
                if !AttachmentStore::extension_allowed(&file_name) {
                    return Err(bad_request("unsupported file type"));
                }
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(&format!("failed to read upload: {e}")))?;
                if data.len() > MAX_FILE_SIZE {
                    return Err(bad_request("file exceeds the 100MB limit"));
                }
                upload = Some((file_name, data));
            }
            _ => {}
        }
    }

    Ok((input, upload))
}

fn validate_product_input(input: ProductInput) -> Result<NewProduct, ErrorResponse> {
    let name = input
        .name
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request("product name and version are required"))?;
    let version = input
        .version
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| bad_request("product name and version are required"))?;
    Ok(NewProduct {
        name,
        version,
        description: input.description,
    })
}

/// Write an upload to attachment storage before any row is committed.
async fn store_upload(
    state: &AppState,
    upload: Option<(String, Bytes)>,
) -> Result<Option<AttachmentMeta>, ErrorResponse> {
    match upload {
        Some((file_name, data)) => {
            let meta = state
                .attachments
                .save(&file_name, data)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, file_name = %file_name, "failed to store upload");
                    internal_error()
                })?;
            Ok(Some(meta))
        }
        None => Ok(None),
    }
}

/// Best-effort removal of a stored file; failures are logged, never
/// surfaced.
async fn discard_file(state: &AppState, stored_path: &str) {
    if let Err(e) = state.attachments.delete(stored_path).await {
        tracing::warn!(error = %e, path = %stored_path, "failed to remove attachment file");
    }
}

/// List all products, newest first.
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    responses(
        (status = 200, description = "Product list", body = Vec<Product>),
        (status = 500, description = "Server error", body = crate::api::ApiError)
    )
)]
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>, ErrorResponse> {
    state
        .store
        .list_products()
        .await
        .map(Json)
        .map_err(|e| store_error("list products", e))
}

/// Product detail.
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product detail", body = Product),
        (status = 404, description = "Product not found", body = crate::api::ApiError)
    )
)]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Product>, ErrorResponse> {
    match state.store.get_product(id).await {
        Ok(Some(product)) => Ok(Json(product)),
        Ok(None) => Err(not_found(&format!("product with id {id} not found"))),
        Err(e) => Err(store_error("get product", e)),
    }
}

/// Create a product from a multipart form, optionally with an attached
/// binary. The file is written first; if the row insert fails the file
/// is removed again so storage holds no orphans.
#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Validation error", body = crate::api::ApiError)
    )
)]
async fn create_product(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Product>), ErrorResponse> {
    let (input, upload) = parse_product_form(&mut multipart).await?;
    let new = validate_product_input(input)?;
    let attachment = store_upload(&state, upload).await?;

    match state.store.insert_product(&new, attachment.as_ref()).await {
        Ok(product) => {
            tracing::info!(id = product.id, name = %product.name, "product created");
            Ok((StatusCode::CREATED, Json(product)))
        }
        Err(e) => {
            if let Some(a) = &attachment {
                discard_file(&state, &a.file_path).await;
            }
            Err(store_error("create product", e))
        }
    }
}

/// Update a product. When a new file is submitted it replaces the
/// previous attachment: the new file is written, the row committed, and
/// only then is the old file deleted.
#[utoipa::path(
    put,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Validation error", body = crate::api::ApiError),
        (status = 404, description = "Product not found", body = crate::api::ApiError)
    )
)]
async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> Result<Json<Product>, ErrorResponse> {
    let Some(existing) = state
        .store
        .get_product(id)
        .await
        .map_err(|e| store_error("get product", e))?
    else {
        return Err(not_found(&format!("product with id {id} not found")));
    };

    let (input, upload) = parse_product_form(&mut multipart).await?;
    let new = validate_product_input(input)?;
    let attachment = store_upload(&state, upload).await?;

    match state.store.update_product(id, &new, attachment.as_ref()).await {
        Ok(product) => {
            // The row now points at the new file; the old one is safe to drop.
            if attachment.is_some() {
                if let Some(old_path) = &existing.file_path {
                    discard_file(&state, old_path).await;
                }
            }
            tracing::info!(id, "product updated");
            Ok(Json(product))
        }
        Err(e) => {
            if let Some(a) = &attachment {
                discard_file(&state, &a.file_path).await;
            }
            Err(store_error("update product", e))
        }
    }
}

/// Delete a product, its association rows, and its attachment file.
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "Product not found", body = crate::api::ApiError)
    )
)]
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ErrorResponse> {
    let removed = state
        .store
        .delete_product(id)
        .await
        .map_err(|e| store_error("delete product", e))?;
    if let Some(path) = &removed.file_path {
        discard_file(&state, path).await;
    }
    tracing::info!(id, "product deleted");
    Ok(Json(json!({ "message": "product deleted" })))
}

/// Download a product's attachment under its original filename.
#[utoipa::path(
    get,
    path = "/products/{id}/download",
    tag = "Products",
    params(("id" = i64, Path, description = "Product id")),
    responses(
        (status = 200, description = "Attachment bytes"),
        (status = 404, description = "Product or file not found", body = crate::api::ApiError)
    )
)]
async fn download_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, ErrorResponse> {
    let product = match state.store.get_product(id).await {
        Ok(Some(p)) => p,
        Ok(None) => return Err(not_found(&format!("product with id {id} not found"))),
        Err(e) => return Err(store_error("get product", e)),
    };
    let Some(stored_path) = product.file_path.as_deref() else {
        return Err(not_found("product has no attachment"));
    };

    let data = match state.attachments.read(stored_path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(id, path = %stored_path, "attachment file missing from storage");
            return Err(not_found("attachment file not found"));
        }
        Err(e) => {
            tracing::error!(error = %e, id, "failed to read attachment");
            return Err(internal_error());
        }
    };

    // Strip characters that would break the Content-Disposition header.
    let filename: String = product
        .file_name
        .as_deref()
        .unwrap_or("download")
        .chars()
        .filter(|c| !c.is_control() && *c != '"')
        .collect();

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "application/octet-stream")
        .header(CONTENT_LENGTH, data.len())
        .header(
            CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .body(Body::from(data))
        .map_err(|e| {
            tracing::error!(error = %e, id, "failed to build download response");
            internal_error()
        })
}

pub fn product_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_products))
        .routes(routes!(create_product))
        .routes(routes!(get_product))
        .routes(routes!(update_product))
        .routes(routes!(delete_product))
        .routes(routes!(download_product))
}
