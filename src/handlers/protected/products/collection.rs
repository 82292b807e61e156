use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde_json::Value;

use crate::api::ProductView;
use crate::database::models::ProductInput;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

/// POST /products - Create a product
///
/// Expected Input:
/// ```json
/// { "name": "Widget", "price": 9.99, "quantity": 5 }
/// ```
pub async fn post(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<ProductView> {
    let Json(input) = payload?;
    let product = state.catalog.create(input).await?;

    tracing::debug!(product_id = %product.id, username = %user.username, "Product created via API");
    Ok(ApiResponse::created(product))
}

/// DELETE /products - Delete several products
///
/// Expected Input:
/// ```json
/// { "ids": ["67e55044-10b1-426f-9247-bb680e5fe0c8", "..."] }
/// ```
///
/// Every id is validated first; one malformed id fails the whole request
/// without deleting anything.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<()> {
    let Json(body) = payload?;
    let deleted = state.catalog.delete_many(&body).await?;

    tracing::debug!(deleted, username = %user.username, "Products deleted via API");
    Ok(ApiResponse::no_content())
}
