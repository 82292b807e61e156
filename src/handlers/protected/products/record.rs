use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};

use crate::api::ProductView;
use crate::database::models::ProductInput;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// PUT /products/:id - Update a product
///
/// Fields left out of the body keep their current values; the merged record
/// is validated as a whole.
pub async fn put(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<ProductInput>, JsonRejection>,
) -> ApiResult<ProductView> {
    let Path(id) = path?;
    let Json(input) = payload?;
    let product = state.catalog.update(&id, input).await?;
    Ok(ApiResponse::success(product))
}

/// DELETE /products/:id - Delete a product by ID
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = path?;
    state.catalog.delete(&id).await?;
    Ok(ApiResponse::no_content())
}
