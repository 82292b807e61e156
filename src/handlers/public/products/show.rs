use axum::extract::{rejection::PathRejection, Path, State};

use crate::api::ProductView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /products/:id - Get a single product by ID
pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<ProductView> {
    let Path(id) = path?;
    let product = state.catalog.get(&id).await?;
    Ok(ApiResponse::success(product))
}
