use axum::extract::{rejection::QueryRejection, Query, State};

use crate::api::ProductPage;
use crate::filter::ListParams;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /products - Paginated, filtered product listing
///
/// Query parameters: `page` (default 1), `limit` (default 10), `name`
/// (case-insensitive substring), `minPrice`, `maxPrice`.
pub async fn get(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<ProductPage> {
    let Query(params) = query?;
    let page = state.catalog.list(&params).await?;
    Ok(ApiResponse::success(page))
}
