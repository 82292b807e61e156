use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::AccountView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Credentials;
use crate::state::AppState;

/// POST /auth/register - Create a new account
///
/// Expected Input:
/// ```json
/// { "username": "alice", "password": "s3cret" }
/// ```
///
/// Responds 201 with `{ "id": "...", "username": "alice" }`, 400 when a field
/// is missing and 409 when the username is taken.
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<AccountView> {
    let Json(credentials) = payload?;
    let account = state.accounts.register(credentials).await?;
    Ok(ApiResponse::created(account))
}
