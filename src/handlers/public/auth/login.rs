use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::api::TokenView;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::Credentials;
use crate::state::AppState;

/// POST /auth/login - Authenticate user and receive JWT token
///
/// Expected Input:
/// ```json
/// { "username": "alice", "password": "s3cret" }
/// ```
///
/// Expected Output (Success):
/// ```json
/// { "token": "eyJhbGciOiJIUzI1NiI...", "tokenType": "Bearer", "expiresIn": 86400 }
/// ```
pub async fn post(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> ApiResult<TokenView> {
    let Json(credentials) = payload?;
    let token = state.accounts.login(credentials).await?;
    Ok(ApiResponse::success(token))
}
