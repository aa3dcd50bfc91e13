// handlers/public/admin.rs - POST /admin/login handler

use axum::extract::State;

use crate::api::format::SessionView;
use crate::api::requests::LoginRequest;
use crate::api::JsonBody;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /admin/login - Exchange username and password for a bearer token
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<SessionView> {
    let session = state
        .admins
        .login(&req.username, &req.password)
        .await
        .map_err(|e| {
            tracing::info!("Failed login for {}: {}", req.username, e);
            ApiError::from_login(e)
        })?;

    Ok(ApiResponse::success("Login successful", session.into()))
}
