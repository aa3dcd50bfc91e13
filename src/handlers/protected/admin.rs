// handlers/protected/admin.rs - /admin/create, /admin/profil, /admin/logout

use axum::{extract::State, Extension};

use crate::api::format::{AdminView, SessionView};
use crate::api::requests::CreateAdminRequest;
use crate::api::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{AuthContext, Session};
use crate::state::AppState;

/// POST /admin/create - Register another admin (local token check only)
pub async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateAdminRequest>,
) -> ApiResult<AdminView> {
    let admin = state.admins.register(req.into()).await?;
    Ok(ApiResponse::created("Admin created successfully", AdminView::from(&admin)))
}

/// POST /admin/profil - The admin owning the presented token
pub async fn profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<SessionView> {
    let session = match auth.admin {
        Some(admin) => Session { admin, token: auth.token },
        None => state.admins.profile(&auth.token).await?,
    };
    Ok(ApiResponse::success("Fetched admin profile successfully", session.into()))
}

/// POST /admin/logout - Revoke the stored token
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<()> {
    let admin = match auth.admin {
        Some(admin) => admin,
        None => state.admins.authenticate_stored(&auth.token).await?,
    };
    state.admins.logout(&admin).await?;
    Ok(ApiResponse::message("Logout successful"))
}
