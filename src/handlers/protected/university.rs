// handlers/protected/university.rs - /university/* handlers

use axum::extract::State;

use crate::api::format::{views, IdView, UniversityView};
use crate::api::requests::{IdRequest, UniversityInput, UniversityNameRequest, UpdateUniversityRequest};
use crate::api::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::parse_id;
use crate::state::AppState;

/// POST /university/create
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UniversityInput>,
) -> ApiResult<IdView> {
    let university = state.universities.create(input.into()).await?;
    Ok(ApiResponse::success("University created successfully", IdView::new(&university.id)))
}

/// POST /university/update
pub async fn update(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateUniversityRequest>,
) -> ApiResult<UniversityView> {
    let id = parse_id(&req.id)?;
    let university = state.universities.update(&id, req.university.into()).await?;
    Ok(ApiResponse::success("University updated successfully", university.into()))
}

/// POST /university/delete
pub async fn delete(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<IdRequest>,
) -> ApiResult<()> {
    state.universities.delete(&req.object_id()?).await?;
    Ok(ApiResponse::message("University deleted successfully"))
}

/// POST /university/id
pub async fn get(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<IdRequest>,
) -> ApiResult<UniversityView> {
    let university = state.universities.get(&req.object_id()?).await?;
    Ok(ApiResponse::success("University fetched successfully", university.into()))
}

/// POST /university/name - Case-insensitive exact name lookup
pub async fn by_name(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UniversityNameRequest>,
) -> ApiResult<UniversityView> {
    let university = state.universities.by_name(&req.name).await?;
    Ok(ApiResponse::success("University fetched successfully", university.into()))
}

/// POST /university/all
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<UniversityView>> {
    let universities = state.universities.list().await?;
    Ok(ApiResponse::success("Universities fetched successfully", views(universities)))
}
