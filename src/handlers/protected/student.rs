// handlers/protected/student.rs - /student/* JSON handlers

use axum::extract::State;

use crate::api::format::{ProgressView, StudentView, TrackRecordView};
use crate::api::requests::{
    AddLobbyRequest, AddServiceRequest, DeleteServiceRequest, IdRequest, StudentInput,
    StudentListRequest, UpdateServiceRequest, UpdateStudentRequest,
};
use crate::api::JsonBody;
use crate::filter::Paged;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::parse_id;
use crate::state::AppState;

/// POST /student/create
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<StudentInput>,
) -> ApiResult<StudentView> {
    let student = state.students.create(input.into()).await?;
    Ok(ApiResponse::created("Student created successfully", student.into()))
}

/// POST /student/all - Filtered, paginated listing
pub async fn list(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<StudentListRequest>,
) -> ApiResult<Paged<StudentView>> {
    let page = req.page();
    let students = state.students.list(&req.filter, page).await?;
    Ok(ApiResponse::success(
        "Students fetched successfully",
        students.map(StudentView::from),
    ))
}

/// POST /student/id
pub async fn get(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<IdRequest>,
) -> ApiResult<StudentView> {
    let student = state.students.get(&req.object_id()?).await?;
    Ok(ApiResponse::success("Students fetched successfully", student.into()))
}

/// POST /student/delete
pub async fn delete(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<IdRequest>,
) -> ApiResult<()> {
    state.students.delete(&req.object_id()?).await?;
    Ok(ApiResponse::message("Student deleted successfully"))
}

/// POST /student/deactivate
pub async fn deactivate(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<IdRequest>,
) -> ApiResult<()> {
    state.students.deactivate(&req.object_id()?).await?;
    Ok(ApiResponse::message("Student deactivated successfully"))
}

/// POST /student/activated-all
pub async fn activate_all(State(state): State<AppState>) -> ApiResult<()> {
    let count = state.students.activate_all().await?;
    tracing::info!("Activated {} students", count);
    Ok(ApiResponse::message("Activate All Student Successfully"))
}

/// POST /student/update
pub async fn update(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateStudentRequest>,
) -> ApiResult<StudentView> {
    let id = parse_id(&req.id)?;
    let student = state.students.update(&id, req.student.into()).await?;
    Ok(ApiResponse::success("Student updated successfully", student.into()))
}

/// POST /student/add-service
pub async fn add_service(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AddServiceRequest>,
) -> ApiResult<TrackRecordView> {
    let id = parse_id(&req.id)?;
    let record = state.students.add_service(&id, req.service).await?;
    Ok(ApiResponse::success("Service added to student successfully", record.into()))
}

/// POST /student/update-service
pub async fn update_service(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateServiceRequest>,
) -> ApiResult<TrackRecordView> {
    let id = parse_id(&req.id)?;
    let record = state
        .students
        .update_service(&id, &req.old_name, req.service)
        .await?;
    Ok(ApiResponse::success("Service updated successfully", record.into()))
}

/// POST /student/delete-service
pub async fn delete_service(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<DeleteServiceRequest>,
) -> ApiResult<()> {
    let id = parse_id(&req.id)?;
    state.students.delete_service(&id, &req.service_name).await?;
    Ok(ApiResponse::message("Service deleted successfully"))
}

/// POST /student/add-lobby - Append to the progress history
pub async fn add_lobby(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AddLobbyRequest>,
) -> ApiResult<ProgressView> {
    let id = parse_id(&req.id)?;
    let lobby = state.students.add_lobby(&id, &req.lobby.progress).await?;
    Ok(ApiResponse::success(
        "Lobby Proggress added to student successfully",
        ProgressView { progress: lobby.progress },
    ))
}
