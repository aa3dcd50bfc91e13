// handlers/protected/study_program.rs - /study-program/* JSON handlers

use axum::extract::State;

use crate::api::format::{IdView, StudyProgramView, StudyProgramWithUniversityView};
use crate::api::requests::{
    CreateStudyProgramRequest, IdRequest, StudyProgramListRequest, UpdateStudyProgramRequest,
};
use crate::api::JsonBody;
use crate::filter::Paged;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::parse_id;
use crate::state::AppState;

/// POST /study-program/create - Insert and link into `kpName` of the `kbYear` catalog
pub async fn create(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateStudyProgramRequest>,
) -> ApiResult<IdView> {
    let patch = req.study_program.into_patch()?;
    let program = state
        .study_programs
        .create(patch, &req.kb_year, &req.kp_name)
        .await?;
    Ok(ApiResponse::success("Study Program created successfully", IdView::new(&program.id)))
}

/// POST /study-program/update
pub async fn update(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateStudyProgramRequest>,
) -> ApiResult<StudyProgramView> {
    let id = parse_id(&req.id)?;
    let program = state
        .study_programs
        .update(&id, req.study_program.into_patch()?)
        .await?;
    Ok(ApiResponse::success("Study Program updated successfully", program.into()))
}

/// POST /study-program/delete
pub async fn delete(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<IdRequest>,
) -> ApiResult<IdView> {
    let id = req.object_id()?;
    state.study_programs.delete(&id).await?;
    Ok(ApiResponse::success("Study Program deleted successfully", IdView::new(&id)))
}

/// POST /study-program/id - The program joined with its university
pub async fn get(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<IdRequest>,
) -> ApiResult<StudyProgramWithUniversityView> {
    let joined = state.study_programs.get(&req.object_id()?).await?;
    Ok(ApiResponse::success("Fetched study program successfully", joined.into()))
}

/// POST /study-program/all - Programs of one catalog entry, filtered and paginated
pub async fn list(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<StudyProgramListRequest>,
) -> ApiResult<Paged<StudyProgramWithUniversityView>> {
    let (filter, page) = req.into_parts();
    let programs = state.study_programs.list(&filter, page).await?;
    Ok(ApiResponse::success(
        "Fetched study programs successfully",
        programs.map(StudyProgramWithUniversityView::from),
    ))
}
