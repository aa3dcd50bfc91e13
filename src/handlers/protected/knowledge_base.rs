// handlers/protected/knowledge_base.rs - /knowledge-base/* and /knowledge-programs/*

use axum::extract::State;

use crate::api::format::{views, KnowledgeBaseView, KnowledgeProgramView};
use crate::api::requests::{
    AddKnowledgeProgramRequest, IdRequest, KnowledgeBaseInput, RemoveKnowledgeProgramRequest,
    UpdateKnowledgeBaseRequest, UpdateKnowledgeProgramRequest,
};
use crate::api::JsonBody;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::parse_id;
use crate::state::AppState;

/// POST /knowledge-base/create
pub async fn create(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<KnowledgeBaseInput>,
) -> ApiResult<KnowledgeBaseView> {
    let (year, programs) = input.into_new()?;
    let kb = state.knowledge.create(&year, programs).await?;
    Ok(ApiResponse::created("KnowledgeBase created successfully", kb.into()))
}

/// POST /knowledge-base/update
pub async fn update(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateKnowledgeBaseRequest>,
) -> ApiResult<KnowledgeBaseView> {
    let id = parse_id(&req.id)?;
    let kb = state
        .knowledge
        .update(&id, req.knowledge_base.into_patch()?)
        .await?;
    Ok(ApiResponse::success("Knowledge Base updated successfully", kb.into()))
}

/// POST /knowledge-base/delete
pub async fn delete(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<IdRequest>,
) -> ApiResult<()> {
    state.knowledge.delete(&req.object_id()?).await?;
    Ok(ApiResponse::message("KnowledgeBase deleted successfully"))
}

/// POST /knowledge-base/all
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<KnowledgeBaseView>> {
    let kbs = state.knowledge.list().await?;
    Ok(ApiResponse::success("Knowledge Base fetched successfully", views(kbs)))
}

/// POST /knowledge-programs/add
pub async fn add_program(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<AddKnowledgeProgramRequest>,
) -> ApiResult<KnowledgeProgramView> {
    let id = parse_id(&req.id)?;
    let program = req.knowledge_program.into_program()?;
    state.knowledge.add_program(&id, program.clone()).await?;
    Ok(ApiResponse::success("Knowledge Program added successfully", program.into()))
}

/// POST /knowledge-programs/update - Replace the program currently named `oldName`
pub async fn update_program(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<UpdateKnowledgeProgramRequest>,
) -> ApiResult<KnowledgeProgramView> {
    let id = parse_id(&req.id)?;
    let program = req.knowledge_program.into_program()?;
    state
        .knowledge
        .update_program(&id, &req.old_name, program.clone())
        .await?;
    Ok(ApiResponse::success("Knowledge Program update successfully", program.into()))
}

/// POST /knowledge-programs/delete
pub async fn remove_program(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RemoveKnowledgeProgramRequest>,
) -> ApiResult<()> {
    let id = parse_id(&req.id)?;
    state.knowledge.remove_program(&id, &req.program_name).await?;
    Ok(ApiResponse::message("Knowledge Program removed successfully"))
}

/// POST /knowledge-programs/get - Programs of one knowledge base
pub async fn programs(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<IdRequest>,
) -> ApiResult<Vec<KnowledgeProgramView>> {
    let programs = state.knowledge.programs(&req.object_id()?).await?;
    Ok(ApiResponse::success("Knowledge Programs fetched successfully", views(programs)))
}
