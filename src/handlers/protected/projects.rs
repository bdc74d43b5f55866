use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::validate::{optional_text, required_text};
use crate::api::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::auth::Principal;
use crate::database::models::{Board, Project};
use crate::error::ApiError;
use crate::services::access::{project_for_member, require_member};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: Option<String>,
}

/// GET /api/workspaces/:workspace_id/projects
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
) -> ApiResult<Vec<Project>> {
    require_member(state.store.as_ref(), &principal, workspace_id).await?;
    let projects = state.store.list_projects(workspace_id).await?;
    Ok(ApiResponse::success(projects))
}

/// POST /api/workspaces/:workspace_id/projects - New project with the default columns
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateProjectRequest>,
) -> ApiResult<Project> {
    let name = required_text(payload.name, "name", "El nombre es requerido")?;
    let description = optional_text(payload.description);

    require_member(state.store.as_ref(), &principal, workspace_id).await?;

    let project = state
        .store
        .create_project(workspace_id, &name, description.as_deref())
        .await?;
    tracing::info!("Project {} created in workspace {}", project.id, workspace_id);
    Ok(ApiResponse::created(project))
}

/// GET /api/projects/:project_id
pub async fn show(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Project> {
    let project = project_for_member(state.store.as_ref(), &principal, project_id).await?;
    Ok(ApiResponse::success(project))
}

/// GET /api/projects/:project_id/board - Columns in order, each with its tasks
pub async fn board(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Board> {
    let project = project_for_member(state.store.as_ref(), &principal, project_id).await?;
    let columns = state.store.list_columns(project_id).await?;
    let tasks = state.store.list_tasks(project_id).await?;
    Ok(ApiResponse::success(Board::assemble(project, columns, tasks)))
}

/// PATCH /api/projects/:project_id/notes - Replace the free-form notes
///
/// Notes may be emptied but the field must be sent.
pub async fn update_notes(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateNotesRequest>,
) -> ApiResult<Project> {
    let notes = payload
        .notes
        .ok_or_else(|| ApiError::field("notes", "Las notas son requeridas"))?;

    project_for_member(state.store.as_ref(), &principal, project_id).await?;

    let project = state.store.update_project_notes(project_id, &notes).await?;
    Ok(ApiResponse::success(project))
}
