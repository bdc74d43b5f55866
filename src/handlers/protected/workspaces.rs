use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::validate::{double_option, optional_text, required_text};
use crate::api::{ApiJson, ApiPath, ApiResponse, ApiResult};
use crate::auth::Principal;
use crate::database::models::{Workspace, WorkspaceChanges, WorkspaceSummary};
use crate::error::ApiError;
use crate::services::access::require_member;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateWorkspaceRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub name: Option<String>,
    /// Present-but-null clears the description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

/// GET /api/workspaces - Workspaces the caller belongs to, with the caller's role
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<WorkspaceSummary>> {
    let workspaces = state.store.list_workspaces_for_user(principal.user_id).await?;
    Ok(ApiResponse::success(workspaces))
}

/// POST /api/workspaces - Create a workspace owned by the caller
///
/// The workspace and the caller's `owner` membership are written together.
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(payload): ApiJson<CreateWorkspaceRequest>,
) -> ApiResult<Workspace> {
    let name = required_text(payload.name, "name", "El nombre es requerido")?;
    let description = optional_text(payload.description);

    let (workspace, _owner) = state
        .store
        .create_workspace(principal.user_id, &name, description.as_deref())
        .await?;

    tracing::info!("Workspace {} created by {}", workspace.id, principal.user_id);
    Ok(ApiResponse::created(workspace))
}

/// GET /api/workspaces/:workspace_id
pub async fn show(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
) -> ApiResult<Workspace> {
    require_member(state.store.as_ref(), &principal, workspace_id).await?;

    let workspace = state
        .store
        .get_workspace(workspace_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Espacio de trabajo no encontrado"))?;
    Ok(ApiResponse::success(workspace))
}

/// PATCH /api/workspaces/:workspace_id - Rename or re-describe a workspace
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateWorkspaceRequest>,
) -> ApiResult<Workspace> {
    let name = match payload.name {
        Some(name) => Some(required_text(Some(name), "name", "El nombre no puede estar vacío")?),
        None => None,
    };
    let changes = WorkspaceChanges {
        name,
        description: payload.description.map(optional_text),
    };

    require_member(state.store.as_ref(), &principal, workspace_id).await?;

    let workspace = state.store.update_workspace(workspace_id, changes).await?;
    Ok(ApiResponse::success(workspace))
}
