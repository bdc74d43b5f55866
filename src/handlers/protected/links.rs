// Link lists hanging off workspaces and projects

use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::validate::{link_url, required_text};
use crate::api::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted};
use crate::auth::Principal;
use crate::database::models::{ProjectLink, WorkspaceLink};
use crate::error::ApiError;
use crate::services::access::{project_for_member, require_member};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateLinkRequest {
    pub title: Option<String>,
    pub url: Option<String>,
}

impl CreateLinkRequest {
    fn validate(self) -> Result<(String, String), ApiError> {
        let title = required_text(self.title, "title", "El título es requerido")?;
        let url = link_url(self.url)?;
        Ok((title, url))
    }
}

/// GET /api/projects/:project_id/links
pub async fn project_list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(project_id): ApiPath<Uuid>,
) -> ApiResult<Vec<ProjectLink>> {
    project_for_member(state.store.as_ref(), &principal, project_id).await?;
    let links = state.store.list_project_links(project_id).await?;
    Ok(ApiResponse::success(links))
}

/// POST /api/projects/:project_id/links
pub async fn project_create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateLinkRequest>,
) -> ApiResult<ProjectLink> {
    let (title, url) = payload.validate()?;
    project_for_member(state.store.as_ref(), &principal, project_id).await?;

    let link = state.store.create_project_link(project_id, &title, &url).await?;
    Ok(ApiResponse::created(link))
}

/// DELETE /api/projects/:project_id/links/:link_id
pub async fn project_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath((project_id, link_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Deleted> {
    project_for_member(state.store.as_ref(), &principal, project_id).await?;

    if !state.store.delete_project_link(project_id, link_id).await? {
        return Err(ApiError::not_found("Enlace no encontrado"));
    }
    Ok(ApiResponse::success(Deleted::ok()))
}

/// GET /api/workspaces/:workspace_id/links
pub async fn workspace_list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
) -> ApiResult<Vec<WorkspaceLink>> {
    require_member(state.store.as_ref(), &principal, workspace_id).await?;
    let links = state.store.list_workspace_links(workspace_id).await?;
    Ok(ApiResponse::success(links))
}

/// POST /api/workspaces/:workspace_id/links
pub async fn workspace_create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateLinkRequest>,
) -> ApiResult<WorkspaceLink> {
    let (title, url) = payload.validate()?;
    require_member(state.store.as_ref(), &principal, workspace_id).await?;

    let link = state
        .store
        .create_workspace_link(workspace_id, &title, &url, Some(principal.user_id))
        .await?;
    Ok(ApiResponse::created(link))
}

/// DELETE /api/workspaces/:workspace_id/links/:link_id
pub async fn workspace_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath((workspace_id, link_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Deleted> {
    require_member(state.store.as_ref(), &principal, workspace_id).await?;

    if !state.store.delete_workspace_link(workspace_id, link_id).await? {
        return Err(ApiError::not_found("Enlace no encontrado"));
    }
    Ok(ApiResponse::success(Deleted::ok()))
}
