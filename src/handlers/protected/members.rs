use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted};
use crate::auth::Principal;
use crate::database::models::{AvailableUser, MemberDetail, MemberRole, WorkspaceMember};
use crate::database::DatabaseError;
use crate::error::ApiError;
use crate::services::access::require_member;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    pub user_id: Option<Uuid>,
    pub role: Option<MemberRole>,
}

/// GET /api/workspaces/:workspace_id/members
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
) -> ApiResult<Vec<MemberDetail>> {
    require_member(state.store.as_ref(), &principal, workspace_id).await?;
    let members = state.store.list_members(workspace_id).await?;
    Ok(ApiResponse::success(members))
}

/// POST /api/workspaces/:workspace_id/members - Add a user with a role (default `member`)
pub async fn add(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<AddMemberRequest>,
) -> ApiResult<WorkspaceMember> {
    let user_id = payload
        .user_id
        .ok_or_else(|| ApiError::field("userId", "El usuario es requerido"))?;
    let role = payload.role.unwrap_or_default();

    require_member(state.store.as_ref(), &principal, workspace_id).await?;

    if state.store.get_user(user_id).await?.is_none() {
        return Err(ApiError::not_found("Usuario no encontrado"));
    }

    let member = state
        .store
        .add_member(workspace_id, user_id, role)
        .await
        .map_err(|e| match e {
            DatabaseError::Conflict(_) => {
                ApiError::conflict("El usuario ya es miembro de este espacio de trabajo")
            }
            other => other.into(),
        })?;

    tracing::info!(
        "User {} added to workspace {} as {} by {}",
        user_id,
        workspace_id,
        role,
        principal.user_id
    );
    Ok(ApiResponse::created(member))
}

/// DELETE /api/workspaces/:workspace_id/members/:user_id
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath((workspace_id, user_id)): ApiPath<(Uuid, Uuid)>,
) -> ApiResult<Deleted> {
    require_member(state.store.as_ref(), &principal, workspace_id).await?;

    if !state.store.remove_member(workspace_id, user_id).await? {
        return Err(ApiError::not_found("Miembro no encontrado"));
    }

    tracing::info!("User {} removed from workspace {} by {}", user_id, workspace_id, principal.user_id);
    Ok(ApiResponse::success(Deleted::ok()))
}

/// GET /api/workspaces/:workspace_id/available-users - Users not yet in the workspace
pub async fn available_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(workspace_id): ApiPath<Uuid>,
) -> ApiResult<Vec<AvailableUser>> {
    require_member(state.store.as_ref(), &principal, workspace_id).await?;
    let users = state.store.list_available_users(workspace_id).await?;
    Ok(ApiResponse::success(users))
}
