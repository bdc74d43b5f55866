//! Membership checks.
//!
//! A `(workspace_id, user_id)` membership row is the only thing that grants
//! access. Resources below a workspace are looked up first (404 when absent)
//! and then checked against their owning workspace (403 without membership).

use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{Project, Task, TaskColumn, WorkspaceMember};
use crate::database::Store;
use crate::error::ApiError;

pub const ACCESS_DENIED: &str = "No tienes acceso a este espacio de trabajo";

pub async fn require_member(
    store: &dyn Store,
    principal: &Principal,
    workspace_id: Uuid,
) -> Result<WorkspaceMember, ApiError> {
    match store.find_membership(workspace_id, principal.user_id).await? {
        Some(member) => Ok(member),
        None => {
            tracing::warn!(
                "Access denied: user {} is not a member of workspace {}",
                principal.user_id,
                workspace_id
            );
            Err(ApiError::forbidden(ACCESS_DENIED))
        }
    }
}

pub async fn project_for_member(
    store: &dyn Store,
    principal: &Principal,
    project_id: Uuid,
) -> Result<Project, ApiError> {
    let project = store
        .get_project(project_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Proyecto no encontrado"))?;
    require_member(store, principal, project.workspace_id).await?;
    Ok(project)
}

pub async fn column_for_member(
    store: &dyn Store,
    principal: &Principal,
    column_id: Uuid,
) -> Result<(TaskColumn, Project), ApiError> {
    let column = store
        .get_column(column_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Columna no encontrada"))?;
    let project = project_for_member(store, principal, column.project_id).await?;
    Ok((column, project))
}

pub async fn task_for_member(
    store: &dyn Store,
    principal: &Principal,
    task_id: Uuid,
) -> Result<(Task, Project), ApiError> {
    let task = store
        .get_task(task_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Tarea no encontrada"))?;
    let project = project_for_member(store, principal, task.project_id).await?;
    Ok((task, project))
}
