use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::validate::{double_option, optional_text, required_text};
use crate::api::{ApiJson, ApiPath, ApiResponse, ApiResult, Deleted};
use crate::auth::Principal;
use crate::database::models::{NewTask, Project, Task, TaskChanges};
use crate::database::Store;
use crate::error::ApiError;
use crate::services::access::{column_for_member, task_for_member};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
}

/// Absent fields stay untouched; `null` clears the nullable ones
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    pub column_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,
}

async fn check_assignee(store: &dyn Store, project: &Project, assignee_id: Uuid) -> Result<(), ApiError> {
    match store.find_membership(project.workspace_id, assignee_id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::field(
            "assigneeId",
            "El responsable debe ser miembro del espacio de trabajo",
        )),
    }
}

/// POST /api/columns/:column_id/tasks - Add a task at the bottom of a column
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(column_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<CreateTaskRequest>,
) -> ApiResult<Task> {
    let title = required_text(payload.title, "title", "El título es requerido")?;
    let (column, project) = column_for_member(state.store.as_ref(), &principal, column_id).await?;

    if let Some(assignee_id) = payload.assignee_id {
        check_assignee(state.store.as_ref(), &project, assignee_id).await?;
    }

    let task = state
        .store
        .create_task(NewTask {
            column_id: column.id,
            title,
            description: optional_text(payload.description),
            assignee_id: payload.assignee_id,
        })
        .await?;
    Ok(ApiResponse::created(task))
}

/// PATCH /api/tasks/:task_id - Edit, move or reassign a task
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(task_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateTaskRequest>,
) -> ApiResult<Task> {
    let title = match payload.title {
        Some(title) => Some(required_text(Some(title), "title", "El título no puede estar vacío")?),
        None => None,
    };

    let (task, project) = task_for_member(state.store.as_ref(), &principal, task_id).await?;

    if let Some(column_id) = payload.column_id {
        let column = state.store.get_column(column_id).await?;
        if !column.is_some_and(|c| c.project_id == task.project_id) {
            return Err(ApiError::field("columnId", "La columna no pertenece al proyecto"));
        }
    }
    if let Some(Some(assignee_id)) = payload.assignee_id {
        check_assignee(state.store.as_ref(), &project, assignee_id).await?;
    }

    let changes = TaskChanges {
        title,
        description: payload.description.map(optional_text),
        column_id: payload.column_id,
        assignee_id: payload.assignee_id,
    };
    let task = state.store.update_task(task.id, changes).await?;
    Ok(ApiResponse::success(task))
}

/// DELETE /api/tasks/:task_id
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(task_id): ApiPath<Uuid>,
) -> ApiResult<Deleted> {
    let (task, _) = task_for_member(state.store.as_ref(), &principal, task_id).await?;

    if !state.store.delete_task(task.id).await? {
        return Err(ApiError::not_found("Tarea no encontrada"));
    }
    Ok(ApiResponse::success(Deleted::ok()))
}
