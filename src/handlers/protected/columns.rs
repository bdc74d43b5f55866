use axum::{extract::State, Extension};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::validate::required_text;
use crate::api::{ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, Deleted};
use crate::auth::Principal;
use crate::database::models::TaskColumn;
use crate::error::ApiError;
use crate::services::access::{column_for_member, project_for_member};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ColumnRequest {
    pub label: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteColumnQuery {
    pub move_to: Option<Uuid>,
}

/// POST /api/projects/:project_id/columns - Append a column to the board
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(project_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ColumnRequest>,
) -> ApiResult<TaskColumn> {
    let label = required_text(payload.label, "label", "La etiqueta es requerida")?;
    project_for_member(state.store.as_ref(), &principal, project_id).await?;

    let column = state.store.create_column(project_id, &label).await?;
    Ok(ApiResponse::created(column))
}

/// PATCH /api/columns/:column_id - Rename a column
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(column_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ColumnRequest>,
) -> ApiResult<TaskColumn> {
    let label = required_text(payload.label, "label", "La etiqueta es requerida")?;
    column_for_member(state.store.as_ref(), &principal, column_id).await?;

    let column = state.store.update_column_label(column_id, &label).await?;
    Ok(ApiResponse::success(column))
}

/// DELETE /api/columns/:column_id?moveTo=:id
///
/// With `moveTo` the column's tasks are appended to the target column before the
/// delete; without it they go away with the column.
pub async fn delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiPath(column_id): ApiPath<Uuid>,
    ApiQuery(query): ApiQuery<DeleteColumnQuery>,
) -> ApiResult<Deleted> {
    let (column, _project) = column_for_member(state.store.as_ref(), &principal, column_id).await?;

    if let Some(target_id) = query.move_to {
        if target_id == column.id {
            return Err(ApiError::field("moveTo", "La columna destino debe ser distinta"));
        }
        let target = state.store.get_column(target_id).await?;
        if !target.is_some_and(|t| t.project_id == column.project_id) {
            return Err(ApiError::field("moveTo", "La columna destino no pertenece al proyecto"));
        }
    }

    let moved = state.store.delete_column(column.id, query.move_to).await?;
    tracing::info!(
        "Column {} deleted by {} ({} tasks moved)",
        column.id,
        principal.user_id,
        moved
    );
    Ok(ApiResponse::success(Deleted::with_moved(moved)))
}
