// handlers/public/mod.rs - Handlers that need no session

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - Service descriptor
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Taskboard API",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Workspaces, projects, kanban boards and finance tracking",
        "endpoints": {
            "health": "/health (public)",
            "workspaces": "/api/workspaces[/:workspaceId] (protected)",
            "members": "/api/workspaces/:workspaceId/members, /available-users (protected)",
            "links": "/api/workspaces/:workspaceId/links, /api/projects/:projectId/links (protected)",
            "projects": "/api/workspaces/:workspaceId/projects, /api/projects/:projectId[/board|/notes] (protected)",
            "columns": "/api/projects/:projectId/columns, /api/columns/:columnId (protected)",
            "tasks": "/api/columns/:columnId/tasks, /api/tasks/:taskId (protected)",
            "finance": "/api/workspaces/:workspaceId/finance/{entries,dashboard} (protected)",
        }
    }))
}

/// GET /health - Store round trip; 503 when it fails
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "timestamp": now,
                    "database": "unavailable",
                    "code": "SERVICE_UNAVAILABLE"
                })),
            )
        }
    }
}
