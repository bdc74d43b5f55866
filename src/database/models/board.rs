use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::project::Project;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskColumn {
    pub id: Uuid,
    pub project_id: Uuid,
    pub label: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub project_id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub assignee_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
}

/// Partial update for a task. Outer `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub column_id: Option<Uuid>,
    pub assignee_id: Option<Option<Uuid>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumn {
    #[serde(flatten)]
    pub column: TaskColumn,
    pub tasks: Vec<Task>,
}

/// Kanban view of one project
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub project: Project,
    pub columns: Vec<BoardColumn>,
}

impl Board {
    /// Groups tasks under their columns; both inputs are expected in position order.
    pub fn assemble(project: Project, columns: Vec<TaskColumn>, tasks: Vec<Task>) -> Self {
        let mut columns: Vec<BoardColumn> = columns
            .into_iter()
            .map(|column| BoardColumn { column, tasks: Vec::new() })
            .collect();

        for task in tasks {
            if let Some(slot) = columns.iter_mut().find(|c| c.column.id == task.column_id) {
                slot.tasks.push(task);
            }
        }

        Self { project, columns }
    }
}
