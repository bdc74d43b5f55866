use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Column labels seeded into every new project
pub const DEFAULT_COLUMNS: [&str; 3] = ["Por hacer", "En progreso", "Hecho"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLink {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}
