use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    let pool = DatabaseManager::connect(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    let url = config.database.url.as_deref().map(DatabaseManager::redacted).unwrap_or_default();
    output_success(&output_format, "Migrations applied", Some(json!({ "database": url })))
}
