use serde_json::json;
use uuid::Uuid;

use crate::auth::SessionKeys;
use crate::cli::utils::{connect_store, output_field, output_success};
use crate::cli::OutputFormat;
use crate::config::config;

pub async fn handle(user_id: Uuid, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    let keys = SessionKeys::from_secret(&config.security.jwt_secret, config.security.jwt_expiry_hours)?;
    let store = connect_store(config).await?;

    let user = store
        .get_user(user_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user {} not found", user_id))?;
    let token = keys.issue(user.id, &user.email)?;

    output_success(
        &output_format,
        &format!("Token issued for {}", user.email),
        Some(json!({ "token": token, "userId": user.id })),
    )?;
    output_field(&output_format, "token", &token);
    Ok(())
}
