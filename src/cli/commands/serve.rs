use serde_json::json;
use std::sync::Arc;

use crate::app::app;
use crate::auth::SessionKeys;
use crate::cli::utils::{connect_store, output_field, output_success};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::models::{NewUser, User, UserStatus};
use crate::database::{MemoryStore, Store};
use crate::is_production;
use crate::state::AppState;

pub async fn handle(
    port: Option<u16>,
    memory: bool,
    seed_user: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let mut config = config().clone();
    if let Some(port) = port {
        config.server.port = port;
    }
    tracing::info!("Starting Taskboard API in {:?} mode", config.environment);

    let keys = SessionKeys::from_secret(&config.security.jwt_secret, config.security.jwt_expiry_hours)
        .map_err(|e| anyhow::anyhow!("JWT_SECRET is not usable: {}", e))?;

    let store: Arc<dyn Store> = if memory {
        if is_production!() {
            anyhow::bail!("the in-memory store cannot be used in production");
        }
        tracing::warn!("Using in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        connect_store(&config).await?
    };

    if let Some(email) = seed_user {
        let (user, token) = seed_session(store.as_ref(), &keys, &email).await?;
        tracing::info!("Seeded user {} ({})", user.email, user.id);
        output_success(
            &output_format,
            &format!("Seeded {}", user.email),
            Some(json!({ "token": token, "userId": user.id })),
        )?;
        output_field(&output_format, "token", &token);
    }

    let state = AppState::new(store, keys);
    let router = app(state, &config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Taskboard API listening on http://{}", bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}

/// Create an active user and issue a session token for it
///
/// An empty store has nobody to authenticate as, so local runs start from one
/// known account. The display name is the email's local part.
pub async fn seed_session(store: &dyn Store, keys: &SessionKeys, email: &str) -> anyhow::Result<(User, String)> {
    let email = email.trim().to_lowercase();
    let name = match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => local.to_string(),
        _ => anyhow::bail!("'{}' is not an email address", email),
    };

    let user = store
        .create_user(NewUser {
            name,
            email,
            status: UserStatus::Active,
            department_id: None,
        })
        .await?;
    let token = keys.issue(user.id, &user.email)?;
    Ok((user, token))
}
