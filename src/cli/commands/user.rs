use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connect_store, output_field, output_success};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::database::models::{NewUser, UserStatus};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an active user")]
    Create {
        #[arg(long, help = "Display name")]
        name: String,
        #[arg(long, help = "Unique email address")]
        email: String,
        #[arg(long, help = "Department name (created when missing)")]
        department: Option<String>,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::Create { name, email, department } => {
            let store = connect_store(config()).await?;

            let department_id = match department.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
                Some(department) => Some(store.ensure_department(department).await?.id),
                None => None,
            };

            let user = store
                .create_user(NewUser {
                    name: name.trim().to_string(),
                    email: email.trim().to_lowercase(),
                    status: UserStatus::Active,
                    department_id,
                })
                .await?;

            output_success(
                &output_format,
                &format!("User {} created", user.email),
                Some(json!({ "user": user })),
            )?;
            output_field(&output_format, "id", &user.id.to_string());
            Ok(())
        }
    }
}
