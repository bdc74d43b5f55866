pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(about = "Taskboard - workspaces, kanban boards and finance tracking API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides configuration)")]
        port: Option<u16>,
        #[arg(long, help = "Use the in-memory store instead of PostgreSQL")]
        memory: bool,
        #[arg(
            long,
            value_name = "EMAIL",
            requires = "memory",
            help = "Create this user in the in-memory store and print a token for it"
        )]
        seed_user: Option<String>,
    },

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Issue a session token for an existing user")]
    Token {
        #[arg(long, help = "User id")]
        user: Uuid,
    },

    #[command(about = "User management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    match cli.command {
        Commands::Serve { port, memory, seed_user } => {
            commands::serve::handle(port, memory, seed_user, output_format).await
        }
        Commands::Migrate => commands::migrate::handle(output_format).await,
        Commands::Token { user } => commands::token::handle(user, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, output_format).await,
    }
}
