pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::DatabaseManager;

#[derive(Parser)]
#[command(name = "payments-admin")]
#[command(about = "Payments API administration - migrations and login accounts")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Login account management")]
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
    let config = AppConfig::from_env()?;
    tracing::debug!("Connecting to {}", config.redacted_database_url());
    let pool = DatabaseManager::connect(&config.database).await?;

    let result = dispatch(cli.command, &pool, &output_format).await;
    DatabaseManager::close(&pool).await;
    result
}

async fn dispatch(command: Commands, pool: &PgPool, output_format: &OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Migrate => commands::migrate::handle(pool, output_format).await,
        Commands::User { cmd } => commands::user::handle(cmd, pool, output_format).await,
    }
}
