use clap::Subcommand;
use serde_json::json;
use sqlx::PgPool;

use crate::auth::password::hash_password;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::{DatabaseError, PgUserRepository, UserRepository};

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create a login account")]
    Create {
        #[arg(help = "Username")]
        username: String,

        #[arg(long, env = "PAYMENTS_ADMIN_PASSWORD", help = "Password for the new account")]
        password: String,
    },

    #[command(about = "Disable login for an account")]
    Deactivate {
        #[arg(help = "Username")]
        username: String,
    },
}

pub async fn handle(cmd: UserCommands, pool: &PgPool, output_format: &OutputFormat) -> anyhow::Result<()> {
    let users = PgUserRepository::new(pool.clone());

    match cmd {
        UserCommands::Create { username, password } => {
            let username = username.trim();
            if username.is_empty() {
                anyhow::bail!("Username may not be blank");
            }
            if password.is_empty() {
                anyhow::bail!("Password may not be blank");
            }

            let password_hash = hash_password(&password)?;
            let user = match users.create(username, &password_hash).await {
                Ok(user) => user,
                Err(DatabaseError::Conflict(_)) => anyhow::bail!("User '{}' already exists", username),
                Err(e) => return Err(e.into()),
            };

            output_success(
                output_format,
                &format!("Created user '{}'", user.username),
                Some(json!({ "user": user })),
            )
        }
        UserCommands::Deactivate { username } => {
            users.set_active(&username, false).await?;
            output_success(output_format, &format!("Deactivated user '{}'", username), None)
        }
    }
}
