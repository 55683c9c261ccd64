use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

/// Persistence seam for login accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError>;

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError>;

    async fn set_active(&self, username: &str, is_active: bool) -> Result<(), DatabaseError>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, is_active, created_at FROM auth_user WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO auth_user (username, password_hash) VALUES ($1, $2) \
             RETURNING id, username, password_hash, is_active, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                DatabaseError::Conflict(format!("user '{}' already exists", username))
            }
            other => other.into(),
        })
    }

    async fn set_active(&self, username: &str, is_active: bool) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE auth_user SET is_active = $2 WHERE username = $1")
            .bind(username)
            .bind(is_active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user '{}' not found", username)));
        }
        Ok(())
    }
}
