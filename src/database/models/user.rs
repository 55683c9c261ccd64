use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Account allowed to obtain tokens from /auth/login/
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
