use std::sync::Arc;

use crate::auth::password::verify_password;
use crate::auth::{TokenError, TokenIssuer, TokenPair, TokenType};
use crate::database::{DatabaseError, UserRepository};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("No active account found with the given credentials")]
    InvalidCredentials,
    #[error("Token is invalid or expired: {0}")]
    InvalidToken(TokenError),
    #[error("Token generation failed: {0}")]
    Token(#[from] TokenError),
    #[error("Database manager error: {0}")]
    Database(#[from] DatabaseError),
}

/// Credential checks and token issuance for the public auth endpoints
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, tokens: TokenIssuer) -> Self {
        Self { users, tokens }
    }

    /// Exchange username/password for an access + refresh pair.
    /// Unknown, inactive and wrong-password accounts are indistinguishable.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = match self.users.find_by_username(username).await? {
            Some(user) if user.is_active => user,
            Some(_) => {
                tracing::warn!("Login attempt for inactive user '{}'", username);
                return Err(AuthError::InvalidCredentials);
            }
            None => {
                tracing::warn!("Login attempt for unknown user '{}'", username);
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !verify_password(password, &user.password_hash) {
            tracing::warn!("Wrong password for user '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }

        let pair = self.tokens.issue_pair(user.id, &user.username)?;
        tracing::info!("User '{}' logged in", user.username);
        Ok(pair)
    }

    /// New access token for a valid refresh token. The refresh token itself is kept.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self
            .tokens
            .verify(refresh_token, TokenType::Refresh)
            .map_err(AuthError::InvalidToken)?;

        Ok(self.tokens.issue(claims.user_id, &claims.sub, TokenType::Access)?)
    }
}
