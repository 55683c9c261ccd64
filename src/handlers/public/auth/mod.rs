// handlers/public/auth/mod.rs - Token acquisition endpoints

pub mod login; // POST /auth/login/ - username/password for access + refresh tokens
pub mod refresh; // POST /auth/refresh/ - refresh token for a new access token

pub use login::login_post;
pub use refresh::refresh_post;
