//! In-memory doubles and request helpers for router-level tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;

use crate::app::{self, AppState};
use crate::auth::password::hash_password;
use crate::auth::{TokenIssuer, TokenType};
use crate::config::{AppConfig, DatabaseConfig};
use crate::database::{DatabaseError, DatabaseManager, PaymentDebt, PaymentDebtRepository, User, UserRepository};
use crate::storage::MemoryObjectStore;


pub const FIXED_EPOCH_MS: i64 = 1664582400000;
pub const TEST_USERNAME: &str = "kanastra";
pub const TEST_PASSWORD: &str = "apenas_teste";

pub fn fixed_clock() -> i64 {
    FIXED_EPOCH_MS
}

/// Migrated pool on the Postgres named by `DATABASE_URL`; `None` skips the test
pub async fn postgres_pool() -> Option<sqlx::PgPool> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };

    let config = DatabaseConfig {
        url,
        max_connections: 2,
        connection_timeout: 5,
    };
    let pool = DatabaseManager::connect(&config).await.expect("connect to DATABASE_URL");
    DatabaseManager::migrate(&pool).await.expect("apply migrations");
    Some(pool)
}

/// Key unlikely to collide with rows left by concurrent or earlier runs
pub fn unique_debt_id() -> i32 {
    (uuid::Uuid::new_v4().as_u128() % 1_000_000_000) as i32 + 1_000_000_000
}

#[derive(Default)]
pub struct MemoryPaymentDebtRepository {
    records: RwLock<BTreeMap<i32, PaymentDebt>>,
    unavailable: AtomicBool,
}

impl MemoryPaymentDebtRepository {
    /// Make every call fail as if the database were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn get(&self, debt_id: i32) -> Option<PaymentDebt> {
        self.records.read().await.get(&debt_id).cloned()
    }

    fn check(&self) -> Result<(), DatabaseError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn not_found(debt_id: i32) -> DatabaseError {
    DatabaseError::NotFound(format!("payment debt {} not found", debt_id))
}

#[async_trait]
impl PaymentDebtRepository for MemoryPaymentDebtRepository {
    async fn ping(&self) -> Result<(), DatabaseError> {
        self.check()
    }

    async fn insert(&self, debt: &PaymentDebt) -> Result<PaymentDebt, DatabaseError> {
        self.check()?;
        let mut records = self.records.write().await;
        if records.contains_key(&debt.debt_id) {
            return Err(DatabaseError::Conflict(format!("payment debt {} already exists", debt.debt_id)));
        }
        records.insert(debt.debt_id, debt.clone());
        Ok(debt.clone())
    }

    async fn count(&self) -> Result<i64, DatabaseError> {
        self.check()?;
        Ok(self.records.read().await.len() as i64)
    }

    async fn select_page(&self, limit: i64, offset: i64) -> Result<Vec<PaymentDebt>, DatabaseError> {
        self.check()?;
        Ok(self
            .records
            .read()
            .await
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn select_404(&self, debt_id: i32) -> Result<PaymentDebt, DatabaseError> {
        self.check()?;
        self.get(debt_id).await.ok_or_else(|| not_found(debt_id))
    }

    async fn update(&self, debt: &PaymentDebt) -> Result<PaymentDebt, DatabaseError> {
        self.check()?;
        let mut records = self.records.write().await;
        match records.get_mut(&debt.debt_id) {
            Some(existing) => {
                *existing = debt.clone();
                Ok(debt.clone())
            }
            None => Err(not_found(debt.debt_id)),
        }
    }

    async fn delete(&self, debt_id: i32) -> Result<(), DatabaseError> {
        self.check()?;
        self.records
            .write()
            .await
            .remove(&debt_id)
            .map(|_| ())
            .ok_or_else(|| not_found(debt_id))
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
    next_id: AtomicI64,
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, DatabaseError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, DatabaseError> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(DatabaseError::Conflict(format!("user '{}' already exists", username)));
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            created_at: chrono::Utc::now(),
        };
        users.insert(username.to_string(), user.clone());
        Ok(user)
    }

    async fn set_active(&self, username: &str, is_active: bool) -> Result<(), DatabaseError> {
        match self.users.write().await.get_mut(username) {
            Some(user) => {
                user.is_active = is_active;
                Ok(())
            }
            None => Err(DatabaseError::NotFound(format!("user '{}' not found", username))),
        }
    }
}

/// Router wired to in-memory repositories, object store and a fixed clock
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub debts: Arc<MemoryPaymentDebtRepository>,
    pub users: Arc<MemoryUserRepository>,
    pub store: Arc<MemoryObjectStore>,
}

/// Decoded response: status, headers and body (JSON when it parses, else a string)
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_env(&[]).await
    }

    /// Build from configuration overrides, as if they were environment variables
    pub async fn with_env(pairs: &[(&str, &str)]) -> Self {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        let config = AppConfig::from_lookup(|key| env.get(key).cloned()).expect("test config");

        let debts = Arc::new(MemoryPaymentDebtRepository::default());
        let users = Arc::new(MemoryUserRepository::default());
        let store = Arc::new(MemoryObjectStore::new());

        users
            .create(TEST_USERNAME, &hash_password(TEST_PASSWORD).expect("hash test password"))
            .await
            .expect("seed user");

        let state = AppState {
            tokens: TokenIssuer::new(&config.security).expect("token issuer"),
            config: Arc::new(config),
            debts: debts.clone(),
            users: users.clone(),
            storage: store.clone(),
            clock: fixed_clock,
        };

        Self {
            router: app::router(state.clone()),
            state,
            debts,
            users,
            store,
        }
    }

    pub fn token(&self, token_type: TokenType) -> String {
        self.state.tokens.issue(1, TEST_USERNAME, token_type).expect("token")
    }

    pub fn access_token(&self) -> String {
        self.token(TokenType::Access)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");

        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse { status, headers, body }
    }

    /// JSON request; `token` becomes a Bearer header
    pub async fn json(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri).header(header::HOST, "testserver");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send(request).await
    }

    pub async fn upload(&self, token: Option<&str>, form: MultipartBody) -> TestResponse {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/csv-files-upload/")
            .header(header::CONTENT_TYPE, form.content_type());
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        self.send(builder.body(Body::from(form.finish())).expect("request")).await
    }
}

/// Hand-built multipart/form-data body
pub struct MultipartBody {
    boundary: String,
    charset: Option<String>,
    buffer: Vec<u8>,
}

impl Default for MultipartBody {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartBody {
    pub fn new() -> Self {
        Self {
            boundary: "payments-test-boundary".to_string(),
            charset: None,
            buffer: Vec::new(),
        }
    }

    /// The usual upload: `file` plus the three path fields
    pub fn upload(filename: &str, content_type: &str, content: &[u8]) -> Self {
        Self::new()
            .file("file", filename, content_type, content)
            .text("origin", "origin_value")
            .text("type", "type_value")
            .text("requester", "requester_value")
    }

    /// Add a `charset` parameter to the request Content-Type
    pub fn charset(mut self, charset: &str) -> Self {
        self.charset = Some(charset.to_string());
        self
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.buffer.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, content: &[u8]) -> Self {
        self.buffer.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, filename, content_type
            )
            .as_bytes(),
        );
        self.buffer.extend_from_slice(content);
        self.buffer.extend_from_slice(b"\r\n");
        self
    }

    pub fn content_type(&self) -> String {
        match &self.charset {
            Some(charset) => format!("multipart/form-data; boundary={}; charset={}", self.boundary, charset),
            None => format!("multipart/form-data; boundary={}", self.boundary),
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buffer
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        self.buffer
    }
}
