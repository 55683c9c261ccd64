use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::types::ResourceMethod;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set outside development")]
    MissingSecretKey,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub debug: bool,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub storage: StorageConfig,
    pub processing: ProcessingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub max_request_size_bytes: usize,
    pub page_size: u32,
    /// Verbs routed for the payment debt resource; everything else answers 405.
    pub payment_debt_methods: Vec<ResourceMethod>,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub secret_key: String,
    pub access_token_lifetime_secs: u64,
    pub refresh_token_lifetime_secs: u64,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret_key", &"<redacted>")
            .field("access_token_lifetime_secs", &self.access_token_lifetime_secs)
            .field("refresh_token_lifetime_secs", &self.refresh_token_lifetime_secs)
            .field("enable_cors", &self.enable_cors)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s3" => Ok(StorageBackend::S3),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: String,
    pub endpoint_url: Option<String>,
    pub bucket: String,
    /// Lifetime of pre-signed download links. Not used by the upload path.
    pub presigned_url_ttl_secs: u64,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint_url", &self.endpoint_url)
            .field("bucket", &self.bucket)
            .field("presigned_url_ttl_secs", &self.presigned_url_ttl_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Field delimiter written to normalized CSV uploads.
    pub csv_delimiter: u8,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (the process
    /// environment in production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").or_else(|| lookup("ENV")).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&lookup);

        if config.security.secret_key.is_empty() {
            return Err(ConfigError::MissingSecretKey);
        }

        Ok(config)
    }

    fn with_overrides<F>(mut self, lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        override_parsed(lookup, "DEBUG", &mut self.debug);

        // Server
        if let Some(v) = lookup("HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("PAYMENTS_API_PORT").or_else(|| lookup("PORT")) {
            match v.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!("Ignoring invalid port '{}'", v),
            }
        }

        // Database
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = v;
        }
        override_parsed(lookup, "DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        override_parsed(lookup, "DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);

        // API
        override_parsed(lookup, "API_MAX_REQUEST_SIZE_BYTES", &mut self.api.max_request_size_bytes);
        override_parsed(lookup, "PAGE_SIZE", &mut self.api.page_size);
        if self.api.page_size == 0 {
            tracing::warn!("PAGE_SIZE must be positive, using 5");
            self.api.page_size = 5;
        }
        if let Some(v) = lookup("PAYMENT_DEBT_ALLOWED_METHODS") {
            match parse_methods(&v) {
                Ok(methods) => self.api.payment_debt_methods = methods,
                Err(e) => tracing::warn!("Ignoring PAYMENT_DEBT_ALLOWED_METHODS: {}", e),
            }
        }

        // Security
        if let Some(v) = lookup("SECRET_KEY") {
            self.security.secret_key = v;
        }
        override_parsed(lookup, "ACCESS_TOKEN_LIFETIME_SECS", &mut self.security.access_token_lifetime_secs);
        override_parsed(lookup, "REFRESH_TOKEN_LIFETIME_SECS", &mut self.security.refresh_token_lifetime_secs);
        override_parsed(lookup, "SECURITY_ENABLE_CORS", &mut self.security.enable_cors);
        if let Some(v) = lookup("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Storage
        override_parsed(lookup, "STORAGE_BACKEND", &mut self.storage.backend);
        if let Some(v) = lookup("AWS_ACCESS_KEY_ID") {
            self.storage.access_key_id = v;
        }
        if let Some(v) = lookup("AWS_SECRET_ACCESS_KEY") {
            self.storage.secret_access_key = v;
        }
        if let Some(v) = lookup("AWS_DEFAULT_REGION") {
            self.storage.region = v;
        }
        if let Some(v) = lookup("AWS_ENDPOINT_URL") {
            if v.trim().is_empty() {
                self.storage.endpoint_url = None;
            } else if url::Url::parse(&v).is_ok() {
                self.storage.endpoint_url = Some(v);
            } else {
                tracing::warn!("Ignoring invalid AWS_ENDPOINT_URL '{}'", v);
            }
        }
        if let Some(v) = lookup("PAYMENTS_API_BUCKET") {
            self.storage.bucket = v;
        }
        override_parsed(lookup, "PRE_SIGNED_URL_TTL_IN_SECONDS", &mut self.storage.presigned_url_ttl_secs);

        // Processing
        if let Some(v) = lookup("CSV_DELIMITER") {
            match parse_delimiter(&v) {
                Some(delimiter) => self.processing.csv_delimiter = delimiter,
                None => tracing::warn!("Ignoring invalid CSV_DELIMITER {:?}", v),
            }
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            debug: true,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/payments_api".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
                page_size: 5,
                payment_debt_methods: vec![ResourceMethod::Post],
            },
            security: SecurityConfig {
                secret_key: "apenas_teste".to_string(),
                access_token_lifetime_secs: 60 * 60,
                refresh_token_lifetime_secs: 24 * 60 * 60,
                enable_cors: false,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
            },
            storage: StorageConfig {
                backend: StorageBackend::S3,
                access_key_id: "1234".to_string(),
                secret_access_key: "1234".to_string(),
                region: "us-east-1".to_string(),
                endpoint_url: Some("http://localhost:4566".to_string()),
                bucket: "csv-files".to_string(),
                presigned_url_ttl_secs: 3600,
            },
            processing: ProcessingConfig { csv_delimiter: b';' },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            debug: false,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/payments_api".to_string(),
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
                page_size: 5,
                payment_debt_methods: vec![ResourceMethod::Post],
            },
            security: SecurityConfig {
                secret_key: String::new(),
                access_token_lifetime_secs: 60 * 60,
                refresh_token_lifetime_secs: 24 * 60 * 60,
                enable_cors: false,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            storage: StorageConfig {
                backend: StorageBackend::S3,
                access_key_id: "1234".to_string(),
                secret_access_key: "1234".to_string(),
                region: "us-east-1".to_string(),
                endpoint_url: None,
                bucket: "csv-files".to_string(),
                presigned_url_ttl_secs: 3600,
            },
            processing: ProcessingConfig { csv_delimiter: b';' },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            debug: false,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            database: DatabaseConfig {
                url: "postgres://localhost:5432/payments_api".to_string(),
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
                page_size: 5,
                payment_debt_methods: vec![ResourceMethod::Post],
            },
            security: SecurityConfig {
                secret_key: String::new(),
                access_token_lifetime_secs: 15 * 60,
                refresh_token_lifetime_secs: 24 * 60 * 60,
                enable_cors: false,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            storage: StorageConfig {
                backend: StorageBackend::S3,
                access_key_id: "1234".to_string(),
                secret_access_key: "1234".to_string(),
                region: "us-east-1".to_string(),
                endpoint_url: None,
                bucket: "csv-files".to_string(),
                presigned_url_ttl_secs: 3600,
            },
            processing: ProcessingConfig { csv_delimiter: b';' },
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self.environment, Environment::Development)
    }

    /// DATABASE_URL with the password masked, for logs.
    pub fn redacted_database_url(&self) -> String {
        match url::Url::parse(&self.database.url) {
            Ok(mut parsed) => {
                if parsed.password().is_some() {
                    let _ = parsed.set_password(Some("****"));
                }
                parsed.to_string()
            }
            Err(_) => "<unparseable DATABASE_URL>".to_string(),
        }
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Ignoring invalid value for {}: '{}'", key, raw),
        }
    }
}

/// Accepts a single ASCII byte, or `\t` / `tab` spelled out.
pub fn parse_delimiter(raw: &str) -> Option<u8> {
    match raw {
        "\t" | "\\t" | "tab" | "TAB" => Some(b'\t'),
        s if s.len() == 1 => {
            let byte = s.as_bytes()[0];
            if byte.is_ascii() && !matches!(byte, b'"' | b'\n' | b'\r') {
                Some(byte)
            } else {
                None
            }
        }
        _ => None,
    }
}

fn parse_methods(raw: &str) -> Result<Vec<ResourceMethod>, String> {
    let mut methods = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let method: ResourceMethod = part.parse()?;
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
    Ok(methods)
}
