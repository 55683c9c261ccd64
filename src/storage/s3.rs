use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{config::Credentials, error::DisplayErrorContext, primitives::ByteStream, Client};

use super::{ObjectStore, StorageError};
use crate::config::StorageConfig;

/// S3 (or S3-compatible, e.g. LocalStack/MinIO) backend
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        if config.region.trim().is_empty() {
            return Err(StorageError::ConfigError("AWS region must not be empty".to_string()));
        }

        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "payments-api",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        // Custom endpoints (LocalStack, MinIO) only resolve path-style buckets
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint_url.is_some())
            .build();

        tracing::info!(
            "S3 object store ready (region {}, endpoint {})",
            config.region,
            config.endpoint_url.as_deref().unwrap_or("default")
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::NetworkError(DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "s3"
    }
}
