use std::sync::Arc;

use crate::config::AppConfig;
use crate::processing::{rewrite_csv, CsvRewriteError};
use crate::storage::{ObjectStore, StorageError};
use crate::types::Clock;

pub const CSV_EXTENSION: &str = ".csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("CSV rewrite error: {0}")]
    Rewrite(#[from] CsvRewriteError),
    #[error("Object storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A checked upload: UTF-8 text named `*.csv`, plus its path segments
#[derive(Debug, Clone)]
pub struct CsvUpload {
    pub origin: String,
    pub file_type: String,
    pub requester: String,
    pub filename: String,
    pub content: String,
}

/// Rewrites uploaded CSV files with the configured delimiter and stores them
pub struct UploadService {
    storage: Arc<dyn ObjectStore>,
    bucket: String,
    output_delimiter: u8,
    clock: Clock,
}

impl UploadService {
    pub fn new(storage: Arc<dyn ObjectStore>, config: &AppConfig, clock: Clock) -> Self {
        Self {
            storage,
            bucket: config.storage.bucket.clone(),
            output_delimiter: config.processing.csv_delimiter,
            clock,
        }
    }

    /// Normalize and store the upload, returning the object key written.
    pub async fn store(&self, upload: &CsvUpload) -> Result<String, UploadError> {
        let filename = versioned_filename(&upload.filename, (self.clock)());
        let key = object_key(&upload.origin, &upload.file_type, &upload.requester, &filename);

        let body = rewrite_csv(&upload.content, self.output_delimiter)?;

        self.storage
            .put_object(&self.bucket, &key, body, CSV_CONTENT_TYPE)
            .await?;

        tracing::info!(
            "Stored '{}' as s3://{}/{} via {}",
            upload.filename,
            self.bucket,
            key,
            self.storage.backend_name()
        );
        Ok(key)
    }
}

/// `payments.csv` at 1664582400000 becomes `payments_1664582400000.csv`.
/// Any client-side directory part of the name is dropped.
pub fn versioned_filename(original: &str, epoch_ms: i64) -> String {
    let name = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let stem = name.strip_suffix(CSV_EXTENSION).unwrap_or(name);
    format!("{}_{}{}", stem, epoch_ms, CSV_EXTENSION)
}

pub fn object_key(origin: &str, file_type: &str, requester: &str, filename: &str) -> String {
    format!("{}/{}/{}/{}", origin, file_type, requester, filename)
}
