pub mod auth_service;
pub mod upload_service;

pub use auth_service::{AuthError, AuthService};
pub use upload_service::{CsvUpload, UploadError, UploadService};
