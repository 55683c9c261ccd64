pub mod format;
pub mod openapi;

pub use format::{Page, PageQuery};
pub use openapi::openapi_document;
