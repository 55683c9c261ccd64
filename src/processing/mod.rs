//! CSV normalization for uploaded payment files: detect the input delimiter,
//! then re-emit the same rows with the configured one.

use thiserror::Error;

pub mod rewrite;
pub mod sniffer;

pub use rewrite::rewrite_csv;
pub use sniffer::sniff_delimiter;

#[derive(Debug, Error)]
pub enum CsvRewriteError {
    #[error("CSV input has no header row")]
    Empty,

    #[error("Line {line}: expected at most {expected} fields, found {found}")]
    TooManyFields { line: u64, expected: usize, found: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
