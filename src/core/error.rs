//! Error types for the voxcraft pipeline

use thiserror::Error;

/// Standard Result type for the pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the converter
///
/// Recoverable input anomalies (malformed face records, unknown OBJ keywords,
/// missing material references) never show up here; they are logged and
/// skipped at the lowest layer that can safely continue. An `Error` aborts
/// the whole run.
#[derive(Debug, Error)]
pub enum Error {
    /// Division (or reciprocal) of a zero-valued fraction.
    #[error("division by zero fraction")]
    DivisionByZero,

    /// A face record referenced a vertex or texcoord slot that does not
    /// exist. The index tables are internally inconsistent, so any output
    /// would be silently wrong.
    #[error("{table} index {index} out of range ({len} entries)")]
    IndexOutOfRange {
        table: &'static str,
        index: i64,
        len: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("block id pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("asset error: {0}")]
    Asset(String),

    #[error("video error: {0}")]
    Video(String),
}
