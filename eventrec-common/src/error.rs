//! Common error types for eventrec

use thiserror::Error;

/// Common result type for eventrec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy shared by the library and the server
///
/// None of these are fatal to a running session: persistence failures leave the
/// in-memory list as the working state, export and upload failures are local to
/// the operation that raised them.
#[derive(Error, Debug)]
pub enum Error {
    /// Local store could not be opened (missing permissions, disk full, ...)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Bulk read of the event table failed
    #[error("Read failed: {0}")]
    ReadFailed(String),

    /// Bulk replace of the event table failed (nothing was applied)
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Required event field missing or malformed
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// Report document could not be produced
    #[error("Export failed: {0}")]
    ExportFailed(String),

    /// Remote media transfer failed
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
