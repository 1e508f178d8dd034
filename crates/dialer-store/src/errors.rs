//! Store error types.

/// Errors raised by a [`crate::KeyValueStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but is not a flat JSON object of strings.
    #[error("store file {path} is corrupt: {reason}")]
    Corrupt {
        /// Offending file.
        path: String,
        /// What failed to parse.
        reason: String,
    },

    /// Serializing the store contents failed.
    #[error("failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
