use thiserror::Error;

/// Error types for the JSON data layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem access failed
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A data file could not be encoded or decoded
    #[error("Storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;
