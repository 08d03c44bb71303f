use thiserror::Error;

/// Failures of the local key-value slot.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Failures of the remote store, split by whether a read or a write was
/// rejected. The engine maps these onto its rollback policy.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote read failed: {0}")]
    Read(String),

    #[error("remote write failed: {0}")]
    Write(String),
}
