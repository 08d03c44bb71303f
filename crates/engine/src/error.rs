use taskdeck_storage::{RemoteError, StorageError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),
}

/// How a failed operation left the in-memory collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fetch could not retrieve data; the collection was not touched.
    ReadFailure,
    /// The backend rejected a mutation and the optimistic change was rolled
    /// back to the pre-mutation snapshot.
    RecoverableWriteFailure,
    /// The backend rejected a mutation and the optimistic change was kept.
    AcceptedWriteFailure,
}

/// Last failure recorded by the engine, one per operation at most.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}
