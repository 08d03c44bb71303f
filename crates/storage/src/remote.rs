use taskdeck_core::{NewTask, PositionUpdate, Task, TaskId, TaskPatch};

use crate::error::RemoteError;

/// The remote relational store, transport left to the implementation.
/// Reads fail with `RemoteError::Read`, writes with `RemoteError::Write`.
pub trait RemoteStore {
    /// Full collection ordered by position ascending.
    fn list_ordered(&self) -> Result<Vec<Task>, RemoteError>;

    /// Insert a task; the store assigns and returns the id.
    fn insert(&mut self, task: &NewTask) -> Result<Task, RemoteError>;

    /// Update only the fields present in the patch, as one write: either
    /// every named field lands or none does.
    fn update_fields(&mut self, id: TaskId, patch: &TaskPatch) -> Result<(), RemoteError>;

    fn delete(&mut self, id: TaskId) -> Result<(), RemoteError>;

    /// Apply every position assignment as one atomic batch.
    fn batch_update_positions(&mut self, updates: &[PositionUpdate]) -> Result<(), RemoteError>;
}
