use std::cell::Cell;
use std::rc::Rc;

use taskdeck_core::{NewTask, PositionUpdate, Task, TaskId, TaskPatch};
use taskdeck_storage::{RemoteError, RemoteStore, SqliteRemoteStore};

#[derive(Default)]
struct Switches {
    fail_list: Cell<bool>,
    fail_insert: Cell<bool>,
    fail_update: Cell<bool>,
    fail_delete: Cell<bool>,
    fail_batch: Cell<bool>,
}

/// Shared toggles for injecting remote failures. The test keeps one clone,
/// the engine-owned `FlakyRemote` the other.
#[derive(Clone, Default)]
pub struct FailureSwitches {
    inner: Rc<Switches>,
}

impl FailureSwitches {
    pub fn fail_list(&self, on: bool) {
        self.inner.fail_list.set(on);
    }

    pub fn fail_insert(&self, on: bool) {
        self.inner.fail_insert.set(on);
    }

    pub fn fail_update(&self, on: bool) {
        self.inner.fail_update.set(on);
    }

    pub fn fail_delete(&self, on: bool) {
        self.inner.fail_delete.set(on);
    }

    pub fn fail_batch(&self, on: bool) {
        self.inner.fail_batch.set(on);
    }
}

/// Remote store wrapper that fails on demand, backed by an in-memory
/// `SqliteRemoteStore`. A tripped switch rejects the call before it reaches
/// the backing store, like a transport failure would.
pub struct FlakyRemote {
    inner: SqliteRemoteStore,
    switches: FailureSwitches,
}

impl FlakyRemote {
    pub fn in_memory(switches: FailureSwitches) -> Result<Self, RemoteError> {
        Ok(Self {
            inner: SqliteRemoteStore::open_in_memory()?,
            switches,
        })
    }

    pub fn inner_mut(&mut self) -> &mut SqliteRemoteStore {
        &mut self.inner
    }
}

impl RemoteStore for FlakyRemote {
    fn list_ordered(&self) -> Result<Vec<Task>, RemoteError> {
        if self.switches.inner.fail_list.get() {
            return Err(RemoteError::Read("injected read failure".into()));
        }
        self.inner.list_ordered()
    }

    fn insert(&mut self, task: &NewTask) -> Result<Task, RemoteError> {
        if self.switches.inner.fail_insert.get() {
            return Err(RemoteError::Write("injected insert failure".into()));
        }
        self.inner.insert(task)
    }

    fn update_fields(&mut self, id: TaskId, patch: &TaskPatch) -> Result<(), RemoteError> {
        if self.switches.inner.fail_update.get() {
            return Err(RemoteError::Write("injected update failure".into()));
        }
        self.inner.update_fields(id, patch)
    }

    fn delete(&mut self, id: TaskId) -> Result<(), RemoteError> {
        if self.switches.inner.fail_delete.get() {
            return Err(RemoteError::Write("injected delete failure".into()));
        }
        self.inner.delete(id)
    }

    fn batch_update_positions(&mut self, updates: &[PositionUpdate]) -> Result<(), RemoteError> {
        if self.switches.inner.fail_batch.get() {
            return Err(RemoteError::Write("injected batch failure".into()));
        }
        self.inner.batch_update_positions(updates)
    }
}
