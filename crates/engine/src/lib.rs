pub mod error;
pub mod notify;

pub use error::{EngineError, ErrorInfo, ErrorKind};
pub use notify::{Notifier, NullNotifier, Severity};

use std::fmt;

use tracing::{debug, warn};

use taskdeck_core::{
    position_before, NewTask, PersistMode, PositionUpdate, SessionContext, Subtask, SubtaskId,
    Task, TaskId, TaskPatch, UserId, POSITION_STEP,
};
use taskdeck_storage::{LocalStore, RemoteStore};

/// Dual-backend task synchronization engine.
///
/// Owns the in-memory ordered collection, the single source of truth for
/// rendering, and mirrors it to whichever backend the session mode selects:
/// the local key-value slot for guests, the remote store for accounts.
/// Mutations are applied optimistically; where a rollback is defined, a
/// rejected backend write restores the pre-mutation state exactly.
///
/// The mode is captured once at each operation's entry, so a session switch
/// mid-operation cannot split one logical mutation across backends.
pub struct TaskEngine<R: RemoteStore> {
    tasks: Vec<Task>,
    is_loading: bool,
    last_error: Option<ErrorInfo>,
    local: LocalStore,
    remote: R,
    session: Box<dyn SessionContext>,
    notifier: Box<dyn Notifier>,
}

impl<R: RemoteStore> TaskEngine<R> {
    pub fn new(
        local: LocalStore,
        remote: R,
        session: Box<dyn SessionContext>,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        Self {
            tasks: Vec::new(),
            is_loading: false,
            last_error: None,
            local,
            remote,
            session,
            notifier,
        }
    }

    /// Display order, position ascending in account mode, last-saved order
    /// in guest mode.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn last_error(&self) -> Option<&ErrorInfo> {
        self.last_error.as_ref()
    }

    pub fn remote_mut(&mut self) -> &mut R {
        &mut self.remote
    }

    pub fn local(&self) -> &LocalStore {
        &self.local
    }

    /// Record a failure: at most one `last_error` and one notification per
    /// operation. The rollback itself, when one happens, is silent.
    fn report(&mut self, kind: ErrorKind, message: &str, detail: &dyn fmt::Display) {
        warn!(%detail, ?kind, "{message}");
        self.last_error = Some(ErrorInfo {
            kind,
            message: message.to_string(),
        });
        self.notifier.notify(message, Severity::Error);
    }

    /// Mirror the whole collection to the local slot. The slot is modeled
    /// as non-failing, so a rejected write is reported and the in-memory
    /// state kept.
    fn save_local(&mut self) {
        if let Err(e) = self.local.write_tasks(&self.tasks) {
            self.report(ErrorKind::AcceptedWriteFailure, "Failed to save tasks", &e);
        }
    }

    /// Replace the collection from the active backend. On a remote read
    /// failure the current collection stays as it is; no partial
    /// overwrite.
    pub fn fetch_all(&mut self) {
        let mode = self.session.mode();
        self.is_loading = true;
        self.last_error = None;
        debug!(guest = mode.is_guest(), "fetching task collection");

        let result = match &mode {
            PersistMode::Guest => self.local.read_tasks().map_err(|e| e.to_string()),
            PersistMode::Account { .. } => self.remote.list_ordered().map_err(|e| e.to_string()),
        };
        match result {
            Ok(tasks) => self.tasks = tasks,
            Err(detail) => self.report(ErrorKind::ReadFailure, "Failed to load tasks", &detail),
        }
        self.is_loading = false;
    }

    /// Create a task sorted before everything currently in the collection.
    /// Whitespace-only titles are a no-op. In account mode the task is only
    /// added once the remote confirms it (and has assigned the id); the
    /// error is returned as well as reported, so a creation form can react.
    pub fn add_todo(&mut self, title: &str, owner: &UserId) -> Result<(), EngineError> {
        let mode = self.session.mode();
        self.last_error = None;

        let title = title.trim();
        if title.is_empty() {
            return Ok(());
        }
        let new_task = NewTask::new(title, owner.clone(), position_before(&self.tasks));

        match mode {
            PersistMode::Guest => {
                self.tasks.insert(0, new_task.with_id(TaskId::new()));
                self.save_local();
                Ok(())
            }
            PersistMode::Account { .. } => match self.remote.insert(&new_task) {
                Ok(task) => {
                    self.tasks.insert(0, task);
                    Ok(())
                }
                Err(e) => {
                    self.report(ErrorKind::RecoverableWriteFailure, "Failed to add task", &e);
                    Err(e.into())
                }
            },
        }
    }

    /// Flip completion optimistically; a rejected remote update flips it
    /// straight back.
    pub fn toggle_todo(&mut self, id: TaskId) {
        let mode = self.session.mode();
        self.last_error = None;

        let Some(index) = self.tasks.iter().position(|t| t.id == id) else {
            return;
        };
        self.tasks[index].is_complete = !self.tasks[index].is_complete;
        let is_complete = self.tasks[index].is_complete;

        match mode {
            PersistMode::Guest => self.save_local(),
            PersistMode::Account { .. } => {
                let patch = TaskPatch {
                    is_complete: Some(is_complete),
                    subtasks: None,
                };
                if let Err(e) = self.remote.update_fields(id, &patch) {
                    self.tasks[index].is_complete = !is_complete;
                    self.report(
                        ErrorKind::RecoverableWriteFailure,
                        "Failed to update task",
                        &e,
                    );
                }
            }
        }
    }

    /// Remove optimistically, holding the prior collection; a rejected
    /// remote delete restores it exactly, order and all fields.
    pub fn remove_todo(&mut self, id: TaskId) {
        let mode = self.session.mode();
        self.last_error = None;

        let previous = self.tasks.clone();
        self.tasks.retain(|t| t.id != id);

        match mode {
            PersistMode::Guest => self.save_local(),
            PersistMode::Account { .. } => {
                if let Err(e) = self.remote.delete(id) {
                    self.tasks = previous;
                    self.report(
                        ErrorKind::RecoverableWriteFailure,
                        "Failed to delete task",
                        &e,
                    );
                }
            }
        }
    }

    /// Adopt a new display order (ids as the caller now wants them shown;
    /// ids not in the collection are skipped, tasks not named keep their
    /// relative order at the end). Account mode renumbers every row to
    /// `index * POSITION_STEP` in one batch and, on success, resyncs the
    /// in-memory position fields to those values so the min-scan in
    /// `add_todo` stays correct. On failure the reordering is kept, an
    /// accepted inconsistency.
    pub fn update_positions(&mut self, order: &[TaskId]) {
        let mode = self.session.mode();
        self.last_error = None;

        let mut reordered = Vec::with_capacity(self.tasks.len());
        for id in order {
            if let Some(index) = self.tasks.iter().position(|t| t.id == *id) {
                reordered.push(self.tasks.remove(index));
            }
        }
        reordered.append(&mut self.tasks);
        self.tasks = reordered;

        match mode {
            PersistMode::Guest => self.save_local(),
            PersistMode::Account { .. } => {
                let updates: Vec<PositionUpdate> = self
                    .tasks
                    .iter()
                    .enumerate()
                    .map(|(index, task)| PositionUpdate {
                        id: task.id,
                        position: index as i64 * POSITION_STEP,
                    })
                    .collect();
                match self.remote.batch_update_positions(&updates) {
                    Ok(()) => {
                        for (index, task) in self.tasks.iter_mut().enumerate() {
                            task.position = index as i64 * POSITION_STEP;
                        }
                    }
                    Err(e) => self.report(
                        ErrorKind::AcceptedWriteFailure,
                        "Failed to save the new order",
                        &e,
                    ),
                }
            }
        }
    }

    /// Append a subtask to a task. Unknown parent ids and whitespace-only
    /// titles are no-ops.
    pub fn add_subtask(&mut self, todo_id: TaskId, title: &str) {
        let mode = self.session.mode();
        self.last_error = None;

        let title = title.trim();
        if title.is_empty() {
            return;
        }
        let Some(index) = self.tasks.iter().position(|t| t.id == todo_id) else {
            return;
        };
        self.tasks[index].subtasks.push(Subtask::new(title));
        self.tasks[index].recompute_complete();
        self.save_subtasks(mode, index);
    }

    /// Flip one subtask and re-derive the parent's completion from the
    /// whole sequence.
    pub fn toggle_subtask(&mut self, todo_id: TaskId, subtask_id: SubtaskId) {
        let mode = self.session.mode();
        self.last_error = None;

        let Some(index) = self.tasks.iter().position(|t| t.id == todo_id) else {
            return;
        };
        let Some(subtask) = self.tasks[index]
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
        else {
            return;
        };
        subtask.is_complete = !subtask.is_complete;
        self.tasks[index].recompute_complete();
        self.save_subtasks(mode, index);
    }

    /// Remove one subtask. A removal that empties the list leaves the
    /// parent's flag exactly as it was.
    pub fn remove_subtask(&mut self, todo_id: TaskId, subtask_id: SubtaskId) {
        let mode = self.session.mode();
        self.last_error = None;

        let Some(index) = self.tasks.iter().position(|t| t.id == todo_id) else {
            return;
        };
        self.tasks[index].subtasks.retain(|s| s.id != subtask_id);
        self.tasks[index].recompute_complete();
        self.save_subtasks(mode, index);
    }

    /// Shared save routine for every subtask mutation: guest mode mirrors
    /// the whole collection; account mode updates the parent row's subtasks
    /// and completion together. A remote failure is reported but the
    /// in-memory mutation is kept, an accepted inconsistency.
    fn save_subtasks(&mut self, mode: PersistMode, index: usize) {
        match mode {
            PersistMode::Guest => self.save_local(),
            PersistMode::Account { .. } => {
                let task = &self.tasks[index];
                let patch = TaskPatch {
                    is_complete: Some(task.is_complete),
                    subtasks: Some(task.subtasks.clone()),
                };
                let id = task.id;
                if let Err(e) = self.remote.update_fields(id, &patch) {
                    self.report(
                        ErrorKind::AcceptedWriteFailure,
                        "Failed to save subtasks",
                        &e,
                    );
                }
            }
        }
    }
}
