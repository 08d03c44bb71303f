use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{SubtaskId, TaskId, UserId};

/// Spacing between position keys. New tasks are placed one step before the
/// current minimum; a reorder renumbers to `index * POSITION_STEP`.
pub const POSITION_STEP: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    pub title: String,
    pub is_complete: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: SubtaskId::new(),
            title: title.into(),
            is_complete: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub owner_id: UserId,
    pub position: i64,
    pub is_complete: bool,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Re-derive `is_complete` from the subtask sequence. With no subtasks
    /// the flag is independently set and stays as it is.
    pub fn recompute_complete(&mut self) {
        if let Some(complete) = derived_complete(&self.subtasks) {
            self.is_complete = complete;
        }
    }
}

/// A task as handed to the remote store for insertion: the backend assigns
/// the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub owner_id: UserId,
    pub position: i64,
    pub is_complete: bool,
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, owner_id: UserId, position: i64) -> Self {
        Self {
            title: title.into(),
            owner_id,
            position,
            is_complete: false,
            subtasks: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Materialize with an assigned id. Guest mode generates the id on the
    /// client; the remote reference store does the same on its side.
    pub fn with_id(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            owner_id: self.owner_id,
            position: self.position,
            is_complete: self.is_complete,
            subtasks: self.subtasks,
            created_at: self.created_at,
        }
    }
}

/// Partial update for a remote row. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub is_complete: Option<bool>,
    pub subtasks: Option<Vec<Subtask>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionUpdate {
    pub id: TaskId,
    pub position: i64,
}

/// Parent completion derived from the subtask sequence: `Some(all complete)`
/// when there is at least one subtask, `None` when there are none (the
/// parent keeps its own flag).
pub fn derived_complete(subtasks: &[Subtask]) -> Option<bool> {
    if subtasks.is_empty() {
        None
    } else {
        Some(subtasks.iter().all(|s| s.is_complete))
    }
}

/// Position key that sorts before every task in `tasks`. Scans for the
/// actual minimum rather than assuming contiguity, so it stays correct
/// after arbitrary deletions and reorders.
pub fn position_before(tasks: &[Task]) -> i64 {
    tasks.iter().map(|t| t.position).min().unwrap_or(0) - POSITION_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(position: i64) -> Task {
        NewTask::new("t", UserId::from("u1"), position).with_id(TaskId::new())
    }

    #[test]
    fn derived_complete_empty_is_none() {
        assert_eq!(derived_complete(&[]), None);
    }

    #[test]
    fn derived_complete_tracks_all_subtasks() {
        let mut subtasks = vec![Subtask::new("a"), Subtask::new("b")];
        assert_eq!(derived_complete(&subtasks), Some(false));

        subtasks[0].is_complete = true;
        assert_eq!(derived_complete(&subtasks), Some(false));

        subtasks[1].is_complete = true;
        assert_eq!(derived_complete(&subtasks), Some(true));
    }

    #[test]
    fn recompute_leaves_flag_when_no_subtasks() {
        let mut t = task(0);
        t.is_complete = true;
        t.recompute_complete();
        assert!(t.is_complete);
    }

    #[test]
    fn position_before_empty_collection() {
        assert_eq!(position_before(&[]), -POSITION_STEP);
    }

    #[test]
    fn position_before_scans_for_minimum() {
        let tasks = vec![task(3000), task(-2000), task(0)];
        assert_eq!(position_before(&tasks), -3000);
    }

    #[test]
    fn position_before_ignores_gaps() {
        // Positions left sparse by deletions still yield a key below all.
        let tasks = vec![task(500), task(70_000)];
        assert_eq!(position_before(&tasks), -500);
    }
}
