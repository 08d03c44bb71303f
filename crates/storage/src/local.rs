use rusqlite::{Connection, OptionalExtension};

use taskdeck_core::Task;

use crate::error::StorageError;

const TASKS_SLOT: &str = "guest_todos";
const GUEST_FLAG_SLOT: &str = "is_guest";

/// Durable client-side key-value slot. The full task collection is stored
/// under one key as a JSON array of Task records with nested subtask
/// arrays; that exact shape round-trips losslessly through save/load.
pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        crate::schema::init_local_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        crate::schema::init_local_schema(&conn)?;
        Ok(Self { conn })
    }

    fn read_slot(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO slots (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    fn clear_slot(&self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM slots WHERE key = ?1", [key])?;
        Ok(())
    }

    /// Read the whole collection; an absent slot is an empty collection.
    pub fn read_tasks(&self) -> Result<Vec<Task>, StorageError> {
        match self.read_slot(TASKS_SLOT)? {
            Some(json) => {
                serde_json::from_str(&json).map_err(|e| StorageError::Serialization(e.to_string()))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Snapshot-replace the whole collection. Serialized and written as one
    /// statement, so the slot never holds a partial collection.
    pub fn write_tasks(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let json =
            serde_json::to_string(tasks).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.write_slot(TASKS_SLOT, &json)
    }

    pub fn read_guest_flag(&self) -> Result<bool, StorageError> {
        Ok(self.read_slot(GUEST_FLAG_SLOT)?.as_deref() == Some("true"))
    }

    pub fn write_guest_flag(&self, is_guest: bool) -> Result<(), StorageError> {
        if is_guest {
            self.write_slot(GUEST_FLAG_SLOT, "true")
        } else {
            self.clear_slot(GUEST_FLAG_SLOT)
        }
    }

    pub fn clear_guest_flag(&self) -> Result<(), StorageError> {
        self.clear_slot(GUEST_FLAG_SLOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::{NewTask, Subtask, TaskId, UserId};

    fn sample_task(title: &str, position: i64) -> Task {
        let mut task = NewTask::new(title, UserId::from("u1"), position).with_id(TaskId::new());
        task.subtasks.push(Subtask::new("step one"));
        task.subtasks.push(Subtask::new("step two"));
        task.subtasks[1].is_complete = true;
        task
    }

    #[test]
    fn absent_slot_reads_empty() -> Result<(), StorageError> {
        let store = LocalStore::open_in_memory()?;
        assert!(store.read_tasks()?.is_empty());
        Ok(())
    }

    #[test]
    fn tasks_round_trip_structurally_equal() -> Result<(), StorageError> {
        let store = LocalStore::open_in_memory()?;
        let tasks = vec![sample_task("a", -1000), sample_task("b", 0)];

        store.write_tasks(&tasks)?;
        let loaded = store.read_tasks()?;

        assert_eq!(loaded, tasks);
        Ok(())
    }

    #[test]
    fn write_replaces_previous_snapshot() -> Result<(), StorageError> {
        let store = LocalStore::open_in_memory()?;
        store.write_tasks(&[sample_task("a", 0)])?;
        store.write_tasks(&[])?;
        assert!(store.read_tasks()?.is_empty());
        Ok(())
    }

    #[test]
    fn slot_is_a_json_array() -> Result<(), StorageError> {
        let store = LocalStore::open_in_memory()?;
        store.write_tasks(&[sample_task("a", 0)])?;

        let raw = store.read_slot(TASKS_SLOT)?.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(parsed.is_array());
        assert!(parsed[0]["subtasks"].is_array());
        Ok(())
    }

    #[test]
    fn guest_flag_round_trip() -> Result<(), StorageError> {
        let store = LocalStore::open_in_memory()?;
        assert!(!store.read_guest_flag()?);

        store.write_guest_flag(true)?;
        assert!(store.read_guest_flag()?);

        store.clear_guest_flag()?;
        assert!(!store.read_guest_flag()?);
        Ok(())
    }

    #[test]
    fn persists_across_reopen() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("local.db");
        let path = path.to_str().unwrap();

        let tasks = vec![sample_task("durable", -1000)];
        {
            let store = LocalStore::open(path)?;
            store.write_tasks(&tasks)?;
        }
        let store = LocalStore::open(path)?;
        assert_eq!(store.read_tasks()?, tasks);
        Ok(())
    }
}
