use chrono::{DateTime, Utc};
use rusqlite::Connection;

use taskdeck_core::{NewTask, PositionUpdate, Subtask, Task, TaskId, TaskPatch, UserId};

use crate::error::RemoteError;
use crate::remote::RemoteStore;

/// Blob column to the fixed-size byte array ids are stored as (16 bytes).
fn to_array<const N: usize>(v: Vec<u8>, label: &str) -> Result<[u8; N], RemoteError> {
    v.try_into()
        .map_err(|_| RemoteError::Read(format!("invalid {label} length")))
}

/// Reference implementation of the remote store: one relational `todos`
/// table, subtasks nested as a JSON column. Assigns task ids on insert, as
/// the real backend would.
pub struct SqliteRemoteStore {
    conn: Connection,
}

impl SqliteRemoteStore {
    pub fn open(path: &str) -> Result<Self, RemoteError> {
        let conn = Connection::open(path).map_err(|e| RemoteError::Read(e.to_string()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, RemoteError> {
        let conn = Connection::open_in_memory().map_err(|e| RemoteError::Read(e.to_string()))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, RemoteError> {
        crate::schema::init_remote_schema(&conn)
            .map_err(|e| RemoteError::Write(e.to_string()))?;
        Ok(Self { conn })
    }
}

fn read_task(row: &rusqlite::Row) -> Result<Task, RemoteError> {
    let id_bytes: Vec<u8> = row.get(0).map_err(|e| RemoteError::Read(e.to_string()))?;
    let owner_id: String = row.get(1).map_err(|e| RemoteError::Read(e.to_string()))?;
    let title: String = row.get(2).map_err(|e| RemoteError::Read(e.to_string()))?;
    let position: i64 = row.get(3).map_err(|e| RemoteError::Read(e.to_string()))?;
    let is_complete: bool = row.get(4).map_err(|e| RemoteError::Read(e.to_string()))?;
    let subtasks_json: String = row.get(5).map_err(|e| RemoteError::Read(e.to_string()))?;
    let created_at: String = row.get(6).map_err(|e| RemoteError::Read(e.to_string()))?;

    let subtasks: Vec<Subtask> =
        serde_json::from_str(&subtasks_json).map_err(|e| RemoteError::Read(e.to_string()))?;
    let created_at = created_at
        .parse::<DateTime<Utc>>()
        .map_err(|e| RemoteError::Read(e.to_string()))?;

    Ok(Task {
        id: TaskId::from_bytes(to_array::<16>(id_bytes, "task id")?),
        title,
        owner_id: UserId::new(owner_id),
        position,
        is_complete,
        subtasks,
        created_at,
    })
}

fn subtasks_json(subtasks: &[Subtask]) -> Result<String, RemoteError> {
    serde_json::to_string(subtasks).map_err(|e| RemoteError::Write(e.to_string()))
}

impl RemoteStore for SqliteRemoteStore {
    fn list_ordered(&self) -> Result<Vec<Task>, RemoteError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, owner_id, title, position, is_complete, subtasks, created_at
                 FROM todos ORDER BY position ASC",
            )
            .map_err(|e| RemoteError::Read(e.to_string()))?;

        let mut rows = stmt
            .query([])
            .map_err(|e| RemoteError::Read(e.to_string()))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next().map_err(|e| RemoteError::Read(e.to_string()))? {
            tasks.push(read_task(row)?);
        }
        Ok(tasks)
    }

    fn insert(&mut self, task: &NewTask) -> Result<Task, RemoteError> {
        let id = TaskId::new();
        self.conn
            .execute(
                "INSERT INTO todos (id, owner_id, title, position, is_complete, subtasks, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    id.as_bytes().as_slice(),
                    task.owner_id.as_str(),
                    task.title,
                    task.position,
                    task.is_complete,
                    subtasks_json(&task.subtasks)?,
                    task.created_at.to_rfc3339(),
                ],
            )
            .map_err(|e| RemoteError::Write(e.to_string()))?;
        Ok(task.clone().with_id(id))
    }

    // One UPDATE per patch shape: a patch naming both fields must land as a
    // single statement, never a half-applied pair.
    fn update_fields(&mut self, id: TaskId, patch: &TaskPatch) -> Result<(), RemoteError> {
        let result = match (patch.is_complete, &patch.subtasks) {
            (None, None) => return Ok(()),
            (Some(is_complete), None) => self.conn.execute(
                "UPDATE todos SET is_complete = ?1 WHERE id = ?2",
                rusqlite::params![is_complete, id.as_bytes().as_slice()],
            ),
            (None, Some(subtasks)) => self.conn.execute(
                "UPDATE todos SET subtasks = ?1 WHERE id = ?2",
                rusqlite::params![subtasks_json(subtasks)?, id.as_bytes().as_slice()],
            ),
            (Some(is_complete), Some(subtasks)) => self.conn.execute(
                "UPDATE todos SET is_complete = ?1, subtasks = ?2 WHERE id = ?3",
                rusqlite::params![
                    is_complete,
                    subtasks_json(subtasks)?,
                    id.as_bytes().as_slice()
                ],
            ),
        };
        result
            .map(|_| ())
            .map_err(|e| RemoteError::Write(e.to_string()))
    }

    fn delete(&mut self, id: TaskId) -> Result<(), RemoteError> {
        self.conn
            .execute(
                "DELETE FROM todos WHERE id = ?1",
                rusqlite::params![id.as_bytes().as_slice()],
            )
            .map_err(|e| RemoteError::Write(e.to_string()))?;
        Ok(())
    }

    fn batch_update_positions(&mut self, updates: &[PositionUpdate]) -> Result<(), RemoteError> {
        let tx = self
            .conn
            .transaction()
            .map_err(|e| RemoteError::Write(e.to_string()))?;
        for update in updates {
            tx.execute(
                "UPDATE todos SET position = ?1 WHERE id = ?2",
                rusqlite::params![update.position, update.id.as_bytes().as_slice()],
            )
            .map_err(|e| RemoteError::Write(e.to_string()))?;
        }
        tx.commit().map_err(|e| RemoteError::Write(e.to_string()))
    }
}
