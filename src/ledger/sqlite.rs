use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;

use crate::research::{CreateTaskRequest, TaskStatus};

use super::{Ledger, TaskRecord};

/// SQLite-backed task ledger.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id           TEXT PRIMARY KEY,
                instructions TEXT NOT NULL,
                model        TEXT NOT NULL,
                status       TEXT NOT NULL,
                created_at   TEXT NOT NULL DEFAULT (datetime('now'))
            )",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(":memory:")
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn record(&self, id: &str, request: &CreateTaskRequest) -> Result<()> {
        let status = TaskStatus::Pending.to_string();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO tasks (id, instructions, model, status) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET status = excluded.status",
            [
                id,
                request.instructions.as_str(),
                request.model.as_str(),
                status.as_str(),
            ],
        )?;
        Ok(())
    }

    async fn update_status(&self, id: &str, status: TaskStatus) -> Result<()> {
        let status = status.to_string();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "UPDATE tasks SET status = ?2 WHERE id = ?1",
            [id, status.as_str()],
        )?;
        Ok(())
    }

    async fn history(&self, limit: usize) -> Result<Vec<TaskRecord>> {
        let conn = self.conn.lock().unwrap();
        // Get the last `limit` entries, but return them in chronological order
        let mut stmt = conn.prepare(
            "SELECT id, instructions, model, status, created_at FROM (
                SELECT id, instructions, model, status, created_at, rowid
                FROM tasks ORDER BY rowid DESC LIMIT ?1
            ) ORDER BY rowid ASC",
        )?;
        let records = stmt
            .query_map([limit as i64], |row| {
                Ok(TaskRecord {
                    id: row.get(0)?,
                    instructions: row.get(1)?,
                    model: row.get(2)?,
                    status: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM tasks", [])?;
        Ok(())
    }
}
