pub mod sqlite;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::research::{CreateTaskRequest, TaskStatus};

/// A task submitted from this machine, as remembered locally.
///
/// `status` is the last status we observed; the service is the source
/// of truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub instructions: String,
    pub model: String,
    pub status: String,
    pub created_at: String,
}

/// What this machine remembers about submitted tasks. Could be SQLite,
/// could be in-memory for tests.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Remember a freshly created task.
    async fn record(&self, id: &str, request: &CreateTaskRequest) -> Result<()>;

    /// Update the last observed status of a task. Unknown ids are ignored.
    async fn update_status(&self, id: &str, status: TaskStatus) -> Result<()>;

    /// The last `limit` records, in chronological order.
    async fn history(&self, limit: usize) -> Result<Vec<TaskRecord>>;

    async fn clear(&self) -> Result<()>;
}
