pub mod exa;
pub mod mock;
pub mod poll;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::schema::OutputSchema;

/// Lifecycle of a research task on the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Canceled,
}

impl TaskStatus {
    /// Whether the task will never change state again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Canceled
        )
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
            TaskStatus::Canceled => "canceled",
        };
        write!(f, "{s}")
    }
}

/// A research task as reported by the service.
///
/// `data` is the materialized result and is only present once the task
/// has completed. Timestamps are passed through as the service sends them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// The create response. The id is opaque to us.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedTask {
    pub id: String,
}

/// One page of the task listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPage {
    pub data: Vec<Task>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Wire wrapper for the output constraint: `{"output": {"schema": ...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSpec {
    pub schema: OutputSchema,
}

/// A request to create a research task.
///
/// Serializes to exactly what the caller provided: the instructions string
/// and the schema object go over the wire unmodified, and `output` is
/// omitted entirely when no schema was given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskRequest {
    pub instructions: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSpec>,
}

impl CreateTaskRequest {
    pub fn new(instructions: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            model: model.into(),
            output: None,
        }
    }

    pub fn with_schema(mut self, schema: OutputSchema) -> Self {
        self.output = Some(OutputSpec { schema });
        self
    }
}

/// The research service surface. main.rs and the showcase flow only know
/// this trait; `exa` talks to the real service, `mock` scripts one for tests.
#[async_trait]
pub trait Research: Send + Sync {
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<CreatedTask>;

    async fn get_task(&self, id: &str) -> Result<Task>;

    async fn list_tasks(&self, cursor: Option<&str>, limit: Option<u32>) -> Result<TaskPage>;
}

/// Follow pagination to the end and return every task the service knows.
pub async fn list_all(research: &dyn Research) -> Result<Vec<Task>> {
    let mut tasks = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let page = research.list_tasks(cursor.as_deref(), None).await?;
        tasks.extend(page.data);

        if !page.has_more {
            break;
        }
        match page.next_cursor {
            Some(next) => cursor = Some(next),
            // A page claiming has_more without a cursor cannot be followed.
            None => break,
        }
    }

    Ok(tasks)
}
