use std::sync::Mutex;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::{CreateTaskRequest, CreatedTask, Research, Task, TaskPage, TaskStatus};

/// A scripted research service for tests.
///
/// Every created task walks the same status script: the n-th `get_task`
/// call reports the n-th scripted status, and the last entry repeats
/// forever. A task that reaches `completed` carries the configured result
/// as its `data`.
pub struct MockResearch {
    script: Vec<TaskStatus>,
    result: serde_json::Value,
    page_size: usize,
    tasks: Mutex<Vec<TrackedTask>>,
}

struct TrackedTask {
    task: Task,
    gets: usize,
}

impl MockResearch {
    pub fn new(script: Vec<TaskStatus>, result: serde_json::Value) -> Self {
        Self {
            script,
            result,
            page_size: 25,
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// A service where every task completes on the third status check.
    pub fn completing(result: serde_json::Value) -> Self {
        Self::new(
            vec![
                TaskStatus::Pending,
                TaskStatus::Running,
                TaskStatus::Completed,
            ],
            result,
        )
    }

    /// A service whose tasks never leave `pending`.
    pub fn stuck() -> Self {
        Self::new(vec![TaskStatus::Pending], serde_json::Value::Null)
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn status_at(&self, gets: usize) -> TaskStatus {
        self.script
            .get(gets.saturating_sub(1))
            .or(self.script.last())
            .copied()
            .unwrap_or(TaskStatus::Completed)
    }
}

#[async_trait]
impl Research for MockResearch {
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<CreatedTask> {
        let mut tasks = self.tasks.lock().unwrap();
        let id = format!("task_{:02}", tasks.len() + 1);

        tasks.push(TrackedTask {
            task: Task {
                id: id.clone(),
                status: self.status_at(1),
                instructions: request.instructions.clone(),
                model: request.model.clone(),
                data: None,
                failure_reason: None,
                created_at: None,
            },
            gets: 0,
        });

        Ok(CreatedTask { id })
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        let mut tasks = self.tasks.lock().unwrap();
        let tracked = tasks
            .iter_mut()
            .find(|t| t.task.id == id)
            .ok_or_else(|| anyhow!("research API error (404 Not Found): no task {id}"))?;

        tracked.gets += 1;
        tracked.task.status = self.status_at(tracked.gets);
        if tracked.task.status == TaskStatus::Completed {
            tracked.task.data = Some(self.result.clone());
        }

        Ok(tracked.task.clone())
    }

    async fn list_tasks(&self, cursor: Option<&str>, limit: Option<u32>) -> Result<TaskPage> {
        let tasks = self.tasks.lock().unwrap();

        let offset: usize = match cursor {
            Some(cursor) => cursor
                .parse()
                .map_err(|_| anyhow!("research API error (400 Bad Request): bad cursor {cursor}"))?,
            None => 0,
        };
        let limit = limit.map(|l| l as usize).unwrap_or(self.page_size);

        let data: Vec<Task> = tasks
            .iter()
            .skip(offset)
            .take(limit)
            .map(|t| t.task.clone())
            .collect();

        let end = offset + data.len();
        let has_more = end < tasks.len();

        Ok(TaskPage {
            data,
            has_more,
            next_cursor: has_more.then(|| end.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn ids_are_sequential_and_distinct() {
        let mock = MockResearch::completing(json!({}));
        let a = mock
            .create_task(&CreateTaskRequest::new("one", "exa-research"))
            .await
            .unwrap();
        let b = mock
            .create_task(&CreateTaskRequest::new("two", "exa-research"))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn tasks_walk_the_status_script() {
        let mock = MockResearch::completing(json!({"answer": 42}));
        let created = mock
            .create_task(&CreateTaskRequest::new("walk", "exa-research"))
            .await
            .unwrap();

        assert_eq!(
            mock.get_task(&created.id).await.unwrap().status,
            TaskStatus::Pending
        );
        assert_eq!(
            mock.get_task(&created.id).await.unwrap().status,
            TaskStatus::Running
        );

        let done = mock.get_task(&created.id).await.unwrap();
        assert_eq!(done.status, TaskStatus::Completed);
        assert_eq!(done.data, Some(json!({"answer": 42})));

        // Last scripted status repeats.
        let again = mock.get_task(&created.id).await.unwrap();
        assert_eq!(again.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn unknown_task_is_an_error() {
        let mock = MockResearch::stuck();
        let result = mock.get_task("task_99").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("404"));
    }

    #[tokio::test]
    async fn listing_pages_through_all_tasks() {
        let mock = MockResearch::stuck().with_page_size(2);
        for i in 0..5 {
            mock.create_task(&CreateTaskRequest::new(format!("t{i}"), "exa-research"))
                .await
                .unwrap();
        }

        let first = mock.list_tasks(None, None).await.unwrap();
        assert_eq!(first.data.len(), 2);
        assert!(first.has_more);

        let all = crate::research::list_all(&mock).await.unwrap();
        assert_eq!(all.len(), 5);
    }
}
