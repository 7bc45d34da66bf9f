use anyhow::{Result, bail};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::consts::API_BASE_URL;

use super::{CreateTaskRequest, CreatedTask, Research, Task, TaskPage};

const TASKS_PATH: &str = "/research/v1";

/// The hosted research service, spoken to over HTTPS.
pub struct ExaResearch {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ExaResearch {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, API_BASE_URL.to_string())
    }

    /// Point the client at a different host (e.g. a local stub).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn tasks_url(&self) -> String {
        format!("{}{}", self.base_url, TASKS_PATH)
    }

    fn task_url(&self, id: &str) -> String {
        format!("{}{}/{}", self.base_url, TASKS_PATH, id)
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T> {
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("research API error ({}): {}", status, text);
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Research for ExaResearch {
    async fn create_task(&self, request: &CreateTaskRequest) -> Result<CreatedTask> {
        tracing::debug!(model = %request.model, "creating research task");

        let resp = self
            .client
            .post(self.tasks_url())
            .header("x-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let created: CreatedTask = Self::read_json(resp).await?;
        tracing::debug!(id = %created.id, "task created");
        Ok(created)
    }

    async fn get_task(&self, id: &str) -> Result<Task> {
        let resp = self
            .client
            .get(self.task_url(id))
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let task: Task = Self::read_json(resp).await?;
        tracing::debug!(id = %task.id, status = %task.status, "fetched task");
        Ok(task)
    }

    async fn list_tasks(&self, cursor: Option<&str>, limit: Option<u32>) -> Result<TaskPage> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let resp = self
            .client
            .get(self.tasks_url())
            .header("x-api-key", &self.api_key)
            .query(&query)
            .send()
            .await?;

        Self::read_json(resp).await
    }
}
