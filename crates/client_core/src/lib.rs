use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Task, TaskId},
    error::ApiErrorBody,
    protocol::{DeleteAck, ServiceStatus, TaskFields},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod item;
pub mod state;

pub use config::{load_settings, ClientSettings, ReconcileMode};
pub use controller::TaskListController;
pub use error::TodoClientError;
pub use filter::visible_tasks;
pub use item::{InlineEdit, TaskIntent};
pub use state::{normalize_title, SyncOutcome, TaskList};

/// Remote `todos` resource.
#[async_trait]
pub trait TodoApi: Send + Sync {
    async fn list_tasks(&self) -> error::Result<Vec<Task>>;
    async fn create_task(&self, fields: &TaskFields) -> error::Result<Task>;
    /// The service's echo of the record, when it sent one that decodes.
    /// Local state never depends on it.
    async fn update_task(&self, id: TaskId, fields: &TaskFields) -> error::Result<Option<Task>>;
    async fn delete_task(&self, id: TaskId) -> error::Result<()>;
    async fn service_status(&self) -> error::Result<ServiceStatus>;
}

#[async_trait]
impl<T> TodoApi for Arc<T>
where
    T: TodoApi + ?Sized,
{
    async fn list_tasks(&self) -> error::Result<Vec<Task>> {
        (**self).list_tasks().await
    }

    async fn create_task(&self, fields: &TaskFields) -> error::Result<Task> {
        (**self).create_task(fields).await
    }

    async fn update_task(&self, id: TaskId, fields: &TaskFields) -> error::Result<Option<Task>> {
        (**self).update_task(id, fields).await
    }

    async fn delete_task(&self, id: TaskId) -> error::Result<()> {
        (**self).delete_task(id).await
    }

    async fn service_status(&self) -> error::Result<ServiceStatus> {
        (**self).service_status().await
    }
}

#[derive(Debug, Clone)]
pub struct HttpTodoClient {
    http: Client,
    base_url: Url,
}

impl HttpTodoClient {
    pub fn new(settings: &ClientSettings) -> error::Result<Self> {
        let base_url = config::normalize_api_base_url(&settings.api_base_url)?;
        let mut builder = Client::builder();
        if let Some(timeout) = settings.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(TodoClientError::ClientBuild)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> error::Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| TodoClientError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: err.to_string(),
            })
    }

    fn task_endpoint(&self, id: TaskId) -> error::Result<Url> {
        self.endpoint(&format!("todos/{}", id.0))
    }

    async fn send(&self, label: &str, request: RequestBuilder) -> error::Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|source| TodoClientError::Transport {
                endpoint: label.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(endpoint = label, status = status.as_u16(), "todo api ok");
            return Ok(response);
        }

        let detail = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<ApiErrorBody>(&body).ok())
            .map(|body| body.message());
        Err(TodoClientError::Status {
            endpoint: label.to_string(),
            status: status.as_u16(),
            detail,
        })
    }

    async fn json<T: DeserializeOwned>(&self, label: &str, response: Response) -> error::Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|source| TodoClientError::Decode {
                endpoint: label.to_string(),
                source,
            })
    }
}

#[async_trait]
impl TodoApi for HttpTodoClient {
    async fn list_tasks(&self) -> error::Result<Vec<Task>> {
        let label = "GET /todos";
        let url = self.endpoint("todos")?;
        let response = self.send(label, self.http.get(url)).await?;
        let tasks: Vec<Task> = self.json(label, response).await?;
        debug!(count = tasks.len(), "fetched todos");
        Ok(tasks)
    }

    async fn create_task(&self, fields: &TaskFields) -> error::Result<Task> {
        let label = "POST /todos";
        let url = self.endpoint("todos")?;
        let response = self
            .send(label, self.http.post(url).json(fields))
            .await?;
        let task: Task = self.json(label, response).await?;
        info!(task_id = task.id.0, "created todo");
        Ok(task)
    }

    async fn update_task(&self, id: TaskId, fields: &TaskFields) -> error::Result<Option<Task>> {
        let label = format!("PUT /todos/{id}");
        let url = self.task_endpoint(id)?;
        let response = self
            .send(&label, self.http.put(url).json(fields))
            .await?;
        info!(task_id = id.0, completed = fields.completed, "updated todo");

        // A 2xx means the change is committed, whatever the body looks like.
        let body = response.text().await.unwrap_or_default();
        if body.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Task>(&body) {
            Ok(task) => Ok(Some(task)),
            Err(err) => {
                warn!(task_id = id.0, "ignoring undecodable update response: {err}");
                Ok(None)
            }
        }
    }

    async fn delete_task(&self, id: TaskId) -> error::Result<()> {
        let label = format!("DELETE /todos/{id}");
        let url = self.task_endpoint(id)?;
        let response = self.send(&label, self.http.delete(url)).await?;

        // The body is optional; when present it is a confirmation banner.
        let ack = response
            .text()
            .await
            .ok()
            .and_then(|body| serde_json::from_str::<DeleteAck>(&body).ok())
            .unwrap_or_default();
        match ack.message {
            Some(message) => info!(task_id = id.0, "deleted todo: {message}"),
            None => info!(task_id = id.0, "deleted todo"),
        }
        Ok(())
    }

    async fn service_status(&self) -> error::Result<ServiceStatus> {
        let label = "GET /";
        let url = self.base_url.clone();
        let response = self.send(label, self.http.get(url)).await?;
        self.json(label, response).await
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
