//! REST implementation of [`TaskRepository`].

use std::sync::Arc;

use reqwest::Method;
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

use super::{TaskRepository, validate_outgoing};
use crate::api::{HttpApi, NoBody};
use crate::error::{ClientError, FailureKind};
use crate::session::SessionGate;

/// Task repository backed by `GET/POST /tasks` and `PUT/DELETE /tasks/{id}`.
#[derive(Debug, Clone)]
pub struct HttpTaskRepository {
    api: HttpApi,
    gate: Arc<SessionGate>,
}

impl HttpTaskRepository {
    /// Creates a repository that authenticates through `gate`.
    #[must_use]
    pub const fn new(api: HttpApi, gate: Arc<SessionGate>) -> Self {
        Self { api, gate }
    }
}

impl TaskRepository for HttpTaskRepository {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        let token = self.gate.require()?;
        let result = self
            .api
            .call_json::<Vec<Task>, NoBody>(Method::GET, &["tasks"], Some(&token), None)
            .await;
        let tasks = self.gate.check(result, FailureKind::Fetch)?;
        tracing::debug!(count = tasks.len(), "fetched tasks");
        Ok(tasks)
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        validate_outgoing(task)?;
        let token = self.gate.require()?;
        let result = self
            .api
            .call_json::<Task, NewTask>(Method::POST, &["tasks"], Some(&token), Some(task))
            .await;
        let created = self.gate.check(result, FailureKind::Create)?;
        tracing::debug!(task_id = %created.id, "created task");
        Ok(created)
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), ClientError> {
        validate_outgoing(patch)?;
        let token = self.gate.require()?;
        let result = self
            .api
            .call(Method::PUT, &["tasks", id.as_str()], Some(&token), Some(patch))
            .await;
        self.gate.check(result, FailureKind::Update)?;
        tracing::debug!(task_id = %id, "updated task");
        Ok(())
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ClientError> {
        let token = self.gate.require()?;
        let result = self
            .api
            .call::<NoBody>(Method::DELETE, &["tasks", id.as_str()], Some(&token), None)
            .await;
        self.gate.check(result, FailureKind::Delete)?;
        tracing::debug!(task_id = %id, "deleted task");
        Ok(())
    }
}
