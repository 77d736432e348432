//! In-process task backend.
//!
//! [`MemoryTaskRepository`] behaves like the REST backend (server-assigned
//! ids, 404 for unknown ids, last write wins) without a network. It still
//! goes through the [`SessionGate`], and failures can be injected per
//! operation so the reconciliation paths can be exercised deterministically.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};
use uuid::Uuid;

use super::{TaskRepository, validate_outgoing};
use crate::api::ApiError;
use crate::error::{ClientError, FailureKind};
use crate::session::SessionGate;

/// Repository operations, used for failure injection and call accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `list_tasks`
    List,
    /// `create_task`
    Create,
    /// `update_task`
    Update,
    /// `delete_task`
    Delete,
}

impl Operation {
    const fn failure_kind(self) -> FailureKind {
        match self {
            Self::List => FailureKind::Fetch,
            Self::Create => FailureKind::Create,
            Self::Update => FailureKind::Update,
            Self::Delete => FailureKind::Delete,
        }
    }
}

#[derive(Debug, Default)]
struct Backend {
    tasks: Vec<Task>,
    failures: VecDeque<(Operation, u16)>,
    calls: Vec<Operation>,
}

impl Backend {
    /// Records the call and pops the first injected failure for `op`.
    fn enter(&mut self, op: Operation) -> Result<(), ApiError> {
        self.calls.push(op);
        let Some(pos) = self.failures.iter().position(|(o, _)| *o == op) else {
            return Ok(());
        };
        let (_, status) = self.failures.remove(pos).unwrap_or((op, 500));
        if status == 401 {
            return Err(ApiError::Unauthorized { message: None });
        }
        Err(ApiError::Rejected {
            status,
            message: Some(format!("injected {op:?} failure")),
        })
    }

    fn find_mut(&mut self, id: &TaskId) -> Result<&mut Task, ApiError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == *id)
            .ok_or_else(not_found)
    }
}

fn not_found() -> ApiError {
    ApiError::Rejected {
        status: 404,
        message: Some("Task not found".to_string()),
    }
}

/// Gated, in-memory stand-in for the task backend.
pub struct MemoryTaskRepository {
    gate: Arc<SessionGate>,
    backend: Mutex<Backend>,
}

impl MemoryTaskRepository {
    /// Creates an empty backend.
    #[must_use]
    pub fn new(gate: Arc<SessionGate>) -> Self {
        Self::with_tasks(gate, Vec::new())
    }

    /// Creates a backend pre-populated with `tasks`.
    #[must_use]
    pub fn with_tasks(gate: Arc<SessionGate>, tasks: Vec<Task>) -> Self {
        Self {
            gate,
            backend: Mutex::new(Backend {
                tasks,
                ..Backend::default()
            }),
        }
    }

    /// Makes the next `op` call fail with HTTP `status` (401 for an
    /// authorization failure).
    pub fn fail_next(&self, op: Operation, status: u16) {
        self.backend.lock().failures.push_back((op, status));
    }

    /// Number of `op` calls that got past validation and the session check.
    #[must_use]
    pub fn calls(&self, op: Operation) -> usize {
        self.backend.lock().calls.iter().filter(|c| **c == op).count()
    }

    /// Server-side view of the tasks.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Task> {
        self.backend.lock().tasks.clone()
    }

    fn run<T>(
        &self,
        op: Operation,
        f: impl FnOnce(&mut Backend) -> Result<T, ApiError>,
    ) -> Result<T, ClientError> {
        let mut backend = self.backend.lock();
        let result = backend.enter(op).and_then(|()| f(&mut *backend));
        drop(backend);
        self.gate.check(result, op.failure_kind())
    }
}

impl TaskRepository for MemoryTaskRepository {
    async fn list_tasks(&self) -> Result<Vec<Task>, ClientError> {
        self.gate.require()?;
        self.run(Operation::List, |b| Ok(b.tasks.clone()))
    }

    async fn create_task(&self, task: &NewTask) -> Result<Task, ClientError> {
        validate_outgoing(task)?;
        self.gate.require()?;
        self.run(Operation::Create, |b| {
            let created = Task {
                id: TaskId::new(Uuid::now_v7().to_string()),
                title: task.title.clone(),
                description: Some(task.description.clone()).filter(|d| !d.is_empty()),
                status: task.status,
            };
            b.tasks.push(created.clone());
            Ok(created)
        })
    }

    async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), ClientError> {
        validate_outgoing(patch)?;
        self.gate.require()?;
        self.run(Operation::Update, |b| {
            let task = b.find_mut(id)?;
            if let Some(title) = &patch.title {
                task.title.clone_from(title);
            }
            if let Some(status) = patch.status {
                task.status = status;
            }
            Ok(())
        })
    }

    async fn delete_task(&self, id: &TaskId) -> Result<(), ClientError> {
        self.gate.require()?;
        self.run(Operation::Delete, |b| {
            let before = b.tasks.len();
            b.tasks.retain(|t| t.id != *id);
            if b.tasks.len() == before {
                return Err(not_found());
            }
            Ok(())
        })
    }
}
