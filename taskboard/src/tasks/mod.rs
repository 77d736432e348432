//! Task repository: typed access to the backend's task collection.
//!
//! [`TaskRepository`] is the seam between the board logic and the backend.
//! Concrete implementations:
//! - [`http::HttpTaskRepository`]: the REST API over HTTP
//! - [`memory::MemoryTaskRepository`]: in-process backend for tests and embedding
//!
//! Every implementation routes calls through the
//! [`SessionGate`](crate::session::SessionGate) and holds no board cache;
//! callers refresh or reconcile their own state afterwards.

pub mod http;
pub mod memory;

pub use http::HttpTaskRepository;
pub use memory::MemoryTaskRepository;

use taskboard_proto::codec::{SchemaError, Validate};
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

use crate::error::ClientError;

/// Async access to the caller's tasks.
///
/// Validation failures ([`ClientError::Validation`]) are detected before the
/// session is consulted and before any request is made.
pub trait TaskRepository: Send + Sync {
    /// Fetches the caller's full task set.
    fn list_tasks(&self) -> impl std::future::Future<Output = Result<Vec<Task>, ClientError>> + Send;

    /// Creates a task and returns it with its server-assigned id.
    fn create_task(
        &self,
        task: &NewTask,
    ) -> impl std::future::Future<Output = Result<Task, ClientError>> + Send;

    /// Applies a partial update. An empty patch is rejected, not ignored.
    fn update_task(
        &self,
        id: &TaskId,
        patch: &TaskPatch,
    ) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;

    /// Deletes a task. A task that is already gone is reported as
    /// [`ClientError::Delete`] with `not_found` set.
    fn delete_task(&self, id: &TaskId) -> impl std::future::Future<Output = Result<(), ClientError>> + Send;
}

/// Runs schema validation on an outgoing body.
pub(crate) fn validate_outgoing<T: Validate>(body: &T) -> Result<(), ClientError> {
    body.validate().map_err(validation_error)
}

/// Maps a local schema violation to [`ClientError::Validation`].
pub(crate) fn validation_error(err: SchemaError) -> ClientError {
    ClientError::Validation(err.to_string())
}
