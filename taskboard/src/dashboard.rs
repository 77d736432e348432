//! Dashboard controller.
//!
//! Owns the [`Board`] and a [`TaskRepository`] and reconciles them the
//! simple way: every successful mutation is followed by a full refresh.
//! Drags are the exception; they are applied optimistically by the
//! [`DragEngine`] and not refetched.
//!
//! Failures other than [`ClientError::Auth`] set a dismissible [`Banner`].
//! Authorization failures leave the banner alone; the session gate has
//! already asked for a new login.

use taskboard_proto::task::{NewTask, TaskId, TaskPatch};

use crate::board::{Board, BoardError};
use crate::drag::{DragDrop, DragEngine, DragOutcome, DragPhase, ReconcilePolicy};
use crate::error::ClientError;
use crate::tasks::{TaskRepository, validation_error};

/// Banner text for a failed refresh.
pub const LOAD_FAILED: &str = "Failed to load tasks. Please refresh the page.";
/// Banner text for a failed create.
pub const ADD_FAILED: &str = "Failed to add task. Please try again.";
/// Banner text for a failed edit.
pub const EDIT_FAILED: &str = "Failed to edit task.";
/// Banner text for a failed delete.
pub const DELETE_FAILED: &str = "Failed to delete task.";
/// Banner text for a failed drag persist.
pub const MOVE_FAILED: &str = "Failed to update task status.";

/// A dismissible error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// Text shown to the user.
    pub text: &'static str,
    /// The failure behind it.
    pub cause: ClientError,
}

/// Result of an edit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The title was saved.
    Saved,
    /// The new title was blank or unchanged; nothing was sent.
    Unchanged,
}

/// Board view state plus the operations a user can perform on it.
#[derive(Debug)]
pub struct Dashboard<R> {
    repo: R,
    board: Board,
    drag: DragEngine,
    banner: Option<Banner>,
    loading: bool,
}

impl<R: TaskRepository> Dashboard<R> {
    /// Creates a dashboard with an empty board. Call
    /// [`refresh`](Self::refresh) to load it.
    #[must_use]
    pub const fn new(repo: R, policy: ReconcilePolicy) -> Self {
        Self {
            repo,
            board: Board::new(),
            drag: DragEngine::new(policy),
            banner: None,
            loading: true,
        }
    }

    /// Current board.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// The repository behind the board.
    #[must_use]
    pub const fn repository(&self) -> &R {
        &self.repo
    }

    /// Current error banner, if any.
    #[must_use]
    pub const fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Hides the error banner.
    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    /// `true` until the first refresh completes.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether a drag is still being persisted.
    #[must_use]
    pub const fn drag_phase(&self) -> DragPhase {
        self.drag.phase()
    }

    /// Replaces the board with the backend's task set.
    ///
    /// # Errors
    ///
    /// The repository's failure. The board keeps its previous contents.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let result = self.repo.list_tasks().await;
        self.loading = false;
        match result {
            Ok(tasks) => {
                self.board.reload(tasks);
                tracing::debug!(tasks = self.board.len(), "board refreshed");
                Ok(())
            }
            Err(err) => Err(self.fail(LOAD_FAILED, err)),
        }
    }

    /// Adds a task to the `todo` lane.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for a blank title, without a request.
    /// Otherwise the create or refresh failure.
    pub async fn add_task(&mut self, title: &str) -> Result<(), ClientError> {
        let task = NewTask::todo(title).map_err(validation_error)?;
        match self.repo.create_task(&task).await {
            Ok(created) => {
                tracing::info!(task_id = %created.id, "task added");
                self.refresh().await
            }
            Err(err) => Err(self.fail(ADD_FAILED, err)),
        }
    }

    /// Renames a task, keeping its current status.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] if the task is not on the board. Otherwise
    /// the update or refresh failure.
    pub async fn edit_task(&mut self, id: &TaskId, title: &str) -> Result<EditOutcome, ClientError> {
        let task = self
            .board
            .get(id)
            .ok_or_else(|| ClientError::Validation(format!("no task with id {id}")))?;
        if title.trim().is_empty() || title == task.title {
            return Ok(EditOutcome::Unchanged);
        }
        let patch = TaskPatch::retitle(title.to_string(), task.status);
        match self.repo.update_task(id, &patch).await {
            Ok(()) => {
                tracing::info!(task_id = %id, "task renamed");
                self.refresh().await.map(|()| EditOutcome::Saved)
            }
            Err(err) => Err(self.fail(EDIT_FAILED, err)),
        }
    }

    /// Deletes a task. A task the backend no longer knows counts as deleted.
    ///
    /// # Errors
    ///
    /// The delete or refresh failure.
    pub async fn delete_task(&mut self, id: &TaskId) -> Result<(), ClientError> {
        match self.repo.delete_task(id).await {
            Ok(()) => {}
            Err(ClientError::Delete { not_found: true, .. }) => {
                tracing::debug!(task_id = %id, "task already gone");
            }
            Err(err) => return Err(self.fail(DELETE_FAILED, err)),
        }
        tracing::info!(task_id = %id, "task deleted");
        self.refresh().await
    }

    /// Applies a finished drag gesture.
    ///
    /// # Errors
    ///
    /// [`BoardError`] if the gesture does not fit the board. A failed remote
    /// update is reported through the outcome and the banner.
    pub async fn on_drag_end(&mut self, drop: DragDrop) -> Result<DragOutcome, BoardError> {
        let outcome = self
            .drag
            .on_drag_end(&mut self.board, &self.repo, drop)
            .await?;
        if let DragOutcome::Diverged { error, .. } | DragOutcome::Reverted { error, .. } = &outcome {
            self.fail(MOVE_FAILED, error.clone());
        }
        Ok(outcome)
    }

    fn fail(&mut self, text: &'static str, cause: ClientError) -> ClientError {
        if !cause.is_auth() {
            self.banner = Some(Banner {
                text,
                cause: cause.clone(),
            });
        }
        cause
    }
}
