//! Drag-reconciliation engine.
//!
//! Turns a finished drag gesture into a board transform and, for
//! cross-lane moves, a remote status update.
//!
//! # Lifecycle
//!
//! 1. [`DragEngine::begin`] applies the gesture to the [`Board`]
//!    synchronously. Same-lane drops and drops outside any lane finish here.
//! 2. A cross-lane drop yields a [`PendingMove`]; the board already shows
//!    the move (optimistic) and the engine is [`DragPhase::Reconciling`].
//! 3. [`PendingMove::persist`] sends `update_task(id, {status})`. The board
//!    is not borrowed while the request is in flight, so further drags can
//!    be applied in the meantime.
//! 4. [`DragEngine::settle`] folds the result back in according to the
//!    [`ReconcilePolicy`] and returns the engine to [`DragPhase::Idle`] once
//!    nothing is in flight.
//!
//! [`DragEngine::on_drag_end`] runs all four steps for the common case.

use taskboard_proto::task::{Task, TaskPatch, TaskStatus};

use crate::board::{Board, BoardError};
use crate::error::ClientError;
use crate::tasks::TaskRepository;

/// A lane and a position within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragLocation {
    /// Lane identity.
    pub lane: TaskStatus,
    /// Index within the lane.
    pub index: usize,
}

impl DragLocation {
    /// Creates a location.
    #[must_use]
    pub const fn new(lane: TaskStatus, index: usize) -> Self {
        Self { lane, index }
    }
}

/// The result of a drag gesture as reported by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragDrop {
    /// Where the task was picked up.
    pub source: DragLocation,
    /// Where it was dropped; `None` when dropped outside every lane.
    pub destination: Option<DragLocation>,
}

/// What to do with the optimistic move when the remote update fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Leave the board as moved. Local and remote state diverge until the
    /// next full refresh.
    #[default]
    KeepOptimistic,
    /// Move the task back to where it was picked up.
    RevertOnFailure,
}

/// Engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No remote update outstanding.
    Idle,
    /// At least one cross-lane move awaits its remote update.
    Reconciling,
}

/// How a drag gesture ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// Dropped outside any lane; nothing changed.
    Ignored,
    /// Reordered within a lane; no remote call.
    Reordered {
        /// The lane that was reordered.
        lane: TaskStatus,
    },
    /// Moved across lanes and persisted.
    Moved {
        /// The task with its new status.
        task: Task,
    },
    /// Moved locally but the remote update failed; the board no longer
    /// matches the backend for this task. Also reported when a revert was
    /// requested but the task had moved again in the meantime.
    Diverged {
        /// The task as shown on the board.
        task: Task,
        /// Why the update failed.
        error: ClientError,
    },
    /// The remote update failed and the local move was undone.
    Reverted {
        /// The task as it was before the drag.
        task: Task,
        /// Why the update failed.
        error: ClientError,
    },
}

/// A cross-lane move that has been applied locally but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending move must be persisted and settled"]
pub struct PendingMove {
    task: Task,
    from: DragLocation,
}

impl PendingMove {
    /// The moved task, already carrying its new status.
    pub const fn task(&self) -> &Task {
        &self.task
    }

    /// Where the task was picked up.
    pub const fn origin(&self) -> DragLocation {
        self.from
    }

    /// Sends the status change to the backend.
    ///
    /// # Errors
    ///
    /// Returns the repository's classified failure.
    pub async fn persist<R: TaskRepository>(&self, repo: &R) -> Result<(), ClientError> {
        repo.update_task(&self.task.id, &TaskPatch::status(self.task.status))
            .await
    }
}

/// Result of applying a gesture locally.
#[derive(Debug)]
pub enum DragStep {
    /// Nothing to persist.
    Done(DragOutcome),
    /// The move must be persisted and settled.
    Persist(PendingMove),
}

/// Applies drag gestures to a [`Board`] and reconciles them with the backend.
#[derive(Debug, Default)]
pub struct DragEngine {
    policy: ReconcilePolicy,
    in_flight: usize,
}

impl DragEngine {
    /// Creates an idle engine with the given failure policy.
    #[must_use]
    pub const fn new(policy: ReconcilePolicy) -> Self {
        Self {
            policy,
            in_flight: 0,
        }
    }

    /// Current failure policy.
    #[must_use]
    pub const fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        if self.in_flight == 0 {
            DragPhase::Idle
        } else {
            DragPhase::Reconciling
        }
    }

    /// Applies a gesture to the board.
    ///
    /// # Errors
    ///
    /// [`BoardError::IndexOutOfBounds`] if the gesture's indices do not fit
    /// the board. The board is unchanged in that case.
    pub fn begin(&mut self, board: &mut Board, drop: DragDrop) -> Result<DragStep, BoardError> {
        let Some(dest) = drop.destination else {
            return Ok(DragStep::Done(DragOutcome::Ignored));
        };
        let source = drop.source;

        if source.lane == dest.lane {
            board.move_within_lane(source.lane, source.index, dest.index)?;
            tracing::debug!(lane = %source.lane, from = source.index, to = dest.index, "reordered lane");
            return Ok(DragStep::Done(DragOutcome::Reordered { lane: source.lane }));
        }

        let task = board.move_across_lanes(source.lane, dest.lane, source.index, dest.index)?;
        self.in_flight += 1;
        tracing::debug!(
            task_id = %task.id,
            from = %source.lane,
            to = %dest.lane,
            "moved task across lanes, persisting"
        );
        Ok(DragStep::Persist(PendingMove { task, from: source }))
    }

    /// Folds the remote result of a pending move back into the board.
    pub fn settle(
        &mut self,
        board: &mut Board,
        pending: PendingMove,
        result: Result<(), ClientError>,
    ) -> DragOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);
        let PendingMove { task, from } = pending;

        let Err(error) = result else {
            return DragOutcome::Moved { task };
        };

        match self.policy {
            ReconcilePolicy::KeepOptimistic => {
                tracing::warn!(task_id = %task.id, error = %error, "status update failed, board diverges from backend");
                DragOutcome::Diverged { task, error }
            }
            ReconcilePolicy::RevertOnFailure => {
                if let Some(restored) = revert(board, &task, from) {
                    tracing::warn!(task_id = %restored.id, error = %error, "status update failed, move reverted");
                    return DragOutcome::Reverted {
                        task: restored,
                        error,
                    };
                }
                // A later move or refresh already relocated the task.
                let current = board.get(&task.id).cloned().unwrap_or(task);
                tracing::warn!(task_id = %current.id, error = %error, "status update failed, task moved since, not reverted");
                DragOutcome::Diverged {
                    task: current,
                    error,
                }
            }
        }
    }

    /// Applies, persists, and settles one gesture.
    ///
    /// # Errors
    ///
    /// [`BoardError::IndexOutOfBounds`] if the gesture does not fit the board.
    /// Remote failures are reported through the returned [`DragOutcome`].
    pub async fn on_drag_end<R: TaskRepository>(
        &mut self,
        board: &mut Board,
        repo: &R,
        drop: DragDrop,
    ) -> Result<DragOutcome, BoardError> {
        match self.begin(board, drop)? {
            DragStep::Done(outcome) => Ok(outcome),
            DragStep::Persist(pending) => {
                let result = pending.persist(repo).await;
                Ok(self.settle(board, pending, result))
            }
        }
    }
}

/// Moves a task back to its origin if it is still where the failed move put
/// it. Later moves or a refresh win over the revert.
fn revert(board: &mut Board, task: &Task, from: DragLocation) -> Option<Task> {
    let (lane, index) = board.position(&task.id)?;
    if lane != task.status {
        return None;
    }
    let moved = board.remove(lane, index).ok()?;
    let at = from.index.min(board.lane(from.lane).len());
    board.insert(from.lane, at, moved).ok()?;
    board.get(&task.id).cloned()
}
