//! Board state model: three fixed lanes of ordered tasks.
//!
//! # Invariants
//!
//! - Every task sits in exactly one [`Lane`], and that lane equals
//!   `task.status`.
//! - No task id appears twice on the board.
//! - Moves never change the total task count.
//!
//! All operations are synchronous and run to completion; the board is only
//! ever mutated through `&mut self`. Out-of-range indices are contract
//! violations and fail with [`BoardError::IndexOutOfBounds`] before anything
//! is changed. They are never clamped.

use std::collections::HashSet;

use taskboard_proto::task::{Task, TaskId, TaskStatus};

/// Errors from board transforms and invariant checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// An index fell outside the lane.
    #[error("index {index} out of bounds for lane {lane} of length {len}")]
    IndexOutOfBounds {
        /// Lane that was addressed.
        lane: TaskStatus,
        /// Offending index.
        index: usize,
        /// Lane length at the time of the call.
        len: usize,
    },

    /// A task with this id is already on the board.
    #[error("task {0} is already on the board")]
    DuplicateTask(TaskId),

    /// A task sits in a lane that differs from its status.
    #[error("task {task} has status {status} but sits in lane {lane}")]
    LaneMismatch {
        /// The misplaced task.
        task: TaskId,
        /// Its status field.
        status: TaskStatus,
        /// The lane holding it.
        lane: TaskStatus,
    },
}

/// One column of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    id: TaskStatus,
    items: Vec<Task>,
}

impl Lane {
    const fn empty(id: TaskStatus) -> Self {
        Self {
            id,
            items: Vec::new(),
        }
    }

    /// Lane identity; equal to the status of every task in it.
    #[must_use]
    pub const fn id(&self) -> TaskStatus {
        self.id
    }

    /// Column heading.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        self.id.title()
    }

    /// Tasks in display order.
    #[must_use]
    pub fn items(&self) -> &[Task] {
        &self.items
    }

    /// Number of tasks in the lane.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the lane holds no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn out_of_bounds(&self, index: usize) -> BoardError {
        BoardError::IndexOutOfBounds {
            lane: self.id,
            index,
            len: self.items.len(),
        }
    }
}

/// The three-lane aggregate the view renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    lanes: [Lane; 3],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Creates a board with three empty lanes.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lanes: [
                Lane::empty(TaskStatus::Todo),
                Lane::empty(TaskStatus::InProgress),
                Lane::empty(TaskStatus::Done),
            ],
        }
    }

    /// Builds a board from a fetched task set, partitioned by status.
    ///
    /// Server order is kept within each lane. A repeated id keeps its first
    /// occurrence.
    #[must_use]
    pub fn load(tasks: Vec<Task>) -> Self {
        let mut board = Self::new();
        let mut seen = HashSet::new();
        for task in tasks {
            if !seen.insert(task.id.clone()) {
                tracing::warn!(task_id = %task.id, "duplicate task id in fetched set, dropping");
                continue;
            }
            board.lane_mut(task.status).items.push(task);
        }
        board
    }

    /// Replaces all lane contents with a freshly fetched task set.
    pub fn reload(&mut self, tasks: Vec<Task>) {
        *self = Self::load(tasks);
    }

    /// The lane with the given identity.
    #[must_use]
    pub const fn lane(&self, id: TaskStatus) -> &Lane {
        &self.lanes[id.index()]
    }

    const fn lane_mut(&mut self, id: TaskStatus) -> &mut Lane {
        &mut self.lanes[id.index()]
    }

    /// All lanes in display order.
    #[must_use]
    pub const fn lanes(&self) -> &[Lane; 3] {
        &self.lanes
    }

    /// Total number of tasks across lanes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.iter().map(Lane::len).sum()
    }

    /// Returns `true` if no lane holds a task.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(Lane::is_empty)
    }

    /// Lane and index of a task.
    #[must_use]
    pub fn position(&self, id: &TaskId) -> Option<(TaskStatus, usize)> {
        self.lanes.iter().find_map(|lane| {
            lane.items
                .iter()
                .position(|t| t.id == *id)
                .map(|index| (lane.id, index))
        })
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.lanes
            .iter()
            .flat_map(|lane| lane.items.iter())
            .find(|t| t.id == *id)
    }

    /// Inserts `task` at `index` in `lane`, setting its status to the lane.
    ///
    /// # Errors
    ///
    /// [`BoardError::IndexOutOfBounds`] if `index > lane.len()`, or
    /// [`BoardError::DuplicateTask`] if the id is already on the board.
    pub fn insert(&mut self, lane: TaskStatus, index: usize, mut task: Task) -> Result<(), BoardError> {
        if index > self.lane(lane).len() {
            return Err(self.lane(lane).out_of_bounds(index));
        }
        if self.position(&task.id).is_some() {
            return Err(BoardError::DuplicateTask(task.id));
        }
        task.status = lane;
        self.lane_mut(lane).items.insert(index, task);
        Ok(())
    }

    /// Removes and returns the task at `index` in `lane`.
    ///
    /// # Errors
    ///
    /// [`BoardError::IndexOutOfBounds`] if `index >= lane.len()`.
    pub fn remove(&mut self, lane: TaskStatus, index: usize) -> Result<Task, BoardError> {
        if index >= self.lane(lane).len() {
            return Err(self.lane(lane).out_of_bounds(index));
        }
        Ok(self.lane_mut(lane).items.remove(index))
    }

    /// Moves the task at `from` to `to` inside one lane. Display order only.
    ///
    /// # Errors
    ///
    /// [`BoardError::IndexOutOfBounds`] if either index is not a valid
    /// position in the lane.
    pub fn move_within_lane(&mut self, lane: TaskStatus, from: usize, to: usize) -> Result<(), BoardError> {
        let current = self.lane(lane);
        if from >= current.len() {
            return Err(current.out_of_bounds(from));
        }
        if to >= current.len() {
            return Err(current.out_of_bounds(to));
        }
        let items = &mut self.lane_mut(lane).items;
        let task = items.remove(from);
        items.insert(to, task);
        Ok(())
    }

    /// Moves the task at `from` in `source` to `to` in `dest`, updating its
    /// status to `dest`. Returns the moved task so the caller can persist
    /// the status change.
    ///
    /// When `source == dest` this is a [`move_within_lane`](Self::move_within_lane).
    ///
    /// # Errors
    ///
    /// [`BoardError::IndexOutOfBounds`] if `from` is not a position in
    /// `source` or `to > dest.len()`.
    pub fn move_across_lanes(
        &mut self,
        source: TaskStatus,
        dest: TaskStatus,
        from: usize,
        to: usize,
    ) -> Result<Task, BoardError> {
        if source == dest {
            self.move_within_lane(source, from, to)?;
            return Ok(self.lane(dest).items[to].clone());
        }
        if from >= self.lane(source).len() {
            return Err(self.lane(source).out_of_bounds(from));
        }
        if to > self.lane(dest).len() {
            return Err(self.lane(dest).out_of_bounds(to));
        }
        let mut task = self.lane_mut(source).items.remove(from);
        task.status = dest;
        self.lane_mut(dest).items.insert(to, task.clone());
        Ok(task)
    }

    /// Verifies the lane/status and uniqueness invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn check_invariants(&self) -> Result<(), BoardError> {
        let mut seen = HashSet::new();
        for lane in &self.lanes {
            for task in &lane.items {
                if task.status != lane.id {
                    return Err(BoardError::LaneMismatch {
                        task: task.id.clone(),
                        status: task.status,
                        lane: lane.id,
                    });
                }
                if !seen.insert(&task.id) {
                    return Err(BoardError::DuplicateTask(task.id.clone()));
                }
            }
        }
        Ok(())
    }
}
