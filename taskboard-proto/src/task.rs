//! Task schemas for the Taskboard REST API.
//!
//! A [`Task`] is owned by the backend and cached client-side in the lane
//! matching its [`TaskStatus`]. Identifiers are opaque and server-assigned;
//! the backend may send them as JSON strings or integers.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::codec::{SchemaError, Validate};

/// Opaque, server-assigned task identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Wraps an identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        let id = match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        };
        Ok(Self(id))
    }
}

/// Lane a task belongs to. The three values are fixed and statically known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started.
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// All lanes in display order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Wire identifier of the lane.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }

    /// Human-readable column heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }

    /// Position of the lane in [`TaskStatus::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::InProgress => 1,
            Self::Done => 2,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(SchemaError::UnknownStatus(other.to_string())),
        }
    }
}

/// A task as returned by `GET /tasks` and `POST /tasks`.
///
/// Unknown extra fields sent by the backend are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned identifier.
    pub id: TaskId,
    /// Non-empty title.
    pub title: String,
    /// Optional free-text description.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub description: Option<String>,
    /// Lane the task is shown in.
    pub status: TaskStatus,
}

impl Validate for Task {
    fn validate(&self) -> Result<(), SchemaError> {
        if self.id.as_str().is_empty() {
            return Err(SchemaError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(SchemaError::EmptyTitle);
        }
        Ok(())
    }
}

/// Body of `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Title as typed by the user.
    pub title: String,
    /// Description; empty string when none was given.
    pub description: String,
    /// Initial lane.
    pub status: TaskStatus,
}

impl NewTask {
    /// Builds a creation request for the `todo` lane with no description.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyTitle`] if the title is empty or whitespace.
    pub fn todo(title: impl Into<String>) -> Result<Self, SchemaError> {
        let task = Self {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Todo,
        };
        task.validate()?;
        Ok(task)
    }
}

impl Validate for NewTask {
    fn validate(&self) -> Result<(), SchemaError> {
        if self.title.trim().is_empty() {
            return Err(SchemaError::EmptyTitle);
        }
        Ok(())
    }
}

/// Body of `PUT /tasks/{id}`; absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    /// New title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New lane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    /// A patch that only changes the status.
    #[must_use]
    pub const fn status(status: TaskStatus) -> Self {
        Self {
            title: None,
            status: Some(status),
        }
    }

    /// A patch that changes the title and restates the status.
    #[must_use]
    pub const fn retitle(title: String, status: TaskStatus) -> Self {
        Self {
            title: Some(title),
            status: Some(status),
        }
    }

    /// Returns `true` when the patch would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none()
    }
}

impl Validate for TaskPatch {
    fn validate(&self) -> Result<(), SchemaError> {
        if self.is_empty() {
            return Err(SchemaError::EmptyPatch);
        }
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(SchemaError::EmptyTitle);
        }
        Ok(())
    }
}

fn empty_as_none<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
