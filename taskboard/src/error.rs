//! Client-facing failure taxonomy.
//!
//! Every component catches its own network failures and classifies them
//! into a [`ClientError`]. Authorization failures are always
//! [`ClientError::Auth`]; the [`SessionGate`](crate::session::SessionGate)
//! has already cleared the session by the time a caller sees one.

use crate::api::ApiError;

/// Classified failure of a client operation.
///
/// Each non-auth variant carries a human-readable message suitable for a
/// dismissible banner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// No session, or the backend rejected the token. The session has been
    /// cleared and the user must sign in again.
    #[error("not signed in")]
    Auth,

    /// Input rejected locally; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// Listing tasks failed.
    #[error("failed to load tasks: {0}")]
    Fetch(String),

    /// Creating a task failed.
    #[error("failed to create task: {0}")]
    Create(String),

    /// Updating a task failed.
    #[error("failed to update task: {0}")]
    Update(String),

    /// Deleting a task failed.
    #[error("failed to delete task: {message}")]
    Delete {
        /// Backend or transport message.
        message: String,
        /// The backend reported the task as already gone.
        not_found: bool,
    },

    /// The backend refused to let us join a room.
    #[error("{0}")]
    Conflict(String),

    /// Creating a room failed.
    #[error("{0}")]
    Room(String),

    /// Signing in failed.
    #[error("{0}")]
    Login(String),

    /// Registering an account failed.
    #[error("{0}")]
    Register(String),
}

impl ClientError {
    /// Returns `true` for authorization failures.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth)
    }
}

/// Which operation a non-auth [`ApiError`] should be reported as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// `GET /tasks`
    Fetch,
    /// `POST /tasks`
    Create,
    /// `PUT /tasks/{id}`
    Update,
    /// `DELETE /tasks/{id}`
    Delete,
    /// `POST /create-room`
    CreateRoom,
    /// `POST /join-room`
    JoinRoom,
}

impl FailureKind {
    /// Builds the [`ClientError`] for a failure that was not an
    /// authorization failure.
    #[must_use]
    pub fn classify(self, err: &ApiError) -> ClientError {
        let message = err
            .message()
            .map_or_else(|| err.to_string(), ToString::to_string);
        match self {
            Self::Fetch => ClientError::Fetch(message),
            Self::Create => ClientError::Create(message),
            Self::Update => ClientError::Update(message),
            Self::Delete => ClientError::Delete {
                message,
                not_found: err.status() == Some(404),
            },
            Self::CreateRoom => ClientError::Room(match err {
                ApiError::Rejected { message, .. } => message
                    .clone()
                    .unwrap_or_else(|| "Failed to create room".to_string()),
                _ => "Error creating room".to_string(),
            }),
            Self::JoinRoom => ClientError::Conflict(match err {
                ApiError::Rejected { message, .. } => message
                    .clone()
                    .unwrap_or_else(|| "Failed to join room".to_string()),
                _ => "Error joining room".to_string(),
            }),
        }
    }
}
