//! Room collaboration: create a shareable room code or join one.
//!
//! The controller keeps the last created and last joined codes plus a
//! one-line notice for display. It never touches the board; joining a room
//! does not change which tasks are listed.

use std::sync::Arc;

use reqwest::Method;
use taskboard_proto::codec::SchemaError;
use taskboard_proto::room::{JoinRoomRequest, RoomCode, RoomCodeResponse};

use crate::api::{HttpApi, NoBody};
use crate::error::{ClientError, FailureKind};
use crate::session::SessionGate;

/// Text shown when the join input is blank.
pub const EMPTY_CODE_NOTICE: &str = "Please enter a room code";

/// Message line shown under the room controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomNotice {
    /// The last join succeeded.
    Joined(RoomCode),
    /// The last create or join failed.
    Warning(String),
}

impl std::fmt::Display for RoomNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Joined(code) => write!(f, "Joined room {code}"),
            Self::Warning(message) => f.write_str(message),
        }
    }
}

/// Creates and joins rooms on behalf of the signed-in user.
#[derive(Debug)]
pub struct RoomController {
    api: HttpApi,
    gate: Arc<SessionGate>,
    created: Option<RoomCode>,
    joined: Option<RoomCode>,
    notice: Option<RoomNotice>,
}

impl RoomController {
    /// Creates a controller with no room state.
    #[must_use]
    pub const fn new(api: HttpApi, gate: Arc<SessionGate>) -> Self {
        Self {
            api,
            gate,
            created: None,
            joined: None,
            notice: None,
        }
    }

    /// Asks the backend for a new room code.
    ///
    /// # Errors
    ///
    /// [`ClientError::Auth`] without a valid session, otherwise
    /// [`ClientError::Room`] with the backend message.
    pub async fn create_room(&mut self) -> Result<RoomCode, ClientError> {
        self.notice = None;
        let token = self.gate.require()?;
        let result = self
            .api
            .call_json::<RoomCodeResponse, NoBody>(Method::POST, &["create-room"], Some(&token), None)
            .await;
        match self.gate.check(result, FailureKind::CreateRoom) {
            Ok(RoomCodeResponse { code }) => {
                tracing::info!(room = %code, "created room");
                self.created = Some(code.clone());
                Ok(code)
            }
            Err(err) => Err(self.warn(err)),
        }
    }

    /// Joins the room named by `input`, normalized to trimmed uppercase.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] if `input` is blank (no request is sent),
    /// [`ClientError::Auth`] without a valid session, and
    /// [`ClientError::Conflict`] when the backend refuses.
    pub async fn join_room(&mut self, input: &str) -> Result<RoomCode, ClientError> {
        self.notice = None;
        let code = match RoomCode::parse(input) {
            Ok(code) => code,
            Err(SchemaError::EmptyRoomCode) => {
                return Err(self.warn(ClientError::Validation(EMPTY_CODE_NOTICE.to_string())));
            }
            Err(other) => return Err(self.warn(ClientError::Validation(other.to_string()))),
        };

        let token = self.gate.require()?;
        let body = JoinRoomRequest { code: code.clone() };
        let result = self
            .api
            .call(Method::POST, &["join-room"], Some(&token), Some(&body))
            .await;
        match self.gate.check(result, FailureKind::JoinRoom) {
            Ok(_) => {
                tracing::info!(room = %code, "joined room");
                self.joined = Some(code.clone());
                self.notice = Some(RoomNotice::Joined(code.clone()));
                Ok(code)
            }
            Err(err) => Err(self.warn(err)),
        }
    }

    /// Last code returned by [`create_room`](Self::create_room).
    #[must_use]
    pub const fn created(&self) -> Option<&RoomCode> {
        self.created.as_ref()
    }

    /// Last code successfully joined.
    #[must_use]
    pub const fn joined(&self) -> Option<&RoomCode> {
        self.joined.as_ref()
    }

    /// Message line for the last create or join attempt.
    #[must_use]
    pub const fn notice(&self) -> Option<&RoomNotice> {
        self.notice.as_ref()
    }

    fn warn(&mut self, err: ClientError) -> ClientError {
        if !err.is_auth() {
            self.notice = Some(RoomNotice::Warning(err.to_string()));
        }
        err
    }
}
