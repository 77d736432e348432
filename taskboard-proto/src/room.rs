//! Room schemas for `POST /create-room` and `POST /join-room`.
//!
//! Room codes are short alphanumeric strings minted by the backend. The
//! client normalizes anything it sends or receives to trimmed uppercase.

use serde::{Deserialize, Deserializer, Serialize};

use crate::codec::{SchemaError, Validate};

/// A case-normalized room code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct RoomCode(String);

impl RoomCode {
    /// Trims and uppercases user or server input.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyRoomCode`] if nothing is left after trimming.
    pub fn parse(input: &str) -> Result<Self, SchemaError> {
        let code = input.trim().to_uppercase();
        if code.is_empty() {
            return Err(SchemaError::EmptyRoomCode);
        }
        Ok(Self(code))
    }

    /// Returns the normalized code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RoomCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RoomCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Body of `POST /join-room`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    /// Normalized code to join.
    pub code: RoomCode,
}

/// Success body of both room endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomCodeResponse {
    /// The created or joined room.
    pub code: RoomCode,
}

impl Validate for RoomCodeResponse {
    fn validate(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}
