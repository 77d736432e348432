//! JSON encode/decode for the Taskboard wire schemas.
//!
//! Every payload that crosses the API boundary is parsed into a typed
//! schema and then checked with [`Validate`] before any field is trusted.

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error type for schema decode and validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The payload was not valid JSON for the expected schema.
    #[error("malformed payload: {0}")]
    Malformed(String),
    /// Task title is empty or whitespace only.
    #[error("task title cannot be empty")]
    EmptyTitle,
    /// Task identifier is empty.
    #[error("task id cannot be empty")]
    EmptyId,
    /// Room code is empty after trimming.
    #[error("room code cannot be empty")]
    EmptyRoomCode,
    /// Session token is empty.
    #[error("session token cannot be empty")]
    EmptyToken,
    /// A task status string is not one of the three lanes.
    #[error("unknown task status: {0}")]
    UnknownStatus(String),
    /// A patch carries no fields to update.
    #[error("update carries no fields")]
    EmptyPatch,
}

/// Structural checks applied after a payload has been deserialized.
pub trait Validate {
    /// Checks the invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found.
    fn validate(&self) -> Result<(), SchemaError>;
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), SchemaError> {
        self.iter().try_for_each(Validate::validate)
    }
}

/// Encodes a schema value as a JSON byte vector.
///
/// # Errors
///
/// Returns [`SchemaError::Malformed`] if the value cannot be serialized.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, SchemaError> {
    serde_json::to_vec(value).map_err(|e| SchemaError::Malformed(e.to_string()))
}

/// Decodes a JSON payload without further validation.
///
/// # Errors
///
/// Returns [`SchemaError::Malformed`] if the bytes do not match `T`.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SchemaError> {
    serde_json::from_slice(bytes).map_err(|e| SchemaError::Malformed(e.to_string()))
}

/// Decodes a JSON payload and runs [`Validate::validate`] on the result.
///
/// # Errors
///
/// Returns [`SchemaError::Malformed`] for undecodable bytes, or the
/// validation error of the decoded value.
pub fn decode_validated<T: DeserializeOwned + Validate>(bytes: &[u8]) -> Result<T, SchemaError> {
    let value: T = decode(bytes)?;
    value.validate()?;
    Ok(value)
}
