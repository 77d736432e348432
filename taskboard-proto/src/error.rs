//! Error bodies returned by the backend on non-2xx responses.

use serde::Deserialize;

/// Shape of a backend error body. Both fields are optional; backends
/// disagree on which one they fill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    /// Human-readable message, e.g. `"Invalid room code"`.
    pub message: Option<String>,
    /// Alternate key used by some frameworks.
    pub error: Option<String>,
}

impl ErrorBody {
    /// Pulls a human-readable message out of a raw response body.
    ///
    /// Tries `message`, then `error`. Returns `None` for non-JSON bodies and
    /// for JSON without either key.
    #[must_use]
    pub fn extract(body: &str) -> Option<String> {
        let parsed: Self = serde_json::from_str(body).ok()?;
        parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty())
    }
}
