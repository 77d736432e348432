//! Credential schemas for `POST /login`, `POST /register`, and the OAuth
//! callback.

use serde::{Deserialize, Serialize};

use crate::codec::{SchemaError, Validate};

/// Body of `POST /login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// Account email.
    pub email: String,
    /// Plain-text password, sent over TLS.
    pub password: String,
}

/// Success body of `POST /login`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent calls.
    pub token: String,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Validate for LoginResponse {
    fn validate(&self) -> Result<(), SchemaError> {
        if self.token.is_empty() {
            return Err(SchemaError::EmptyToken);
        }
        Ok(())
    }
}

/// Body of `POST /register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Account email.
    pub email: String,
    /// Plain-text password, sent over TLS.
    pub password: String,
}

/// Query parameter name carrying the token on the OAuth callback URL.
pub const CALLBACK_TOKEN_PARAM: &str = "token";

/// Query parameter name carrying the callback URL on `GET /google-login`.
pub const REDIRECT_URI_PARAM: &str = "redirect_uri";
