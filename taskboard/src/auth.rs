//! Account flows that establish a session: password login, registration,
//! and the browser OAuth round trip.
//!
//! These calls are unauthenticated, so they bypass
//! [`SessionGate::check`](crate::session::SessionGate::check). A 401 from
//! `/login` means a wrong password, not an expired session.

use std::sync::Arc;

use reqwest::Method;
use taskboard_proto::auth::{
    CALLBACK_TOKEN_PARAM, LoginRequest, LoginResponse, REDIRECT_URI_PARAM, RegisterRequest,
};
use taskboard_proto::codec::{self, Validate};
use url::Url;

use crate::api::{ApiError, HttpApi};
use crate::error::ClientError;
use crate::session::{SessionGate, Token};

const LOGIN_FAILED: &str = "Invalid email or password";
const REGISTER_FAILED: &str = "Failed to register. Please try again.";
const OAUTH_FAILED: &str = "Google login failed";

/// Signs users in and out.
#[derive(Debug, Clone)]
pub struct AuthClient {
    api: HttpApi,
    gate: Arc<SessionGate>,
}

impl AuthClient {
    /// Creates a client that stores sessions in `gate`.
    #[must_use]
    pub const fn new(api: HttpApi, gate: Arc<SessionGate>) -> Self {
        Self { api, gate }
    }

    /// Exchanges credentials for a token and signs in.
    ///
    /// # Errors
    ///
    /// [`ClientError::Login`] with the backend message, or a generic one.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .api
            .call_json::<LoginResponse, LoginRequest>(Method::POST, &["login"], None, Some(&body))
            .await
            .map_err(|err| login_failed(&err))?;
        let token = Token::parse(response.token)
            .map_err(|_| ClientError::Login(LOGIN_FAILED.to_string()))?;
        self.gate.sign_in(token);
        Ok(())
    }

    /// Creates an account.
    ///
    /// Returns `true` if the backend answered with a token and the user is
    /// now signed in; otherwise the user still has to log in.
    ///
    /// # Errors
    ///
    /// [`ClientError::Register`] on any failure.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<bool, ClientError> {
        let body = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let bytes = self
            .api
            .call(Method::POST, &["register"], None, Some(&body))
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, "registration failed");
                ClientError::Register(REGISTER_FAILED.to_string())
            })?;
        tracing::info!("registered account");

        let token = codec::decode::<LoginResponse>(&bytes)
            .ok()
            .filter(|r| r.validate().is_ok())
            .and_then(|r| Token::parse(r.token).ok());
        let signed_in = token.is_some();
        if let Some(token) = token {
            self.gate.sign_in(token);
        }
        Ok(signed_in)
    }

    /// URL the browser opens to start the OAuth flow. The provider redirects
    /// back to `redirect_uri` with the token in the query.
    ///
    /// # Errors
    ///
    /// [`ApiError::InvalidBaseUrl`] if the base URL cannot carry a path.
    pub fn oauth_start_url(&self, redirect_uri: &str) -> Result<Url, ApiError> {
        let mut url = self.api.endpoint(&["google-login"])?;
        url.query_pairs_mut()
            .append_pair(REDIRECT_URI_PARAM, redirect_uri);
        Ok(url)
    }

    /// Completes the OAuth flow from the callback URL or its query string.
    ///
    /// # Errors
    ///
    /// [`ClientError::Login`] if the callback carries no usable token.
    pub fn accept_callback(&self, url_or_query: &str) -> Result<(), ClientError> {
        let token = callback_token(url_or_query)
            .and_then(|raw| Token::parse(raw).ok())
            .ok_or_else(|| {
                tracing::warn!("oauth callback carried no token");
                ClientError::Login(OAUTH_FAILED.to_string())
            })?;
        self.gate.sign_in(token);
        Ok(())
    }

    /// Ends the session.
    pub fn logout(&self) {
        self.gate.sign_out();
    }

    /// Whether a session is held.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.gate.is_signed_in()
    }
}

/// Prefers the backend's own message over the generic one.
fn login_failed(err: &ApiError) -> ClientError {
    tracing::warn!(error = %err, "sign-in failed");
    ClientError::Login(err.message().unwrap_or(LOGIN_FAILED).to_string())
}

fn callback_token(url_or_query: &str) -> Option<String> {
    let trimmed = url_or_query.trim();
    let query = match Url::parse(trimmed) {
        Ok(url) => url.query().unwrap_or_default().to_string(),
        Err(_) => trimmed.trim_start_matches('?').to_string(),
    };
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == CALLBACK_TOKEN_PARAM)
        .map(|(_, value)| value.into_owned())
}
