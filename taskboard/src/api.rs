//! HTTP plumbing for the Taskboard REST API.
//!
//! [`HttpApi`] builds endpoint URLs from the configured base URL, attaches
//! the bearer token, encodes JSON bodies with the proto codec, and maps every
//! non-2xx response to an [`ApiError`]. It does not decide what an error
//! means for the session; that is the [`SessionGate`](crate::session::SessionGate)'s job.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taskboard_proto::codec::{self, SchemaError, Validate};
use taskboard_proto::error::ErrorBody;
use url::Url;

use crate::session::Token;

/// Errors produced by a single HTTP exchange.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The backend answered 401.
    #[error("unauthorized")]
    Unauthorized {
        /// Message extracted from the error body, if any.
        message: Option<String>,
    },

    /// The backend answered with another non-success status.
    #[error("backend returned status {status}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body, if any.
        message: Option<String>,
    },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body did not match the expected schema.
    #[error("invalid response: {0}")]
    Schema(#[from] SchemaError),

    /// The configured base URL cannot carry path segments.
    #[error("base url cannot be used for API requests: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status of a rejected request.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { .. } => Some(401),
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the backend put in its error body.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { message } | Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

/// Thin JSON-over-HTTP client bound to one backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
}

impl HttpApi {
    /// Creates a client for the backend at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if `base` cannot carry a path
    /// (e.g. a `mailto:` URL).
    pub fn new(base: Url) -> Result<Self, ApiError> {
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base.to_string()));
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    /// Base URL every endpoint is resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Appends path segments to the base URL. Segments are percent-encoded,
    /// so task identifiers cannot escape their path position.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and returns the raw success body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] on 401, [`ApiError::Rejected`] on
    /// any other non-success status, and [`ApiError::Transport`] when no
    /// response arrived.
    pub async fn call<B: Serialize + Sync>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&Token>,
        body: Option<&B>,
    ) -> Result<Vec<u8>, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(method = %method, url = %url, "api request");

        let mut request = self.client.request(method.clone(), url);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose()));
        }
        if let Some(body) = body {
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(codec::encode(body)?);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }
        let text = response.text().await.unwrap_or_default();
        let message = ErrorBody::extract(&text);
        if status == StatusCode::UNAUTHORIZED {
            tracing::debug!(method = %method, "api request unauthorized");
            return Err(ApiError::Unauthorized { message });
        }
        tracing::debug!(method = %method, status = status.as_u16(), "api request rejected");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    /// Sends a request and decodes + validates the success body as `T`.
    ///
    /// # Errors
    ///
    /// Same as [`call`](Self::call), plus [`ApiError::Schema`] if the body
    /// does not decode or validate.
    pub async fn call_json<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        token: Option<&Token>,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned + Validate,
        B: Serialize + Sync,
    {
        let bytes = self.call(method, segments, token, body).await?;
        Ok(codec::decode_validated(&bytes)?)
    }
}

/// Placeholder body type for requests without a body.
pub type NoBody = ();
