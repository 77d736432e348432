//! Session gate: the single owner of the bearer token.
//!
//! Every authenticated call asks the [`SessionGate`] for a token first and
//! hands its result back through [`SessionGate::check`]. A missing token or a
//! 401 from the backend runs the same recovery procedure: forget the token
//! (in memory and on disk) and emit [`SessionEvent::LoginRequired`] so the
//! view can navigate to the login entry point.
//!
//! The gate is created once and injected as `Arc<SessionGate>` into each
//! component that talks to the backend.

use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use taskboard_proto::codec::SchemaError;
use tokio::sync::mpsc;
use zeroize::Zeroizing;

use crate::api::ApiError;
use crate::error::{ClientError, FailureKind};

/// Opaque bearer token. The backing memory is zeroized on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(Zeroizing<String>);

impl Token {
    /// Wraps a token string received from the backend.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::EmptyToken`] for an empty or whitespace string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, SchemaError> {
        let raw = Zeroizing::new(raw.into());
        if raw.trim().is_empty() {
            return Err(SchemaError::EmptyToken);
        }
        Ok(Self(raw))
    }

    /// The token value, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Token(<redacted>)")
    }
}

/// Errors reading or writing the persisted token.
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    /// The token file could not be read, written, or removed.
    #[error("failed to access session file {path}: {source}")]
    Io {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Where the token survives between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStore {
    /// Process memory only.
    Memory,
    /// A single-line file, written owner-readable only on unix.
    File(PathBuf),
}

impl TokenStore {
    fn load(&self) -> Result<Option<Token>, SessionStoreError> {
        let Self::File(path) = self else {
            return Ok(None);
        };
        match std::fs::read_to_string(path) {
            Ok(contents) => Ok(Token::parse(contents.trim()).ok()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(SessionStoreError::Io {
                path: path.clone(),
                source,
            }),
        }
    }

    fn save(&self, token: &Token) -> Result<(), SessionStoreError> {
        let Self::File(path) = self else {
            return Ok(());
        };
        write_private(path, token.expose()).map_err(|source| SessionStoreError::Io {
            path: path.clone(),
            source,
        })
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        let Self::File(path) = self else {
            return Ok(());
        };
        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(SessionStoreError::Io {
                path: path.clone(),
                source,
            }),
        }
    }
}

fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())?;
    file.write_all(b"\n")
}

/// Session lifecycle notifications for the view layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// A token was stored.
    SignedIn,
    /// The user signed out explicitly.
    SignedOut,
    /// The session was missing or rejected; the view should show login.
    LoginRequired,
}

/// Owner of the current session token.
pub struct SessionGate {
    token: Mutex<Option<Token>>,
    store: TokenStore,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl SessionGate {
    /// Creates a gate with no session and no persistence.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            token: Mutex::new(None),
            store: TokenStore::Memory,
            events: None,
        }
    }

    /// Creates a gate backed by `store`, restoring a previously saved token.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError`] if the token file exists but cannot be read.
    pub fn open(store: TokenStore) -> Result<Self, SessionStoreError> {
        let token = store.load()?;
        if token.is_some() {
            tracing::debug!("restored persisted session");
        }
        Ok(Self {
            token: Mutex::new(token),
            store,
            events: None,
        })
    }

    /// Attaches a channel that receives [`SessionEvent`]s.
    #[must_use]
    pub fn with_events(mut self, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Stores a new token, replacing any previous one.
    ///
    /// A failure to persist is logged; the session still holds for this run.
    pub fn sign_in(&self, token: Token) {
        if let Err(e) = self.store.save(&token) {
            tracing::warn!(error = %e, "could not persist session token");
        }
        *self.token.lock() = Some(token);
        tracing::info!("signed in");
        self.emit(SessionEvent::SignedIn);
    }

    /// Forgets the token at the user's request.
    pub fn sign_out(&self) {
        self.forget();
        tracing::info!("signed out");
        self.emit(SessionEvent::SignedOut);
    }

    /// Returns `true` while a token is held.
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.token.lock().is_some()
    }

    /// Returns the current token, or runs recovery and fails.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Auth`] when no session is held. The caller must
    /// abort without side effects.
    pub fn require(&self) -> Result<Token, ClientError> {
        let token = self.token.lock().clone();
        token.ok_or_else(|| {
            self.recover("no session");
            ClientError::Auth
        })
    }

    /// Classifies the outcome of a gated call.
    ///
    /// This is the only place a 401 is interpreted: it runs recovery and
    /// becomes [`ClientError::Auth`]. Every other failure becomes the
    /// `kind`-specific [`ClientError`].
    ///
    /// # Errors
    ///
    /// Returns the classified error when `result` is an error.
    pub fn check<T>(&self, result: Result<T, ApiError>, kind: FailureKind) -> Result<T, ClientError> {
        result.map_err(|err| {
            if matches!(err, ApiError::Unauthorized { .. }) {
                self.recover("backend rejected token");
                ClientError::Auth
            } else {
                let classified = kind.classify(&err);
                tracing::warn!(operation = ?kind, error = %err, "request failed");
                classified
            }
        })
    }

    fn recover(&self, reason: &str) {
        self.forget();
        tracing::warn!(reason, "session invalid, login required");
        self.emit(SessionEvent::LoginRequired);
    }

    fn forget(&self) {
        self.token.lock().take();
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "could not remove persisted session token");
        }
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events {
            // The view may have gone away; nothing else needs the event.
            let _ = tx.send(event);
        }
    }
}

impl std::fmt::Debug for SessionGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionGate")
            .field("signed_in", &self.is_signed_in())
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
