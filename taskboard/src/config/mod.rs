//! Configuration system for the Taskboard client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::{Path, PathBuf};

use url::Url;

use crate::drag::ReconcilePolicy;
use crate::session::TokenStore;

/// Backend address used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Where the OAuth provider sends the browser back to.
pub const DEFAULT_OAUTH_REDIRECT: &str = "http://localhost:3000/google-callback";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The configured API base URL is not a URL.
    #[error("invalid api url {value:?}: {source}")]
    InvalidUrl {
        /// The configured value.
        value: String,
        /// Parser error.
        source: url::ParseError,
    },
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    api: ApiFileConfig,
    session: SessionFileConfig,
    board: BoardFileConfig,
}

/// `[api]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ApiFileConfig {
    base_url: Option<String>,
    oauth_redirect_uri: Option<String>,
}

/// `[session]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct SessionFileConfig {
    token_file: Option<PathBuf>,
}

/// `[board]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct BoardFileConfig {
    revert_on_failure: Option<bool>,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Fully resolved client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, as configured.
    pub api_url: String,
    /// Redirect target passed to the OAuth start endpoint.
    pub oauth_redirect_uri: String,
    /// Token file; `None` keeps the session in memory only.
    pub token_file: Option<PathBuf>,
    /// What the board does when a drag cannot be persisted.
    pub reconcile_policy: ReconcilePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            oauth_redirect_uri: DEFAULT_OAUTH_REDIRECT.to_string(),
            token_file: default_token_file(),
            reconcile_policy: ReconcilePolicy::KeepOptimistic,
        }
    }
}

impl ClientConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read,
    /// or if any config file present cannot be parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        Ok(Self::resolve(cli, &file))
    }

    /// Priority: CLI > file > default.
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();
        let revert = cli.revert_on_failure || file.board.revert_on_failure.unwrap_or(false);

        Self {
            api_url: cli
                .api_url
                .clone()
                .or_else(|| file.api.base_url.clone())
                .unwrap_or(defaults.api_url),
            oauth_redirect_uri: file
                .api
                .oauth_redirect_uri
                .clone()
                .unwrap_or(defaults.oauth_redirect_uri),
            token_file: cli
                .session_file
                .clone()
                .or_else(|| file.session.token_file.clone())
                .or(defaults.token_file),
            reconcile_policy: if revert {
                ReconcilePolicy::RevertOnFailure
            } else {
                ReconcilePolicy::KeepOptimistic
            },
        }
    }

    /// Parsed API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the value does not parse.
    pub fn api_base(&self) -> Result<Url, ConfigError> {
        Url::parse(&self.api_url).map_err(|source| ConfigError::InvalidUrl {
            value: self.api_url.clone(),
            source,
        })
    }

    /// Session store matching [`token_file`](Self::token_file).
    #[must_use]
    pub fn token_store(&self) -> TokenStore {
        self.token_file
            .clone()
            .map_or(TokenStore::Memory, TokenStore::File)
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Kanban task board client")]
pub struct CliArgs {
    /// Base URL of the Taskboard API.
    #[arg(long, env = "TASKBOARD_API_URL", global = true)]
    pub api_url: Option<String>,

    /// File that keeps the session token between runs.
    #[arg(long, env = "TASKBOARD_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Path to config file (default: `~/.config/taskboard/config.toml`).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Move a task back if its new status cannot be saved.
    #[arg(long, global = true)]
    pub revert_on_failure: bool,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn", env = "TASKBOARD_LOG", global = true)]
    pub log_level: String,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// What to do (default: show the board).
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Top-level subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in with email and password.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account.
    Signup {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long, env = "TASKBOARD_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session.
    Logout,
    /// Print the URL that starts Google sign-in.
    OauthUrl,
    /// Finish Google sign-in from the callback URL.
    OauthCallback {
        /// The full callback URL or its query string.
        url: String,
    },
    /// Show all lanes.
    Board,
    /// Add a task to the To Do lane.
    Add {
        /// Task title.
        title: String,
    },
    /// Rename a task.
    Edit {
        /// Task id.
        id: String,
        /// New title.
        title: String,
    },
    /// Delete a task.
    Delete {
        /// Task id.
        id: String,
    },
    /// Move a task to another lane or position.
    Move {
        /// Task id.
        id: String,
        /// Target lane: todo, inprogress, or done.
        lane: String,
        /// Position in the target lane (default: end).
        #[arg(long)]
        position: Option<usize>,
    },
    /// Create or join a collaboration room.
    #[command(subcommand)]
    Room(RoomCommand),
}

/// `room` subcommands.
#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum RoomCommand {
    /// Ask the backend for a new room code.
    Create,
    /// Join an existing room.
    Join {
        /// Room code (case-insensitive).
        code: String,
    },
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn default_token_file() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("taskboard").join("session"))
}

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&Path>) -> Result<ConfigFile, ConfigError> {
    if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };
    let path = config_dir.join("taskboard").join("config.toml");

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
