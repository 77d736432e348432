//! `taskboard`: kanban task board client.
//!
//! Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskboard/config.toml`).
//!
//! ```bash
//! # Sign in and show the board
//! cargo run --bin taskboard -- login --email me@example.com --password hunter2
//! cargo run --bin taskboard -- board
//!
//! # Against another backend
//! TASKBOARD_API_URL=https://tasks.example.com cargo run --bin taskboard -- add "Write docs"
//! ```

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskboard::api::{ApiError, HttpApi};
use taskboard::auth::AuthClient;
use taskboard::board::{Board, BoardError};
use taskboard::config::{CliArgs, ClientConfig, Command, ConfigError, RoomCommand};
use taskboard::dashboard::Dashboard;
use taskboard::drag::{DragDrop, DragLocation, DragOutcome};
use taskboard::room::RoomController;
use taskboard::session::{SessionEvent, SessionGate, SessionStoreError};
use taskboard::tasks::HttpTaskRepository;
use taskboard::ClientError;
use taskboard_proto::codec::SchemaError;
use taskboard_proto::task::{TaskId, TaskStatus};

/// Anything that can end a CLI invocation early.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionStoreError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("no task with id {0} on the board")]
    UnknownTask(TaskId),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());
    tracing::debug!(api_url = %config.api_url, "taskboard starting");

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let result = run(cli.command.unwrap_or(Command::Board), &config, events_tx).await;

    while let Ok(event) = events_rx.try_recv() {
        if event == SessionEvent::LoginRequired {
            eprintln!("Session expired or missing. Run `taskboard login` to sign in.");
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Client(ClientError::Auth)) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr, or to `file_path` when given. The returned guard
/// must be held until exit so buffered entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let Some(log_path) = file_path else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(env_filter)
            .init();
        return None;
    };

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;
    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

async fn run(
    command: Command,
    config: &ClientConfig,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> Result<(), CliError> {
    let gate = Arc::new(SessionGate::open(config.token_store())?.with_events(events));
    let api = HttpApi::new(config.api_base()?)?;
    let auth = AuthClient::new(api.clone(), Arc::clone(&gate));

    match command {
        Command::Login { email, password } => {
            auth.login(&email, &password).await?;
            println!("Signed in.");
        }
        Command::Signup {
            name,
            email,
            password,
        } => {
            if auth.register(&name, &email, &password).await? {
                println!("Account created. Signed in.");
            } else {
                println!("Account created. Run `taskboard login` to sign in.");
            }
        }
        Command::Logout => {
            auth.logout();
            println!("Signed out.");
        }
        Command::OauthUrl => {
            println!("{}", auth.oauth_start_url(&config.oauth_redirect_uri)?);
        }
        Command::OauthCallback { url } => {
            auth.accept_callback(&url)?;
            println!("Signed in.");
        }
        Command::Room(room) => {
            let mut rooms = RoomController::new(api, gate);
            let result = match room {
                RoomCommand::Create => rooms.create_room().await.map(|code| {
                    println!("Room code: {code}");
                }),
                RoomCommand::Join { code } => rooms.join_room(&code).await.map(|_| ()),
            };
            if let Some(notice) = rooms.notice() {
                println!("{notice}");
            }
            result?;
        }
        board_command => {
            let repo = HttpTaskRepository::new(api, gate);
            let mut dash = Dashboard::new(repo, config.reconcile_policy);
            dash.refresh().await?;
            let result = run_board(&mut dash, board_command).await;
            if let Some(banner) = dash.banner() {
                eprintln!("{}", banner.text);
            }
            result?;
            print_board(dash.board());
        }
    }
    Ok(())
}

async fn run_board(
    dash: &mut Dashboard<HttpTaskRepository>,
    command: Command,
) -> Result<(), CliError> {
    match command {
        Command::Add { title } => dash.add_task(&title).await?,
        Command::Edit { id, title } => {
            dash.edit_task(&TaskId::new(id), &title).await?;
        }
        Command::Delete { id } => dash.delete_task(&TaskId::new(id)).await?,
        Command::Move { id, lane, position } => {
            let id = TaskId::new(id);
            let target: TaskStatus = lane.parse()?;
            let drop = plan_move(dash.board(), &id, target, position)?;
            match dash.on_drag_end(drop).await? {
                DragOutcome::Diverged { error, .. } | DragOutcome::Reverted { error, .. } => {
                    return Err(error.into());
                }
                DragOutcome::Ignored | DragOutcome::Reordered { .. } | DragOutcome::Moved { .. } => {}
            }
        }
        _ => {}
    }
    Ok(())
}

/// Turns "move task to lane at position" into the gesture a drag would
/// produce. The position defaults to the end of the target lane.
fn plan_move(
    board: &Board,
    id: &TaskId,
    target: TaskStatus,
    position: Option<usize>,
) -> Result<DragDrop, CliError> {
    let (lane, index) = board
        .position(id)
        .ok_or_else(|| CliError::UnknownTask(id.clone()))?;
    let target_len = board.lane(target).len();
    let end = if lane == target {
        target_len.saturating_sub(1)
    } else {
        target_len
    };
    Ok(DragDrop {
        source: DragLocation::new(lane, index),
        destination: Some(DragLocation::new(target, position.unwrap_or(end))),
    })
}

fn print_board(board: &Board) {
    for lane in board.lanes() {
        println!("{} ({})", lane.title(), lane.len());
        for task in lane.items() {
            println!("  [{}] {}", task.id, task.title);
        }
    }
}
