//! In-process fake of the Taskboard REST backend.
//!
//! Started on `127.0.0.1:0` per test. Records every request, checks the
//! bearer token the way the real backend does, and can be told to fail the
//! next call to a given route.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use taskboard::api::HttpApi;
use taskboard::session::{SessionGate, Token};
use url::Url;

/// Token the fake hands out and accepts.
pub const VALID_TOKEN: &str = "valid-token";
/// Credentials the fake accepts on `/login`.
pub const EMAIL: &str = "alice@example.com";
pub const PASSWORD: &str = "secret";
/// Room that `/join-room` knows about.
pub const KNOWN_ROOM: &str = "ABC12";

/// Routes that can have failures injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    ListTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
    CreateRoom,
    JoinRoom,
}

/// One request as the fake saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: String,
}

/// Task as stored by the fake. Ids are numeric, like the real backend's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTask {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub status: String,
}

#[derive(Debug, Default)]
struct Inner {
    tasks: Vec<StoredTask>,
    next_id: u64,
    requests: Vec<Recorded>,
    failures: VecDeque<(Route, StatusCode, Option<String>)>,
    token_revoked: bool,
    register_returns_token: bool,
}

/// Handle to a running fake backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    inner: Arc<Mutex<Inner>>,
}

impl FakeBackend {
    /// Starts a fake on an ephemeral port and returns it with its base URL.
    pub async fn start() -> (Self, Url) {
        let fake = Self::default();
        let app = Router::new()
            .route("/login", post(login))
            .route("/register", post(register))
            .route("/tasks", get(list_tasks).post(create_task))
            .route("/tasks/{id}", put(update_task).delete(delete_task))
            .route("/create-room", post(create_room))
            .route("/join-room", post(join_room))
            .with_state(fake.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (fake, Url::parse(&format!("http://{addr}")).unwrap())
    }

    /// Adds a task directly to the backend's store.
    pub fn seed(&self, title: &str, status: &str) -> u64 {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner.tasks.push(StoredTask {
            id,
            title: title.to_string(),
            description: String::new(),
            status: status.to_string(),
        });
        id
    }

    /// Makes the next call to `route` answer `status` with an optional
    /// `{ "message": ... }` body.
    pub fn fail_next(&self, route: Route, status: StatusCode, message: Option<&str>) {
        self.inner
            .lock()
            .failures
            .push_back((route, status, message.map(String::from)));
    }

    /// Every token is rejected from now on.
    pub fn revoke_tokens(&self) {
        self.inner.lock().token_revoked = true;
    }

    /// `/register` answers with a token, so the client signs in directly.
    pub fn register_returns_token(&self) {
        self.inner.lock().register_returns_token = true;
    }

    pub fn tasks(&self) -> Vec<StoredTask> {
        self.inner.lock().tasks.clone()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.inner.lock().requests.clone()
    }

    /// Requests whose path starts with `prefix`.
    pub fn requests_to(&self, prefix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.starts_with(prefix))
            .collect()
    }

    fn record(&self, method: &str, path: &str, headers: &HeaderMap, body: &str) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.inner.lock().requests.push(Recorded {
            method: method.to_string(),
            path: path.to_string(),
            authorization,
            body: body.to_string(),
        });
    }

    /// Token check plus injected failure, in the order the backend applies them.
    fn gate(&self, route: Route, headers: &HeaderMap) -> Result<(), Response> {
        let mut inner = self.inner.lock();
        let expected = format!("Bearer {VALID_TOKEN}");
        let presented = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        if inner.token_revoked || presented != Some(expected.as_str()) {
            return Err(error(StatusCode::UNAUTHORIZED, Some("Unauthorized")));
        }
        if let Some(pos) = inner.failures.iter().position(|(r, _, _)| *r == route) {
            if let Some((_, status, message)) = inner.failures.remove(pos) {
                return Err(error(status, message.as_deref()));
            }
        }
        Ok(())
    }
}

fn error(status: StatusCode, message: Option<&str>) -> Response {
    match message {
        Some(m) => (status, Json(json!({ "message": m }))).into_response(),
        None => status.into_response(),
    }
}

async fn login(State(fake): State<FakeBackend>, headers: HeaderMap, body: String) -> Response {
    fake.record("POST", "/login", &headers, &body);
    let creds: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    if creds["email"] == EMAIL && creds["password"] == PASSWORD {
        Json(json!({ "token": VALID_TOKEN })).into_response()
    } else {
        error(StatusCode::UNAUTHORIZED, Some("Invalid credentials"))
    }
}

async fn register(State(fake): State<FakeBackend>, headers: HeaderMap, body: String) -> Response {
    fake.record("POST", "/register", &headers, &body);
    let account: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    if account["email"] == EMAIL {
        return error(StatusCode::BAD_REQUEST, Some("User already exists"));
    }
    if fake.inner.lock().register_returns_token {
        return (StatusCode::CREATED, Json(json!({ "token": VALID_TOKEN }))).into_response();
    }
    (StatusCode::CREATED, Json(json!({ "message": "User registered" }))).into_response()
}

async fn list_tasks(State(fake): State<FakeBackend>, headers: HeaderMap) -> Response {
    fake.record("GET", "/tasks", &headers, "");
    if let Err(resp) = fake.gate(Route::ListTasks, &headers) {
        return resp;
    }
    Json(fake.tasks()).into_response()
}

async fn create_task(State(fake): State<FakeBackend>, headers: HeaderMap, body: String) -> Response {
    fake.record("POST", "/tasks", &headers, &body);
    if let Err(resp) = fake.gate(Route::CreateTask, &headers) {
        return resp;
    }
    let input: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    let mut inner = fake.inner.lock();
    inner.next_id += 1;
    let task = StoredTask {
        id: inner.next_id,
        title: input["title"].as_str().unwrap_or_default().to_string(),
        description: input["description"].as_str().unwrap_or_default().to_string(),
        status: input["status"].as_str().unwrap_or("todo").to_string(),
    };
    inner.tasks.push(task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn update_task(
    State(fake): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    body: String,
) -> Response {
    fake.record("PUT", &format!("/tasks/{id}"), &headers, &body);
    if let Err(resp) = fake.gate(Route::UpdateTask, &headers) {
        return resp;
    }
    let patch: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    let mut inner = fake.inner.lock();
    let Some(task) = inner.tasks.iter_mut().find(|t| t.id == id) else {
        return error(StatusCode::NOT_FOUND, Some("Task not found"));
    };
    if let Some(title) = patch["title"].as_str() {
        task.title = title.to_string();
    }
    if let Some(status) = patch["status"].as_str() {
        task.status = status.to_string();
    }
    Json(task.clone()).into_response()
}

async fn delete_task(
    State(fake): State<FakeBackend>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Response {
    fake.record("DELETE", &format!("/tasks/{id}"), &headers, "");
    if let Err(resp) = fake.gate(Route::DeleteTask, &headers) {
        return resp;
    }
    let mut inner = fake.inner.lock();
    let before = inner.tasks.len();
    inner.tasks.retain(|t| t.id != id);
    if inner.tasks.len() == before {
        return error(StatusCode::NOT_FOUND, Some("Task not found"));
    }
    Json(json!({ "message": "Task deleted" })).into_response()
}

async fn create_room(State(fake): State<FakeBackend>, headers: HeaderMap) -> Response {
    fake.record("POST", "/create-room", &headers, "");
    if let Err(resp) = fake.gate(Route::CreateRoom, &headers) {
        return resp;
    }
    Json(json!({ "code": "ROOM42" })).into_response()
}

async fn join_room(State(fake): State<FakeBackend>, headers: HeaderMap, body: String) -> Response {
    fake.record("POST", "/join-room", &headers, &body);
    if let Err(resp) = fake.gate(Route::JoinRoom, &headers) {
        return resp;
    }
    let input: serde_json::Value = serde_json::from_str(&body).unwrap_or_default();
    if input["code"] == KNOWN_ROOM {
        Json(json!({ "code": KNOWN_ROOM })).into_response()
    } else {
        error(StatusCode::NOT_FOUND, Some("Room not found"))
    }
}

// =============================================================================
// Client-side helpers
// =============================================================================

pub fn api(base: &Url) -> HttpApi {
    HttpApi::new(base.clone()).unwrap()
}

pub fn signed_in_gate() -> Arc<SessionGate> {
    let gate = Arc::new(SessionGate::in_memory());
    gate.sign_in(Token::parse(VALID_TOKEN).unwrap());
    gate
}
