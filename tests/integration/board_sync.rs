// Test-specific lint overrides: integration tests use unwrap/expect freely,
// and some pedantic/nursery lints are not appropriate for test code.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::doc_markdown,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Integration tests for board synchronization through the dashboard.
//!
//! These tests validate:
//! - refresh replaces the board with the backend's task set
//! - add/edit/delete are followed by a full refetch
//! - a cross-lane drag is applied before the status update is sent
//! - a failed status update leaves the board diverged until the next refresh
//! - the revert policy puts the task back instead

mod support;

use axum::http::StatusCode;
use support::{FakeBackend, Route};
use taskboard::dashboard::{
    ADD_FAILED, DELETE_FAILED, Dashboard, EditOutcome, LOAD_FAILED, MOVE_FAILED,
};
use taskboard::drag::{DragDrop, DragLocation, DragOutcome, ReconcilePolicy};
use taskboard::tasks::HttpTaskRepository;
use taskboard_proto::task::{TaskId, TaskStatus};

async fn dashboard(policy: ReconcilePolicy) -> (FakeBackend, Dashboard<HttpTaskRepository>) {
    let (fake, base) = FakeBackend::start().await;
    let repo = HttpTaskRepository::new(support::api(&base), support::signed_in_gate());
    (fake, Dashboard::new(repo, policy))
}

fn gets(fake: &FakeBackend) -> usize {
    fake.requests()
        .iter()
        .filter(|r| r.method == "GET" && r.path == "/tasks")
        .count()
}

fn drag(from: (TaskStatus, usize), to: (TaskStatus, usize)) -> DragDrop {
    DragDrop {
        source: DragLocation::new(from.0, from.1),
        destination: Some(DragLocation::new(to.0, to.1)),
    }
}

// =============================================================================
// Refresh and CRUD
// =============================================================================

#[tokio::test]
async fn refresh_partitions_tasks_by_status() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::default()).await;
    fake.seed("A", "todo");
    fake.seed("B", "todo");
    fake.seed("C", "done");

    assert!(dash.is_loading());
    dash.refresh().await.unwrap();

    assert!(!dash.is_loading());
    assert_eq!(dash.board().lane(TaskStatus::Todo).len(), 2);
    assert_eq!(dash.board().lane(TaskStatus::InProgress).len(), 0);
    assert_eq!(dash.board().lane(TaskStatus::Done).len(), 1);
    assert!(dash.board().check_invariants().is_ok());
}

#[tokio::test]
async fn failed_refresh_shows_load_banner() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::default()).await;
    fake.fail_next(Route::ListTasks, StatusCode::INTERNAL_SERVER_ERROR, None);

    assert!(dash.refresh().await.is_err());
    assert_eq!(dash.banner().unwrap().text, LOAD_FAILED);
}

#[tokio::test]
async fn add_edit_delete_each_refetch() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::default()).await;
    dash.refresh().await.unwrap();

    dash.add_task("Write docs").await.unwrap();
    assert_eq!(gets(&fake), 2);
    let id = dash.board().lane(TaskStatus::Todo).items()[0].id.clone();

    assert_eq!(dash.edit_task(&id, "Write better docs").await.unwrap(), EditOutcome::Saved);
    assert_eq!(gets(&fake), 3);
    assert_eq!(dash.board().get(&id).unwrap().title, "Write better docs");

    dash.delete_task(&id).await.unwrap();
    assert_eq!(gets(&fake), 4);
    assert!(dash.board().is_empty());
}

#[tokio::test]
async fn edit_sends_title_with_current_status() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::default()).await;
    let id = fake.seed("Old", "inprogress");
    dash.refresh().await.unwrap();

    dash.edit_task(&TaskId::new(id.to_string()), "New").await.unwrap();

    let put = &fake.requests_to(&format!("/tasks/{id}"))[0];
    let body: serde_json::Value = serde_json::from_str(&put.body).unwrap();
    assert_eq!(body, serde_json::json!({ "title": "New", "status": "inprogress" }));
}

#[tokio::test]
async fn failed_add_shows_banner_and_skips_refetch() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::default()).await;
    dash.refresh().await.unwrap();
    fake.fail_next(Route::CreateTask, StatusCode::INTERNAL_SERVER_ERROR, None);

    assert!(dash.add_task("A").await.is_err());
    assert_eq!(dash.banner().unwrap().text, ADD_FAILED);
    assert_eq!(gets(&fake), 1);
}

#[tokio::test]
async fn failed_delete_shows_banner() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::default()).await;
    let id = fake.seed("A", "todo");
    dash.refresh().await.unwrap();
    fake.fail_next(Route::DeleteTask, StatusCode::INTERNAL_SERVER_ERROR, None);

    assert!(dash.delete_task(&TaskId::new(id.to_string())).await.is_err());
    assert_eq!(dash.banner().unwrap().text, DELETE_FAILED);
    assert_eq!(dash.board().len(), 1);
}

// =============================================================================
// Drag reconciliation
// =============================================================================

#[tokio::test]
async fn cross_lane_drag_persists_without_refetch() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::default()).await;
    let a = fake.seed("A", "todo");
    fake.seed("B", "todo");
    dash.refresh().await.unwrap();

    let outcome = dash
        .on_drag_end(drag((TaskStatus::Todo, 0), (TaskStatus::Done, 0)))
        .await
        .unwrap();

    assert!(matches!(outcome, DragOutcome::Moved { .. }));
    assert_eq!(dash.board().lane(TaskStatus::Todo).items()[0].title, "B");
    assert_eq!(dash.board().lane(TaskStatus::Done).items()[0].title, "A");
    assert_eq!(fake.tasks()[0].status, "done");
    assert_eq!(fake.requests_to(&format!("/tasks/{a}"))[0].body, r#"{"status":"done"}"#);
    assert_eq!(gets(&fake), 1);
}

#[tokio::test]
async fn same_lane_drag_makes_no_request() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::default()).await;
    fake.seed("A", "todo");
    fake.seed("B", "todo");
    dash.refresh().await.unwrap();
    let before = fake.requests().len();

    let outcome = dash
        .on_drag_end(drag((TaskStatus::Todo, 1), (TaskStatus::Todo, 0)))
        .await
        .unwrap();

    assert_eq!(outcome, DragOutcome::Reordered { lane: TaskStatus::Todo });
    assert_eq!(dash.board().lane(TaskStatus::Todo).items()[0].title, "B");
    assert_eq!(fake.requests().len(), before);
}

#[tokio::test]
async fn failed_drag_diverges_until_refresh() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::KeepOptimistic).await;
    fake.seed("A", "todo");
    dash.refresh().await.unwrap();
    fake.fail_next(Route::UpdateTask, StatusCode::INTERNAL_SERVER_ERROR, None);

    let outcome = dash
        .on_drag_end(drag((TaskStatus::Todo, 0), (TaskStatus::InProgress, 0)))
        .await
        .unwrap();

    assert!(matches!(outcome, DragOutcome::Diverged { .. }));
    assert_eq!(dash.banner().unwrap().text, MOVE_FAILED);
    assert_eq!(dash.board().lane(TaskStatus::InProgress).len(), 1);
    assert_eq!(fake.tasks()[0].status, "todo");

    dash.dismiss_banner();
    dash.refresh().await.unwrap();
    assert_eq!(dash.board().lane(TaskStatus::Todo).len(), 1);
    assert_eq!(dash.board().lane(TaskStatus::InProgress).len(), 0);
}

#[tokio::test]
async fn failed_drag_reverts_under_revert_policy() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::RevertOnFailure).await;
    fake.seed("A", "todo");
    fake.seed("B", "todo");
    dash.refresh().await.unwrap();
    fake.fail_next(Route::UpdateTask, StatusCode::BAD_GATEWAY, None);

    let outcome = dash
        .on_drag_end(drag((TaskStatus::Todo, 0), (TaskStatus::Done, 0)))
        .await
        .unwrap();

    assert!(matches!(outcome, DragOutcome::Reverted { .. }));
    let todo: Vec<_> = dash
        .board()
        .lane(TaskStatus::Todo)
        .items()
        .iter()
        .map(|t| t.title.as_str())
        .collect();
    assert_eq!(todo, ["A", "B"]);
    assert!(dash.board().lane(TaskStatus::Done).is_empty());
}

#[tokio::test]
async fn drop_outside_any_lane_changes_nothing() {
    let (fake, mut dash) = dashboard(ReconcilePolicy::default()).await;
    fake.seed("A", "todo");
    dash.refresh().await.unwrap();
    let before = dash.board().clone();

    let outcome = dash
        .on_drag_end(DragDrop {
            source: DragLocation::new(TaskStatus::Todo, 0),
            destination: None,
        })
        .await
        .unwrap();

    assert_eq!(outcome, DragOutcome::Ignored);
    assert_eq!(dash.board(), &before);
}
