//! Kanban task board client core.
//!
//! Session handling, typed access to the task backend, the three-lane board
//! model, optimistic drag reconciliation, and room collaboration.

pub mod api;
pub mod auth;
pub mod board;
pub mod config;
pub mod dashboard;
pub mod drag;
pub mod error;
pub mod room;
pub mod session;
pub mod tasks;

pub use error::ClientError;
