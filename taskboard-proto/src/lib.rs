//! Wire schemas for the Taskboard REST API.
//!
//! Every request and response body exchanged with the backend has an
//! explicit type here. Decoding goes through [`codec::decode_validated`] so
//! fields are checked before the client trusts them.

pub mod auth;
pub mod codec;
pub mod error;
pub mod room;
pub mod task;
