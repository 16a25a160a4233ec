// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the watched command
//! through `tokio::process::Command` and reporting its termination back to
//! the runtime as [`RuntimeEvent::Exited`](crate::engine::RuntimeEvent).
//!
//! - [`backend`] provides the `ProcessBackend` trait and the
//!   `RealProcessBackend` used in production. Tests replace it with a fake.
//! - [`child`] waits on a single child process and handles cancellation.

pub mod backend;
pub mod child;

pub use backend::{ProcessBackend, RealProcessBackend};
