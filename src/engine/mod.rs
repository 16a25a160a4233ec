// src/engine/mod.rs

//! Supervision engine for stalker.
//!
//! This module ties together:
//! - the run/idle state of the watched command
//! - the overlap guard (never two instances of the command at once)
//! - the halt policy
//! - the main runtime event loop that reacts to:
//!   - filesystem change notifications
//!   - child exit notifications
//!   - spawn failures
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::fmt;
use std::process::ExitStatus;

/// Kind of filesystem change reported by the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// An entry appeared, disappeared or was renamed.
    Renamed,
    /// An entry's content or metadata changed.
    Changed,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Renamed => f.write_str("rename"),
            ChangeKind::Changed => f.write_str("change"),
        }
    }
}

/// A single change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Changed entry, relative to the watch root when known.
    pub entry: Option<String>,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, entry: Option<String>) -> Self {
        Self { kind, entry }
    }
}

/// Termination status of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// Exit code, absent when the child was killed by a signal.
    pub code: Option<i32>,
    /// Terminating signal, if any.
    pub signal: Option<i32>,
}

impl ExitReport {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn signalled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    /// Status could not be collected.
    pub fn unknown() -> Self {
        Self {
            code: None,
            signal: None,
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<ExitStatus> for ExitReport {
    fn from(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }
}

/// Run state of the watched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
}

/// Why the watcher stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// External termination (Ctrl-C, SIGTERM) or the event source closed.
    Interrupted,
    /// The command could not be spawned.
    SpawnFailed,
    /// Halt policy fired after a failing child.
    Halted(ExitReport),
}

impl Termination {
    /// Process exit status for this termination.
    ///
    /// Halting always exits with 1, regardless of the child's own code.
    pub fn exit_code(&self) -> u8 {
        match self {
            Termination::Interrupted => 0,
            Termination::SpawnFailed | Termination::Halted(_) => 1,
        }
    }
}

/// Events flowing into the runtime from the watcher, the process backend
/// and the signal listener.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// The watched path changed.
    Changed(ChangeEvent),
    /// The running child terminated.
    Exited(ExitReport),
    /// The process backend refused to spawn the command.
    SpawnFailed { error: String },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use self::core::Supervisor;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
