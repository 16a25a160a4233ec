// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The runtime talks to a `ProcessBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake backend in tests while
//! keeping the production implementation here.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::engine::RuntimeEvent;
use crate::errors::{Result, StalkerError};
use crate::exec::child::supervise_child;
use crate::types::CommandSpec;

/// Trait abstracting how the watched command is run.
///
/// Implementations report every child termination as exactly one
/// `RuntimeEvent::Exited` on the runtime channel.
pub trait ProcessBackend: Send {
    /// Start the command without waiting for it.
    ///
    /// Returns an error only when the child could not be created at all.
    fn spawn(&mut self, spec: &CommandSpec) -> Result<()>;

    /// Forget the handle of a child whose exit has been reported.
    fn release(&mut self);

    /// Close any live child handle.
    ///
    /// Must be safe to call repeatedly; later calls are no-ops.
    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>>;
}

/// Handle for the currently running child.
///
/// - `cancel` asks the waiting task to kill the child.
/// - `handle` is the Tokio task waiting on the child.
struct ActiveChild {
    pid: Option<u32>,
    cancel: Option<oneshot::Sender<()>>,
    handle: tokio::task::JoinHandle<()>,
}

/// Real backend used in production.
pub struct RealProcessBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    quiet: bool,
    active: Option<ActiveChild>,
}

impl RealProcessBackend {
    /// Create a backend reporting exits on `runtime_tx`.
    ///
    /// With `quiet`, the child's stdout goes to the null device.
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, quiet: bool) -> Self {
        Self {
            runtime_tx,
            quiet,
            active: None,
        }
    }

    /// Whether a child handle is currently held.
    pub fn has_child(&self) -> bool {
        self.active.is_some()
    }

    fn build_command(&self, spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(spec.shell());
        cmd.args(spec.args());

        let stdout = if self.quiet {
            Stdio::null()
        } else {
            Stdio::inherit()
        };
        cmd.stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        cmd
    }
}

impl ProcessBackend for RealProcessBackend {
    fn spawn(&mut self, spec: &CommandSpec) -> Result<()> {
        if let Some(active) = &self.active {
            if !active.handle.is_finished() {
                return Err(StalkerError::AlreadyRunning);
            }
        }

        let child = self
            .build_command(spec)
            .spawn()
            .map_err(|source| StalkerError::Spawn {
                command: spec.to_string(),
                source,
            })?;

        let pid = child.id();
        debug!(?pid, command = %spec, "child spawned");

        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(supervise_child(
            child,
            self.runtime_tx.clone(),
            cancel_rx,
        ));

        self.active = Some(ActiveChild {
            pid,
            cancel: Some(cancel_tx),
            handle,
        });
        Ok(())
    }

    fn release(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(pid = ?active.pid, "child handle released");
        }
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let active = self.active.take();

        Box::pin(async move {
            let Some(mut active) = active else {
                return;
            };

            if active.handle.is_finished() {
                debug!(pid = ?active.pid, "child already finished; nothing to close");
                return;
            }

            if let Some(cancel) = active.cancel.take() {
                if cancel.send(()).is_err() {
                    debug!(pid = ?active.pid, "child finished while closing");
                }
            }

            if let Err(err) = active.handle.await {
                debug!(pid = ?active.pid, error = %err, "child task ended abnormally");
            }
        })
    }
}
