// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::exec::ProcessBackend;
use crate::types::CommandSpec;
use crate::watch::WatcherHandle;

use super::core::Supervisor;
use super::{CoreCommand, RuntimeEvent, Termination};

/// Drives the [`Supervisor`] in response to `RuntimeEvent`s and delegates
/// process creation to a `ProcessBackend`.
///
/// This is a pure IO shell around the core, which holds all the supervision
/// semantics. It owns every OS resource of the watcher (the watch handle
/// and, through the backend, the child handle) and closes them on every
/// exit path.
pub struct Runtime<B: ProcessBackend> {
    core: Supervisor,
    command: CommandSpec,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
    watcher: Option<WatcherHandle>,
}

impl<B: ProcessBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("command", &self.command)
            .field("watcher", &self.watcher)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Runtime<B> {
    pub fn new(
        core: Supervisor,
        command: CommandSpec,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        backend: B,
    ) -> Self {
        Self {
            core,
            command,
            event_rx,
            backend,
            watcher: None,
        }
    }

    /// Hand the watch handle to the runtime so it is closed on shutdown.
    pub fn with_watcher(mut self, watcher: WatcherHandle) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Main event loop.
    ///
    /// - Consumes `RuntimeEvent`s from `event_rx`, one at a time.
    /// - Feeds them into the core.
    /// - Executes the commands the core returns.
    ///
    /// Returns once the core reaches a terminal state or the event channel
    /// closes. All handles are closed before returning.
    pub async fn run(mut self) -> Termination {
        debug!(command = %self.command, "runtime started");

        let termination = loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    debug!("event channel closed; exiting");
                    break Termination::Interrupted;
                }
            };

            debug!(?event, "runtime received event");

            // Feed the event into the pure core and get commands back.
            let step = self.core.step(event);
            let mut keep_running = step.keep_running;
            let mut pending: VecDeque<CoreCommand> = step.commands.into();

            while let Some(command) = pending.pop_front() {
                if let Some(follow_up) = self.execute_command(command) {
                    let step = self.core.step(follow_up);
                    keep_running &= step.keep_running;
                    pending.extend(step.commands);
                }
            }

            if !keep_running {
                break self.core.termination().unwrap_or(Termination::Interrupted);
            }
        };

        self.shutdown().await;
        debug!(?termination, "runtime exiting");
        termination
    }

    /// Stop accepting events, then close the watch handle and any live
    /// child.
    ///
    /// Idempotent: handles already closed are skipped.
    pub async fn shutdown(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.close();
        }
        // A late exit report must not park the child task joined below.
        self.event_rx.close();
        self.backend.close().await;
    }

    /// Read-only view of the core (for tests).
    pub fn core(&self) -> &Supervisor {
        &self.core
    }

    /// Execute a single command from the core.
    ///
    /// A failed spawn is turned into a follow-up event for the core.
    fn execute_command(&mut self, command: CoreCommand) -> Option<RuntimeEvent> {
        match command {
            CoreCommand::Spawn => {
                if self.core.policy().verbose {
                    info!(command = %self.command, "spawning command");
                }
                match self.backend.spawn(&self.command) {
                    Ok(()) => None,
                    Err(err) => Some(RuntimeEvent::SpawnFailed {
                        error: err.to_string(),
                    }),
                }
            }
            CoreCommand::ReleaseProcess => {
                self.backend.release();
                None
            }
            CoreCommand::Shutdown(termination) => {
                debug!(?termination, "core requested shutdown");
                None
            }
        }
    }
}
