// src/engine/event_handlers.rs

//! Event handling logic for the supervisor core.

use tracing::{debug, error, info, warn};

use crate::engine::{ChangeEvent, ExitReport, RunState, Termination};
use crate::types::SupervisionPolicy;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreCommand {
    /// Spawn the watched command.
    Spawn,
    /// Drop the handle of the child that just exited.
    ReleaseProcess,
    /// Close every open handle and stop the runtime.
    Shutdown(Termination),
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn proceed(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    pub fn terminate(termination: Termination) -> Self {
        Self {
            commands: vec![CoreCommand::Shutdown(termination)],
            keep_running: false,
        }
    }

    /// Whether this step asks for a new child.
    pub fn spawns(&self) -> bool {
        self.commands.contains(&CoreCommand::Spawn)
    }

    /// The termination carried by this step, if any.
    pub fn termination(&self) -> Option<Termination> {
        self.commands.iter().find_map(|c| match c {
            CoreCommand::Shutdown(t) => Some(*t),
            _ => None,
        })
    }
}

/// Handle a change notification.
///
/// - Idle: request a spawn and move to `Running`.
/// - Running: the overlap guard drops the change.
pub fn on_change(
    state: &mut RunState,
    policy: &SupervisionPolicy,
    event: &ChangeEvent,
) -> CoreStep {
    if policy.verbose {
        info!(
            kind = %event.kind,
            entry = event.entry.as_deref().unwrap_or(""),
            "change detected"
        );
    }

    match state {
        RunState::Running => {
            debug!("change ignored; command already running");
            if policy.verbose {
                info!("already running");
            }
            CoreStep::proceed(Vec::new())
        }
        RunState::Idle => {
            *state = RunState::Running;
            CoreStep::proceed(vec![CoreCommand::Spawn])
        }
    }
}

/// Handle a child exit.
///
/// The process handle is released and the state returns to `Idle`, unless
/// the halt policy turns a failing exit into a terminal shutdown.
pub fn on_exit(
    state: &mut RunState,
    policy: &SupervisionPolicy,
    report: ExitReport,
) -> CoreStep {
    if *state == RunState::Idle {
        debug!(?report, "exit report with no running child; ignoring");
        return CoreStep::proceed(Vec::new());
    }

    *state = RunState::Idle;
    let mut commands = vec![CoreCommand::ReleaseProcess];

    if report.success() {
        if policy.verbose {
            info!(
                exit_code = ?report.code,
                signal = ?report.signal,
                "command exited"
            );
        }
        return CoreStep::proceed(commands);
    }

    warn!(
        exit_code = ?report.code,
        signal = ?report.signal,
        "command failed"
    );

    if policy.halt {
        error!("halting after failed command");
        commands.push(CoreCommand::Shutdown(Termination::Halted(report)));
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    CoreStep::proceed(commands)
}

/// Handle a synchronous spawn failure. Always terminal.
pub fn on_spawn_failure(state: &mut RunState, error: &str) -> CoreStep {
    error!(%error, "failed to spawn command");
    *state = RunState::Idle;
    CoreStep::terminate(Termination::SpawnFailed)
}
