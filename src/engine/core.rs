// src/engine/core.rs

//! Pure supervisor state machine.
//!
//! This module contains a synchronous, deterministic core that consumes
//! [`RuntimeEvent`]s and produces:
//! - an updated [`RunState`]
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for reading
//! events from the channel, talking to the process backend and closing
//! handles on shutdown. The core never touches Tokio, processes or the
//! filesystem.

use tracing::debug;

use crate::engine::event_handlers::{on_change, on_exit, on_spawn_failure, CoreStep};
use crate::engine::{RunState, RuntimeEvent, Termination};
use crate::types::SupervisionPolicy;

/// Owns the run state and the termination decision.
#[derive(Debug)]
pub struct Supervisor {
    policy: SupervisionPolicy,
    state: RunState,
    terminated: Option<Termination>,
}

impl Supervisor {
    pub fn new(policy: SupervisionPolicy) -> Self {
        Self {
            policy,
            state: RunState::Idle,
            terminated: None,
        }
    }

    pub fn policy(&self) -> &SupervisionPolicy {
        &self.policy
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RunState::Idle
    }

    /// Set once a terminal transition has happened.
    pub fn termination(&self) -> Option<Termination> {
        self.terminated
    }

    /// Handle a single runtime event.
    ///
    /// Once terminated, every further event is dropped.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        if self.terminated.is_some() {
            debug!(?event, "supervisor terminated; dropping event");
            return CoreStep {
                commands: Vec::new(),
                keep_running: false,
            };
        }

        let step = match event {
            RuntimeEvent::Changed(change) => on_change(&mut self.state, &self.policy, &change),
            RuntimeEvent::Exited(report) => on_exit(&mut self.state, &self.policy, report),
            RuntimeEvent::SpawnFailed { error } => on_spawn_failure(&mut self.state, &error),
            RuntimeEvent::ShutdownRequested => {
                debug!("shutdown requested");
                CoreStep::terminate(Termination::Interrupted)
            }
        };

        if let Some(termination) = step.termination() {
            self.terminated = Some(termination);
        }

        step
    }
}
