// tests/supervisor_core.rs

mod common;
use crate::common::{change, exit, init_tracing};

use std::io;
use std::sync::{Arc, Mutex};

use stalker::engine::{
    CoreCommand, ExitReport, RunState, RuntimeEvent, Supervisor, Termination,
};
use stalker::types::SupervisionPolicy;

fn policy(halt: bool) -> SupervisionPolicy {
    SupervisionPolicy {
        quiet: false,
        verbose: true,
        halt,
    }
}

#[test]
fn idle_change_spawns_and_moves_to_running() {
    init_tracing();
    let mut sup = Supervisor::new(policy(false));
    assert_eq!(sup.state(), RunState::Idle);

    let step = sup.step(change("src/main.rs"));

    assert_eq!(step.commands, vec![CoreCommand::Spawn]);
    assert!(step.keep_running);
    assert_eq!(sup.state(), RunState::Running);
}

#[test]
fn change_while_running_is_dropped_by_overlap_guard() {
    init_tracing();
    let mut sup = Supervisor::new(policy(false));
    sup.step(change("a"));

    for entry in ["a", "b", "c"] {
        let step = sup.step(change(entry));
        assert!(step.commands.is_empty(), "unexpected commands: {:?}", step.commands);
        assert!(step.keep_running);
        assert_eq!(sup.state(), RunState::Running);
    }
}

#[test]
fn successful_exit_releases_and_returns_to_idle() {
    init_tracing();
    let mut sup = Supervisor::new(policy(true));
    sup.step(change("a"));

    let step = sup.step(exit(0));

    assert_eq!(step.commands, vec![CoreCommand::ReleaseProcess]);
    assert!(step.keep_running);
    assert!(sup.is_idle());
    assert_eq!(sup.termination(), None);
}

#[test]
fn failing_exit_without_halt_keeps_watching() {
    init_tracing();
    let mut sup = Supervisor::new(policy(false));
    sup.step(change("a"));

    let step = sup.step(exit(2));
    assert_eq!(step.commands, vec![CoreCommand::ReleaseProcess]);
    assert!(step.keep_running);
    assert!(sup.is_idle());

    // The next change starts a fresh child.
    let step = sup.step(change("a"));
    assert_eq!(step.commands, vec![CoreCommand::Spawn]);
}

#[test]
fn failing_exit_with_halt_is_terminal() {
    init_tracing();
    let mut sup = Supervisor::new(policy(true));
    sup.step(change("a"));

    let step = sup.step(exit(1));

    let report = ExitReport::exited(1);
    assert_eq!(
        step.commands,
        vec![
            CoreCommand::ReleaseProcess,
            CoreCommand::Shutdown(Termination::Halted(report)),
        ]
    );
    assert!(!step.keep_running);
    assert_eq!(sup.termination(), Some(Termination::Halted(report)));
    assert_eq!(Termination::Halted(report).exit_code(), 1);
}

#[test]
fn halt_exit_status_is_one_even_for_other_codes() {
    let mut sup = Supervisor::new(policy(true));
    sup.step(change("a"));
    sup.step(exit(42));

    let termination = sup.termination().expect("should be terminated");
    assert_eq!(termination.exit_code(), 1);
}

#[test]
fn signal_death_counts_as_failure() {
    init_tracing();
    let mut sup = Supervisor::new(policy(true));
    sup.step(change("a"));

    let step = sup.step(RuntimeEvent::Exited(ExitReport::signalled(9)));

    assert!(!step.keep_running);
    assert_eq!(
        step.termination(),
        Some(Termination::Halted(ExitReport::signalled(9)))
    );
}

#[test]
fn no_events_are_processed_after_halt() {
    init_tracing();
    let mut sup = Supervisor::new(policy(true));
    sup.step(change("a"));
    sup.step(exit(1));

    for event in [change("a"), exit(0), RuntimeEvent::ShutdownRequested] {
        let step = sup.step(event);
        assert!(step.commands.is_empty());
        assert!(!step.keep_running);
    }
    assert!(matches!(sup.termination(), Some(Termination::Halted(_))));
}

#[test]
fn spawn_failure_is_terminal_with_status_one() {
    init_tracing();
    let mut sup = Supervisor::new(policy(false));
    sup.step(change("a"));

    let step = sup.step(RuntimeEvent::SpawnFailed {
        error: "No such file or directory".to_string(),
    });

    assert_eq!(
        step.commands,
        vec![CoreCommand::Shutdown(Termination::SpawnFailed)]
    );
    assert!(!step.keep_running);
    assert_eq!(sup.termination().map(|t| t.exit_code()), Some(1));
}

#[test]
fn shutdown_request_exits_cleanly() {
    let mut sup = Supervisor::new(policy(true));
    sup.step(change("a"));

    let step = sup.step(RuntimeEvent::ShutdownRequested);

    assert_eq!(step.termination(), Some(Termination::Interrupted));
    assert_eq!(Termination::Interrupted.exit_code(), 0);
}

#[test]
fn exit_without_running_child_is_ignored() {
    let mut sup = Supervisor::new(policy(true));

    let step = sup.step(exit(1));

    assert!(step.commands.is_empty());
    assert!(step.keep_running);
    assert_eq!(sup.termination(), None);
}

#[test]
fn verbosity_does_not_change_decisions() {
    let events = || vec![change("a"), change("b"), exit(3), change("c"), exit(0)];

    let mut quiet_log = Supervisor::new(SupervisionPolicy::default());
    let mut loud_log = Supervisor::new(SupervisionPolicy {
        verbose: true,
        ..SupervisionPolicy::default()
    });

    for (a, b) in events().into_iter().zip(events()) {
        assert_eq!(quiet_log.step(a), loud_log.step(b));
    }
    assert_eq!(quiet_log.state(), loud_log.state());
}

/// In-memory log sink for asserting on formatted fields.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[test]
fn verbose_success_line_carries_code_and_signal() {
    let sink = Captured::default();
    let writer = sink.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut sup = Supervisor::new(policy(false));
        sup.step(change("a"));
        sup.step(exit(0));
    });

    let line = sink
        .text()
        .lines()
        .find(|l| l.contains("command exited"))
        .map(str::to_owned)
        .unwrap_or_else(|| panic!("no exit line in {:?}", sink.text()));
    assert!(line.contains("exit_code=Some(0)"), "line: {line}");
    assert!(line.contains("signal=None"), "line: {line}");
}
