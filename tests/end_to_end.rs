// tests/end_to_end.rs
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, within, STEP_TIMEOUT};

use std::error::Error;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use tempfile::tempdir;
use tokio::sync::mpsc;
use tokio::time::sleep;

use stalker::engine::{Runtime, RuntimeEvent, Supervisor, Termination};
use stalker::exec::{ProcessBackend, RealProcessBackend};
use stalker::types::{CommandSpec, SupervisionPolicy, WatchTarget};
use stalker::watch::{spawn_watcher, IgnoreFilter, WatchOptions};

type TestResult = Result<(), Box<dyn Error>>;

fn append(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

fn line_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

#[tokio::test]
async fn one_modification_runs_the_command_once() -> TestResult {
    init_tracing();
    let watched = tempdir()?;
    let out = tempdir()?;
    let file = watched.path().join("watched");
    let log = out.path().join("log");
    append(&file, "start")?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let backend = RealProcessBackend::new(rt_tx.clone(), false);
    let watcher = spawn_watcher(
        &WatchTarget::new(watched.path()),
        WatchOptions {
            poll_interval: Some(Duration::from_millis(50)),
            ignore: IgnoreFilter::default(),
        },
        rt_tx.clone(),
    )?;

    let command = CommandSpec::new(format!("echo hi >> '{}'", log.display()));
    let runtime = Runtime::new(
        Supervisor::new(SupervisionPolicy::default()),
        command,
        rt_rx,
        backend,
    )
    .with_watcher(watcher);
    let handle = tokio::spawn(runtime.run());

    sleep(Duration::from_millis(200)).await;
    append(&file, "touch")?;

    within(STEP_TIMEOUT, async {
        while line_count(&log) == 0 {
            sleep(Duration::from_millis(20)).await;
        }
    })
    .await;

    // Give any stray duplicate a chance to show up.
    sleep(Duration::from_millis(300)).await;

    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;
    let termination = within(STEP_TIMEOUT, handle).await?;

    assert_eq!(termination, Termination::Interrupted);
    assert_eq!(std::fs::read_to_string(&log)?, "hi\n");
    Ok(())
}

#[tokio::test]
async fn failing_command_with_halt_stops_the_watcher() -> TestResult {
    init_tracing();
    let watched = tempdir()?;
    let file = watched.path().join("watched");
    append(&file, "start")?;

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let backend = RealProcessBackend::new(rt_tx.clone(), true);
    let watcher = spawn_watcher(
        &WatchTarget::new(watched.path()),
        WatchOptions {
            poll_interval: Some(Duration::from_millis(50)),
            ignore: IgnoreFilter::default(),
        },
        rt_tx.clone(),
    )?;

    let policy = SupervisionPolicy {
        halt: true,
        ..SupervisionPolicy::default()
    };
    let runtime = Runtime::new(
        Supervisor::new(policy),
        CommandSpec::new("exit 1"),
        rt_rx,
        backend,
    )
    .with_watcher(watcher);
    let handle = tokio::spawn(runtime.run());

    sleep(Duration::from_millis(200)).await;
    append(&file, "touch")?;

    let termination = within(STEP_TIMEOUT, handle).await?;
    assert!(matches!(termination, Termination::Halted(report) if report.code == Some(1)));
    assert_eq!(termination.exit_code(), 1);
    Ok(())
}

#[tokio::test]
async fn shutdown_completes_with_an_exit_report_stuck_on_a_full_queue() -> TestResult {
    init_tracing();
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(1);
    let mut backend = RealProcessBackend::new(rt_tx.clone(), true);

    backend.spawn(&CommandSpec::new("true"))?;
    rt_tx.send(RuntimeEvent::ShutdownRequested).await?;

    // The child is gone and its exit report waits for queue space.
    sleep(Duration::from_millis(300)).await;
    assert!(backend.has_child());

    let mut runtime = Runtime::new(
        Supervisor::new(SupervisionPolicy::default()),
        CommandSpec::new("true"),
        rt_rx,
        backend,
    );
    within(STEP_TIMEOUT, runtime.shutdown()).await;
    Ok(())
}
