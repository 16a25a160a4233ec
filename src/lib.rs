// src/lib.rs

pub mod cli;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;
pub mod watch;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::engine::{Runtime, RuntimeEvent, Supervisor, Termination};
use crate::errors::Result;
use crate::exec::RealProcessBackend;

/// Capacity of the runtime event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - argument validation
/// - the process backend
/// - the file watcher
/// - Ctrl-C / SIGTERM handling
/// - the supervisor runtime
///
/// Returns how the watcher stopped; the caller maps it to an exit status.
pub async fn run(args: CliArgs) -> Result<Termination> {
    let settings = args.settings()?;
    let policy = settings.policy;

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(EVENT_CHANNEL_CAPACITY);

    let backend = RealProcessBackend::new(rt_tx.clone(), policy.quiet);

    let watcher = watch::spawn_watcher(&settings.target, settings.watch, rt_tx.clone())?;
    if policy.verbose {
        info!(path = %settings.target, "watching");
    }

    spawn_signal_listener(rt_tx);

    let core = Supervisor::new(policy);
    let runtime = Runtime::new(core, settings.command, rt_rx, backend).with_watcher(watcher);
    Ok(runtime.run().await)
}

/// Forward Ctrl-C (and SIGTERM on unix) to the runtime as a shutdown
/// request.
fn spawn_signal_listener(tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        wait_for_termination_signal().await;
        debug!("termination signal received");
        let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
    });
}

async fn wait_for_termination_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
