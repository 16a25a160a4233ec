// src/exec/child.rs

//! Waits on a single child process.

use tokio::process::Child;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use crate::engine::{ExitReport, RuntimeEvent};

/// Wait for `child` to terminate and report it as `RuntimeEvent::Exited`.
///
/// If the cancel channel fires first, the child is killed and **no** exit
/// event is sent: the runtime is already shutting down.
pub async fn supervise_child(
    mut child: Child,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let pid = child.id();

    tokio::select! {
        status = child.wait() => {
            let report = match status {
                Ok(status) => ExitReport::from(status),
                Err(err) => {
                    error!(?pid, error = %err, "failed to wait for child");
                    ExitReport::unknown()
                }
            };

            debug!(?pid, ?report, "child exited");

            if runtime_tx.send(RuntimeEvent::Exited(report)).await.is_err() {
                debug!(?pid, "runtime gone; exit report dropped");
            }
        }

        cancel = &mut cancel_rx => {
            match cancel {
                Ok(()) => {
                    debug!(?pid, "killing running command");
                    if let Err(err) = child.kill().await {
                        warn!(?pid, error = %err, "failed to kill child");
                    }
                }
                Err(_) => {
                    // Sender dropped: kill_on_drop takes care of the child.
                    debug!(?pid, "cancel channel closed");
                }
            }
        }
    }
}
