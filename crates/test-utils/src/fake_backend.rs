use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use stalker::engine::{ExitReport, RuntimeEvent};
use stalker::errors::{Result, StalkerError};
use stalker::exec::ProcessBackend;
use stalker::types::CommandSpec;
use tokio::sync::mpsc;

/// What the fake does when asked to spawn.
#[derive(Debug, Clone, Copy)]
pub enum FakeBehaviour {
    /// Report this exit right after the spawn.
    ExitWith(ExitReport),
    /// Keep the "child" alive until the test sends an exit itself.
    Hold,
    /// Refuse every spawn, like a missing interpreter.
    FailSpawn,
}

#[derive(Debug, Default)]
struct Record {
    spawned: Vec<String>,
    live: bool,
    releases: usize,
    closes: usize,
}

/// Shared view of everything the fake backend was asked to do.
#[derive(Debug, Clone, Default)]
pub struct FakeLog {
    inner: Arc<Mutex<Record>>,
}

impl FakeLog {
    /// Commands spawned so far, in order.
    pub fn spawned(&self) -> Vec<String> {
        self.inner.lock().unwrap().spawned.clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.inner.lock().unwrap().spawned.len()
    }

    pub fn releases(&self) -> usize {
        self.inner.lock().unwrap().releases
    }

    /// Number of closes that actually had a live child to close.
    pub fn closes(&self) -> usize {
        self.inner.lock().unwrap().closes
    }

    pub fn is_live(&self) -> bool {
        self.inner.lock().unwrap().live
    }
}

/// A `ProcessBackend` that never starts a real process.
pub struct FakeBackend {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    behaviour: FakeBehaviour,
    log: FakeLog,
}

impl FakeBackend {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, behaviour: FakeBehaviour) -> Self {
        Self {
            runtime_tx,
            behaviour,
            log: FakeLog::default(),
        }
    }

    pub fn log(&self) -> FakeLog {
        self.log.clone()
    }
}

impl ProcessBackend for FakeBackend {
    fn spawn(&mut self, spec: &CommandSpec) -> Result<()> {
        if let FakeBehaviour::FailSpawn = self.behaviour {
            return Err(StalkerError::Spawn {
                command: spec.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "fake spawn failure"),
            });
        }

        {
            let mut record = self.log.inner.lock().unwrap();
            if record.live {
                return Err(StalkerError::AlreadyRunning);
            }
            record.spawned.push(spec.command().to_string());
            record.live = true;
        }

        if let FakeBehaviour::ExitWith(report) = self.behaviour {
            let tx = self.runtime_tx.clone();
            tokio::spawn(async move {
                let _ = tx.send(RuntimeEvent::Exited(report)).await;
            });
        }

        Ok(())
    }

    fn release(&mut self) {
        let mut record = self.log.inner.lock().unwrap();
        record.live = false;
        record.releases += 1;
    }

    fn close(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let log = self.log.clone();
        Box::pin(async move {
            let mut record = log.inner.lock().unwrap();
            if record.live {
                record.live = false;
                record.closes += 1;
            }
        })
    }
}
