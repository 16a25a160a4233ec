// src/watch/watcher.rs

use std::time::Duration;

use notify::{Config, Event, PollWatcher, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::types::WatchTarget;
use crate::watch::event::translate;
use crate::watch::filter::IgnoreFilter;

/// How the watcher observes the filesystem.
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    /// Poll at this interval instead of using native notifications.
    pub poll_interval: Option<Duration>,
    /// Changes to drop before they reach the runtime.
    pub ignore: IgnoreFilter,
}

/// Handle for the filesystem watcher.
///
/// Owns the underlying `notify` watcher and the task forwarding its events
/// to the runtime. Closing (or dropping) the handle stops both.
pub struct WatcherHandle {
    inner: Option<Box<dyn Watcher + Send>>,
    forwarder: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl WatcherHandle {
    /// Stop watching. Calling this again is a no-op.
    pub fn close(&mut self) {
        if let Some(watcher) = self.inner.take() {
            drop(watcher);
            debug!("file watcher closed");
        }
        if let Some(forwarder) = self.forwarder.take() {
            forwarder.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_none() && self.forwarder.is_none()
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Start watching `target` and send a `RuntimeEvent::Changed` for every
/// qualifying change.
///
/// - `options.poll_interval` selects the polling backend.
/// - `options.ignore` drops matching entries.
/// - `runtime_tx` is the channel into the main runtime.
pub fn spawn_watcher(
    target: &WatchTarget,
    options: WatchOptions,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatcherHandle> {
    target.ensure_exists()?;

    // Canonicalize once so event paths can be relativized.
    let root = target
        .path()
        .canonicalize()
        .unwrap_or_else(|_| target.path().to_path_buf());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    // Called synchronously on notify's own thread.
    let handler = move |res: notify::Result<Event>| match res {
        Ok(event) => {
            if event_tx.send(event).is_err() {
                debug!("watch event dropped; forwarder gone");
            }
        }
        Err(err) => {
            warn!(error = %err, "file watch error");
        }
    };

    let mut watcher: Box<dyn Watcher + Send> = match options.poll_interval {
        Some(interval) => Box::new(PollWatcher::new(
            handler,
            Config::default()
                .with_poll_interval(interval)
                .with_compare_contents(true),
        )?),
        None => Box::new(RecommendedWatcher::new(handler, Config::default())?),
    };

    let mode = if target.recursive() {
        RecursiveMode::Recursive
    } else {
        RecursiveMode::NonRecursive
    };
    watcher.watch(&root, mode)?;

    debug!(root = %root.display(), poll = ?options.poll_interval, "file watcher started");

    let ignore = options.ignore;
    let forwarder = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");

            for change in translate(&root, &event) {
                if ignore.is_ignored(change.entry.as_deref()) {
                    debug!(entry = ?change.entry, "change ignored by pattern");
                    continue;
                }
                if runtime_tx.send(RuntimeEvent::Changed(change)).await.is_err() {
                    debug!("runtime gone; watcher forwarder stopping");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        inner: Some(watcher),
        forwarder: Some(forwarder),
    })
}
