// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Wiring up a cross-platform filesystem watcher (`notify`), natively or
//!   by polling.
//! - Translating raw notifications into [`ChangeEvent`](crate::engine::ChangeEvent)s.
//! - Dropping changes that match `--ignore` globs.
//!
//! It does **not** know whether the command is running; it only turns
//! filesystem changes into runtime events.

pub mod event;
pub mod filter;
pub mod watcher;

pub use event::{classify, entry_name, translate};
pub use filter::IgnoreFilter;
pub use watcher::{spawn_watcher, WatchOptions, WatcherHandle};
