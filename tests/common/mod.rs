#![allow(dead_code)]

pub use stalker_test_utils::{init_tracing, within, STEP_TIMEOUT};

use stalker::engine::{ChangeEvent, ChangeKind, ExitReport, RuntimeEvent};

/// A content change to `entry`.
pub fn change(entry: &str) -> RuntimeEvent {
    RuntimeEvent::Changed(ChangeEvent::new(
        ChangeKind::Changed,
        Some(entry.to_string()),
    ))
}

/// A child exit with `code`.
pub fn exit(code: i32) -> RuntimeEvent {
    RuntimeEvent::Exited(ExitReport::exited(code))
}
