// src/types.rs

//! Immutable inputs handed to the supervisor at startup.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::{Result, StalkerError};

/// Interpreter used when none is given on the command line.
pub const DEFAULT_SHELL: &str = "sh";

/// Path being watched. Always watched recursively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTarget {
    path: PathBuf,
}

impl WatchTarget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Subdirectories are always included.
    pub fn recursive(&self) -> bool {
        true
    }

    /// Fail with a usage error when the path does not exist.
    pub fn ensure_exists(&self) -> Result<()> {
        if self.path.exists() {
            Ok(())
        } else {
            Err(StalkerError::Usage(format!(
                "watch path {} does not exist",
                self.path.display()
            )))
        }
    }
}

impl fmt::Display for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Shell invocation: `<shell> -c <command>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    shell: String,
    command: String,
}

impl CommandSpec {
    /// Run `command` through `sh -c`.
    pub fn new(command: impl Into<String>) -> Self {
        Self::with_shell(DEFAULT_SHELL, command)
    }

    pub fn with_shell(shell: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
            command: command.into(),
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Arguments passed to the interpreter.
    pub fn args(&self) -> [&str; 2] {
        ["-c", &self.command]
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -c {:?}", self.shell, self.command)
    }
}

/// Policy flags fixed at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SupervisionPolicy {
    /// Discard the child's stdout.
    pub quiet: bool,
    /// Log watch / spawn / exit events.
    pub verbose: bool,
    /// Stop the whole watcher when the child exits non-zero.
    pub halt: bool,
}
