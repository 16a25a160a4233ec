// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::errors::{Result, StalkerError};
use crate::types::{CommandSpec, SupervisionPolicy, WatchTarget, DEFAULT_SHELL};
use crate::watch::{IgnoreFilter, WatchOptions};

/// Exit status for usage errors, `--help` and `--version`.
pub const USAGE_EXIT_CODE: i32 = 1;

/// Command-line arguments for `stalker`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "stalker",
    version,
    about = "Re-run a shell command whenever a watched path changes.",
    long_about = None
)]
pub struct CliArgs {
    /// Shell command to run on every change (run as `sh -c <COMMAND>`).
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// File or directory to watch, recursively.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Terminate the watcher if COMMAND exits non-zero.
    #[arg(short = 'x', long)]
    pub halt: bool,

    /// Suppress COMMAND's standard output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Log watch, spawn and exit events to stderr.
    #[arg(short, long)]
    pub verbose: bool,

    /// Ignore changes whose path (relative to PATH) matches this glob.
    /// May be given several times.
    #[arg(short = 'i', long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Poll the filesystem every MS milliseconds instead of using native
    /// change notifications.
    #[arg(long, value_name = "MS", value_parser = clap::value_parser!(u64).range(1..))]
    pub poll: Option<u64>,

    /// Interpreter used to run COMMAND.
    #[arg(long, value_name = "SHELL", default_value = DEFAULT_SHELL)]
    pub shell: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `STALKER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Validated inputs for the supervisor.
#[derive(Debug, Clone)]
pub struct Settings {
    pub target: WatchTarget,
    pub command: CommandSpec,
    pub policy: SupervisionPolicy,
    pub watch: WatchOptions,
}

impl CliArgs {
    /// Turn parsed arguments into validated settings.
    pub fn settings(&self) -> Result<Settings> {
        if self.command.trim().is_empty() {
            return Err(StalkerError::Usage("<command> must not be empty".to_string()));
        }
        if self.shell.trim().is_empty() {
            return Err(StalkerError::Usage("--shell must not be empty".to_string()));
        }

        let ignore = IgnoreFilter::new(&self.ignore)?;

        Ok(Settings {
            target: WatchTarget::new(&self.path),
            command: CommandSpec::with_shell(&self.shell, &self.command),
            policy: SupervisionPolicy {
                quiet: self.quiet,
                verbose: self.verbose,
                halt: self.halt,
            },
            watch: WatchOptions {
                poll_interval: self.poll.map(Duration::from_millis),
                ignore,
            },
        })
    }
}

/// Parse the process arguments.
///
/// Help, version and every parse error exit with [`USAGE_EXIT_CODE`].
pub fn parse() -> CliArgs {
    match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // Help and version go to stdout, real errors to stderr.
            let _ = err.print();
            std::process::exit(USAGE_EXIT_CODE);
        }
    }
}
