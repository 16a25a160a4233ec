// src/main.rs

use std::process::ExitCode;

use stalker::{cli, logging, run};

// Every event is handled on this one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::parse();

    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("stalker error: {err:?}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(termination) => ExitCode::from(termination.exit_code()),
        Err(err) => {
            eprintln!("stalker error: {err}");
            ExitCode::FAILURE
        }
    }
}
