//! `restler` command line entry point.
//!
//! Logging goes to stderr and is controlled by `RESTLER_LOG` (env_logger
//! filter syntax, default `info`). `RESTLER_LOG_LEVEL=DEBUG` or `--verbose`
//! forces debug output.

mod cli;

use clap::Parser;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    init_logging(cli.verbose);

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("[restler error]: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::new().filter_or("RESTLER_LOG", "info"));

    let debug_requested = std::env::var("RESTLER_LOG_LEVEL")
        .map(|level| level.trim().eq_ignore_ascii_case("debug"))
        .unwrap_or(false);
    if verbose || debug_requested {
        builder.filter_level(log::LevelFilter::Debug);
    }

    builder.init();
}
