//! Command line definition and command handlers.

use clap::{Args, Parser, Subcommand};
use restler::config::{load_config, RestlerConfig, CONFIG_FILE_NAME};
use restler::environment::{resolve_env_path, Environment};
use restler::runner::{RunError, RunOutcome, Runner};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "restler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run REST requests described in YAML files and chain their results", long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute request files in order
    Run {
        /// Request files (YAML or JSON)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        project: ProjectArgs,

        /// Do not write markdown response reports
        #[arg(long)]
        no_report: bool,
    },

    /// Show the environment file in use and its variables
    Env {
        #[command(flatten)]
        project: ProjectArgs,
    },
}

/// Project and environment selection shared by all commands.
#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project directory holding config.yaml and the .env files
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,

    /// Environment name; uses .env.<NAME>
    #[arg(short, long, env = "RESTLER_ENV")]
    pub env: Option<String>,

    /// Explicit environment file
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Configuration file (default: <dir>/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ProjectArgs {
    fn load_config(&self) -> Result<RestlerConfig, RunError> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| self.dir.join(CONFIG_FILE_NAME));
        let config = load_config(&path)?;
        Ok(config.with_overrides(self.env.clone(), self.env_file.clone()))
    }
}

pub async fn run(cli: Cli) -> Result<(), RunError> {
    match cli.command {
        Command::Run {
            files,
            project,
            no_report,
        } => {
            let config = project.load_config()?;
            let mut runner = Runner::for_project(&project.dir, config)?.with_reports(!no_report);
            for path in &files {
                let outcome = runner.run_file(path).await?;
                print_outcome(&outcome);
            }
            Ok(())
        }
        Command::Env { project } => {
            let config = project.load_config()?;
            let path = resolve_env_path(
                &project.dir,
                config.env.as_deref(),
                config.env_path.as_deref(),
            );
            let env = Environment::load(&path)?;
            println!("# {}", path.display());
            for (key, value) in env.iter() {
                println!("{}={}", key, value);
            }
            Ok(())
        }
    }
}

fn print_outcome(outcome: &RunOutcome) {
    let response = &outcome.response;
    println!(
        "{} {} -> {} {} ({} ms)",
        outcome.request.method,
        response.url,
        response.status_code,
        response.status_text,
        response.duration.as_millis()
    );

    if let Some(capture) = &outcome.capture {
        for (key, value) in &capture.captured {
            println!("  {}={}", key, value);
        }
    }
    if let Some(path) = &outcome.report_path {
        println!("  report: {}", path.display());
    }
}
