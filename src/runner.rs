//! Run orchestration.
//!
//! A [`Runner`] owns everything one invocation needs: configuration, the
//! ambient proxy and the environment store. Request files are executed
//! strictly one after another so that each request sees the captures of the
//! ones before it.

use crate::chain::{self, CaptureOutcome, CaptureState};
use crate::config::{ConfigError, RestlerConfig};
use crate::environment::{resolve_env_path, EnvError, Environment};
use crate::executor::{execute_request, ExecutionConfig, ProxySettings, RequestError};
use crate::formatter::{format_report, report_file_name};
use crate::models::{RequestDefinition, ResponseView};
use crate::parser::{load_request, ParseError, ParseOptions};
use chrono::Local;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that stop a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error("{}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Request '{name}' failed: {source}")]
    Request {
        name: String,
        #[source]
        source: RequestError,
    },

    #[error("Failed to write report {}: {source}", .path.display())]
    Report {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of running one request file.
#[derive(Debug)]
pub struct RunOutcome {
    /// The resolved request that was sent.
    pub request: RequestDefinition,

    pub response: ResponseView,

    /// Capture result, present when the request declares `After.Env` rules.
    pub capture: Option<CaptureOutcome>,

    /// Where the markdown report was written, if reports are enabled.
    pub report_path: Option<PathBuf>,
}

/// Executes request files against one environment.
#[derive(Debug)]
pub struct Runner {
    config: RestlerConfig,
    proxy: ProxySettings,
    env: Environment,
    write_reports: bool,
}

impl Runner {
    pub fn new(config: RestlerConfig, proxy: ProxySettings, env: Environment) -> Self {
        Self {
            config,
            proxy,
            env,
            write_reports: true,
        }
    }

    /// Sets up a runner for the project in `dir`: picks and loads the
    /// environment backing file and reads the ambient proxy.
    pub fn for_project(dir: &Path, config: RestlerConfig) -> Result<Self, RunError> {
        config.validate()?;
        let env_path = resolve_env_path(dir, config.env.as_deref(), config.env_path.as_deref());
        log::debug!("using environment file {}", env_path.display());
        let env = Environment::load(&env_path)?;
        Ok(Self::new(config, ProxySettings::from_env(), env))
    }

    /// Enables or disables writing markdown reports.
    pub fn with_reports(mut self, enabled: bool) -> Self {
        self.write_reports = enabled;
        self
    }

    pub fn config(&self) -> &RestlerConfig {
        &self.config
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Loads, executes and captures one request file, then writes its report.
    pub async fn run_file(&mut self, path: &Path) -> Result<RunOutcome, RunError> {
        let options = ParseOptions {
            require_body: self.config.require_body,
        };
        let request = load_request(path, &self.env, options).map_err(|source| RunError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let exec_config = ExecutionConfig::from_config(&self.config);
        let response = execute_request(&request, &exec_config, &self.proxy)
            .await
            .map_err(|source| RunError::Request {
                name: request.name.clone(),
                source,
            })?;

        let capture = match CaptureState::for_request(&request) {
            CaptureState::Idle => None,
            CaptureState::Capturing => Some(chain::apply(&request, &response, &mut self.env)),
        };

        let report_path = if self.write_reports {
            Some(self.write_report(path, &request, &response)?)
        } else {
            None
        };

        Ok(RunOutcome {
            request,
            response,
            capture,
            report_path,
        })
    }

    /// Runs `paths` in order, stopping at the first error.
    pub async fn run_files(&mut self, paths: &[PathBuf]) -> Result<Vec<RunOutcome>, RunError> {
        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            outcomes.push(self.run_file(path).await?);
        }
        Ok(outcomes)
    }

    fn write_report(
        &self,
        request_path: &Path,
        request: &RequestDefinition,
        response: &ResponseView,
    ) -> Result<PathBuf, RunError> {
        let dir = match &self.config.report_dir {
            Some(dir) => dir.clone(),
            None => request_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        let path = dir.join(report_file_name(request_path, request.method, Local::now()));

        fs::write(&path, format_report(request, response)).map_err(|source| RunError::Report {
            path: path.clone(),
            source,
        })?;
        log::info!("report written to {}", path.display());
        Ok(path)
    }
}
