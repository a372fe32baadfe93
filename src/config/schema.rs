//! Configuration schema.
//!
//! Mirrors the keys of a project's `config.yaml`:
//!
//! ```yaml
//! Env: dev                # backing file becomes .env.dev
//! EnvPath: ./secrets.env  # explicit backing file, wins over Env
//! TimeoutSecs: 30
//! RequireBody: true
//! ReportDir: ./reports
//! ```

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project configuration for a request run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestlerConfig {
    /// Named environment; selects `.env.<Env>` as the backing file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,

    /// Explicit backing file, relative to the project directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env_path: Option<PathBuf>,

    /// Transport timeout in seconds. Must be greater than 0.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Require a `Body` for methods other than GET, OPTIONS and DELETE.
    #[serde(default = "default_require_body")]
    pub require_body: bool,

    /// Directory for markdown reports; defaults to the request file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<PathBuf>,
}

impl Default for RestlerConfig {
    fn default() -> Self {
        Self {
            env: None,
            env_path: None,
            timeout_secs: default_timeout_secs(),
            require_body: default_require_body(),
            report_dir: None,
        }
    }
}

impl RestlerConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "TimeoutSecs must be greater than 0".to_string(),
            ));
        }

        if matches!(self.env.as_deref(), Some(name) if name.contains(['/', '\\'])) {
            return Err(ConfigError::Invalid(
                "Env must be a plain environment name".to_string(),
            ));
        }

        Ok(())
    }

    /// Applies command-line selections on top of the file configuration.
    ///
    /// An explicit env file clears a configured `EnvPath`; choosing an
    /// environment name clears both so that `.env.<name>` is used.
    pub fn with_overrides(mut self, env: Option<String>, env_path: Option<PathBuf>) -> Self {
        if let Some(name) = env {
            self.env = Some(name);
            self.env_path = None;
        }
        if let Some(path) = env_path {
            self.env_path = Some(path);
        }
        self
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_require_body() -> bool {
    true
}
