//! HTTP request execution configuration.

use crate::config::RestlerConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters that control how requests are executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Transport timeout in seconds, covering connect, headers and body.
    pub timeout_secs: u64,
}

impl ExecutionConfig {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    /// Takes the execution settings out of a project configuration.
    pub fn from_config(config: &RestlerConfig) -> Self {
        Self {
            timeout_secs: config.timeout_secs,
        }
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self::from_config(&RestlerConfig::default())
    }
}
