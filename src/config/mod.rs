//! Configuration loading.
//!
//! Configuration lives in a `config.yaml` next to the request files. It is
//! loaded once per process and passed explicitly to the runner; there is no
//! global configuration state.

pub mod schema;

pub use schema::RestlerConfig;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name inside a project directory.
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Loads and validates configuration from `path`.
///
/// A missing file is not an error: defaults are returned.
///
/// # Example
///
/// ```no_run
/// use restler::config::load_config;
/// use std::path::Path;
///
/// let config = load_config(Path::new("config.yaml")).unwrap();
/// println!("timeout: {}s", config.timeout_secs);
/// ```
pub fn load_config(path: &Path) -> Result<RestlerConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("no config file at {}, using defaults", path.display());
            return Ok(RestlerConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config = parse_config(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Parses configuration text. An empty document yields defaults.
fn parse_config(content: &str) -> Result<RestlerConfig, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(RestlerConfig::default());
    }
    serde_yaml::from_str(content)
}
