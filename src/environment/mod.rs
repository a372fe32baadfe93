//! Environment store shared by chained requests.
//!
//! An [`Environment`] is an ordered `KEY=value` mapping loaded once from a
//! backing file, read many times while request documents are resolved, and
//! updated by the capture engine after a request that declares capture rules.
//! Updates are written back with [`Environment::persist`], which rewrites only
//! the affected lines of the backing file.
//!
//! # Example
//!
//! ```no_run
//! use restler::environment::Environment;
//! use std::path::Path;
//!
//! let mut env = Environment::load(Path::new(".env")).unwrap();
//! env.set("TOKEN", "abc123");
//! if let Some(host) = env.get("HOST") {
//!     println!("host: {}", host);
//! }
//! ```

pub mod loader;

pub use loader::{resolve_env_path, EnvError};

use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Process-lifetime key/value store with an optional backing file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    /// Variables in backing-file order.
    variables: IndexMap<String, String>,

    /// Where updates are persisted; `None` for purely in-memory stores.
    path: Option<PathBuf>,
}

impl Environment {
    /// Creates an in-memory environment from existing variables.
    pub fn with_variables(variables: IndexMap<String, String>) -> Self {
        Self {
            variables,
            path: None,
        }
    }

    /// Loads the environment backed by `path`.
    ///
    /// A missing file yields an empty environment that will create the file
    /// on first persist.
    pub fn load(path: &Path) -> Result<Self, EnvError> {
        let variables = loader::read_env_file(path)?;
        log::debug!(
            "loaded {} environment variables from {}",
            variables.len(),
            path.display()
        );
        Ok(Self {
            variables,
            path: Some(path.to_path_buf()),
        })
    }

    /// The backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Sets a variable in memory only.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.variables
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replaces the in-memory contents with `variables`.
    ///
    /// Keys already present keep their position; new keys are appended.
    pub fn replace_all(&mut self, variables: IndexMap<String, String>) {
        self.variables.retain(|key, _| variables.contains_key(key));
        for (key, value) in variables {
            self.variables.insert(key, value);
        }
    }

    /// Writes `updates` to the backing file.
    ///
    /// Lines of updated keys are replaced in place, new keys are appended and
    /// all other lines are preserved. The in-memory mapping is not touched.
    pub fn persist(&self, updates: &IndexMap<String, String>) -> Result<(), EnvError> {
        let path = self.path.as_deref().ok_or(EnvError::NoBackingFile)?;
        loader::write_env_updates(path, updates)?;
        log::debug!(
            "persisted {} environment updates to {}",
            updates.len(),
            path.display()
        );
        Ok(())
    }
}
