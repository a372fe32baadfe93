//! Shared helpers for integration tests.

pub mod chaining_test;
pub mod executor_test;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

/// Routes library logging through the test harness (run once).
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Writes a request document into `dir`.
pub fn write_request(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write request file");
    path
}

/// Writes a `.env` backing file into `dir`.
pub fn write_env(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join(".env");
    fs::write(&path, content).expect("Failed to write env file");
    path
}
