//! Backing file handling for the environment store.
//!
//! The backing file is plain text with one `KEY=value` pair per line. Reading
//! is lenient: blank lines and `#` comments are skipped, an optional `export `
//! prefix is accepted, and matching surrounding quotes are stripped from
//! values. Rewriting touches only the lines of keys being updated; every
//! other line is written back byte for byte and in its original position.

use indexmap::IndexMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while reading or writing the backing file.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The backing file exists but could not be read.
    #[error("Failed to read environment file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backing file could not be created or written.
    #[error("Failed to write environment file {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The store was built in memory and has nowhere to persist to.
    #[error("Environment has no backing file")]
    NoBackingFile,
}

/// Backing file names tried when neither an explicit path nor a named
/// environment is configured, in order of preference.
const DEFAULT_ENV_FILES: &[&str] = &[".env.local", ".env"];

/// Picks the backing file for a project directory.
///
/// Precedence: an explicit `env_path`, then `.env.<env_name>`, then the first
/// of `.env.local` / `.env` that exists. When nothing exists yet the result is
/// `<dir>/.env`, which is created on first persist.
pub fn resolve_env_path(dir: &Path, env_name: Option<&str>, env_path: Option<&Path>) -> PathBuf {
    if let Some(path) = env_path {
        return if path.is_absolute() {
            path.to_path_buf()
        } else {
            dir.join(path)
        };
    }

    if let Some(name) = env_name.filter(|n| !n.is_empty()) {
        return dir.join(format!(".env.{}", name));
    }

    DEFAULT_ENV_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| dir.join(".env"))
}

/// Reads a backing file. A file that does not exist yet reads as empty.
pub fn read_env_file(path: &Path) -> Result<IndexMap<String, String>, EnvError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(parse_env_content(&content)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("environment file {} not found, starting empty", path.display());
            Ok(IndexMap::new())
        }
        Err(source) => Err(EnvError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Parses `KEY=value` lines. Later duplicates win.
pub fn parse_env_content(content: &str) -> IndexMap<String, String> {
    let mut vars = IndexMap::new();

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match split_assignment(trimmed) {
            Some((key, value)) => {
                vars.insert(key.to_string(), unquote(value.trim()).to_string());
            }
            None => {
                log::warn!("Skipping invalid environment line {}: {}", line_num + 1, line);
            }
        }
    }

    vars
}

/// Rewrites backing file content with `updates` applied.
///
/// Each line whose key is in `updates` is replaced in place by `KEY=value`
/// and keeps its original line ending. Keys that matched no line are appended
/// at the end in `updates` order, using the file's line ending. All other
/// lines are kept byte for byte. Values are flattened to a single line.
pub fn rewrite_env_content(content: &str, updates: &IndexMap<String, String>) -> String {
    let newline = if content.contains("\r\n") { "\r\n" } else { "\n" };
    let mut matched = vec![false; updates.len()];
    let mut out = String::with_capacity(content.len());

    for chunk in content.split_inclusive('\n') {
        let line = chunk.trim_end_matches(['\r', '\n']);
        let ending = &chunk[line.len()..];

        match line_key(line).and_then(|key| updates.get_full(key)) {
            Some((idx, key, value)) => {
                matched[idx] = true;
                out.push_str(&assignment(key, value));
            }
            None => out.push_str(line),
        }
        out.push_str(if ending.is_empty() { newline } else { ending });
    }

    for (idx, (key, value)) in updates.iter().enumerate() {
        if !matched[idx] {
            out.push_str(&assignment(key, value));
            out.push_str(newline);
        }
    }

    out
}

/// Formats one `KEY=value` line. Line breaks inside the value are escaped as
/// `\n` / `\r` so the assignment never spills onto another line.
fn assignment(key: &str, value: &str) -> String {
    if value.contains(['\r', '\n']) {
        log::warn!("value for {} contains line breaks, writing them escaped", key);
        let escaped = value.replace('\r', "\\r").replace('\n', "\\n");
        format!("{}={}", key, escaped)
    } else {
        format!("{}={}", key, value)
    }
}

/// Applies `updates` to the file at `path`, creating it when missing.
pub fn write_env_updates(path: &Path, updates: &IndexMap<String, String>) -> Result<(), EnvError> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => String::new(),
        Err(source) => {
            return Err(EnvError::Persist {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let rewritten = rewrite_env_content(&existing, updates);
    fs::write(path, rewritten).map_err(|source| EnvError::Persist {
        path: path.to_path_buf(),
        source,
    })
}

/// The key of an assignment line, or `None` for blanks, comments and junk.
fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    split_assignment(trimmed).map(|(key, _)| key)
}

fn split_assignment(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && ((bytes[0] == b'"' && bytes[bytes.len() - 1] == b'"')
            || (bytes[0] == b'\'' && bytes[bytes.len() - 1] == b'\''))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
