//! Error types for request document loading.

use crate::models::HttpMethod;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading a request document.
///
/// Each variant names the document field involved so users can find the
/// problem in their request file.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The request file could not be read.
    #[error("Failed to read request file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The resolved document is not valid YAML/JSON or has the wrong shape.
    #[error("Invalid request document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A required field is absent or empty.
    #[error("Request {0} is required")]
    MissingField(&'static str),

    /// `Method` is not one of the supported methods.
    #[error("Invalid HTTP method '{0}'. Expected one of: GET, POST, PUT, DELETE, PATCH, OPTIONS, HEAD")]
    InvalidMethod(String),

    /// `Body` is absent for a method that needs one.
    #[error("Request Body is required for {0} requests (only GET, OPTIONS and DELETE may omit it)")]
    MissingBody(HttpMethod),

    /// A mapping field holds a value that cannot be used as a string.
    #[error("Invalid value for {field}.{key}: {reason}")]
    InvalidField {
        field: &'static str,
        key: String,
        reason: String,
    },
}
