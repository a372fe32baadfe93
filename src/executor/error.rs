//! HTTP request execution error types.
//!
//! Every variant is fatal to the single request being executed. There is no
//! retry; the error is surfaced to the caller as is.

use thiserror::Error;

/// Errors that can occur during HTTP request execution.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The proxy URL (ambient or `R-Proxy-Url`) could not be used.
    #[error("Proxy configuration error: {0}")]
    ProxyConfiguration(String),

    /// Connection failures, DNS errors and other transport-level problems.
    #[error("Network error: {0}")]
    Network(String),

    /// The transport timeout elapsed before a complete response arrived.
    #[error("Request timed out")]
    Timeout,

    /// The request URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The wire request could not be built (bad header name or value,
    /// unserializable body).
    #[error("Request build error: {0}")]
    Build(String),

    /// The response body could not be decoded.
    #[error("Response decode error: {0}")]
    Decode(String),
}

/// Maps reqwest's error kinds to our variants.
impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RequestError::Timeout
        } else if err.is_builder() {
            RequestError::Build(err.to_string())
        } else if err.is_connect() {
            RequestError::Network(format!("Connection failed: {}", err))
        } else {
            RequestError::Network(err.to_string())
        }
    }
}

impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        RequestError::InvalidUrl(err.to_string())
    }
}
