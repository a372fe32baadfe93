//! Capture expression parsing.
//!
//! A capture rule in a request document maps an environment key to a source
//! expression that says where the value comes from in the response:
//!
//! ```text
//! After:
//!   Env:
//!     TOKEN: Body[access_token]
//!     USER_ID: Body[data][items][0][id]
//!     SESSION: Header[X-Session-Id]
//! ```
//!
//! An expression is a `Body` or `Header` prefix followed by one or more
//! bracketed segments. Segments stay raw strings here; whether a segment is
//! a map key or an array index is decided by the walker against the actual
//! response shape.

use std::fmt;
use thiserror::Error;

/// Errors produced while parsing a capture expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// The expression does not start with `Body` or `Header`, or the text
    /// after the prefix is not a run of `[segment]` groups.
    #[error("Invalid capture expression '{0}': expected Body[...] or Header[...]")]
    InvalidCaptureExpression(String),

    /// The expression is a bare prefix with nothing to walk.
    #[error("Capture expression '{0}' has no path segments")]
    EmptyPath(String),
}

/// Where a captured value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// The decoded JSON response body.
    Body,
    /// The canonical response header view.
    Header,
}

impl SourceKind {
    /// The literal prefix used in expressions.
    pub fn prefix(&self) -> &'static str {
        match self {
            SourceKind::Body => "Body",
            SourceKind::Header => "Header",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A parsed capture expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureExpression {
    /// Response part the path is walked against.
    pub source: SourceKind,

    /// Raw segments in order, outermost first. Never empty.
    pub path: Vec<String>,
}

impl fmt::Display for CaptureExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source.prefix())?;
        for segment in &self.path {
            write!(f, "[{}]", segment)?;
        }
        Ok(())
    }
}

/// A named capture rule: the environment key and where its value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRule {
    pub env_key: String,
    pub expression: CaptureExpression,
}

/// Parses a source expression such as `Body[data][items][0][id]`.
///
/// # Examples
///
/// ```
/// use restler::variables::capture::{parse_capture_expression, SourceKind};
///
/// let expr = parse_capture_expression("Body[data][items][0][id]").unwrap();
/// assert_eq!(expr.source, SourceKind::Body);
/// assert_eq!(expr.path, vec!["data", "items", "0", "id"]);
///
/// assert!(parse_capture_expression("Cookie[session]").is_err());
/// ```
pub fn parse_capture_expression(expr: &str) -> Result<CaptureExpression, CaptureError> {
    let trimmed = expr.trim();

    let (source, remainder) = if let Some(rest) = trimmed.strip_prefix("Body") {
        (SourceKind::Body, rest)
    } else if let Some(rest) = trimmed.strip_prefix("Header") {
        (SourceKind::Header, rest)
    } else {
        return Err(CaptureError::InvalidCaptureExpression(expr.to_string()));
    };

    if remainder.is_empty() {
        return Err(CaptureError::EmptyPath(expr.to_string()));
    }

    let path = split_segments(remainder)
        .ok_or_else(|| CaptureError::InvalidCaptureExpression(expr.to_string()))?;

    Ok(CaptureExpression { source, path })
}

/// Splits `[a][b][c]` into `["a", "b", "c"]`. Returns `None` when the text is
/// not made up entirely of bracketed groups.
fn split_segments(remainder: &str) -> Option<Vec<String>> {
    let mut segments = Vec::new();
    let mut rest = remainder;

    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        segments.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }

    Some(segments)
}
