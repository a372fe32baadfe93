//! Request document loader.
//!
//! Turns a YAML (or JSON) request document into a [`RequestDefinition`]:
//!
//! 1. `{{name}}` placeholders are substituted in the raw text, so values can
//!    land anywhere: URL, header values, body literals, even capture rules.
//! 2. The resolved text is deserialized.
//! 3. Required fields are validated.
//!
//! ```yaml
//! Name: login
//! URL: https://{{HOST}}/auth/token
//! Method: POST
//! Headers:
//!   Content-Type: application/json
//! Body:
//!   username: "{{USER}}"
//!   password: "{{PASSWORD}}"
//! Params:
//!   source: cli
//! After:
//!   Env:
//!     TOKEN: Body[access_token]
//! ```

pub mod error;

pub use error::ParseError;

use crate::models::{HttpMethod, RequestDefinition};
use crate::variables::substitution::{placeholder_names, substitute_variables, VariableSource};
use crate::variables::walker::stringify_value;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Validation switches for request documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Require `Body` for methods other than GET, OPTIONS and DELETE.
    pub require_body: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { require_body: true }
    }
}

/// Document shape before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "URL", default)]
    url: Option<String>,
    #[serde(default)]
    method: Option<String>,
    #[serde(default)]
    headers: Option<IndexMap<String, Value>>,
    #[serde(default)]
    body: Option<Value>,
    #[serde(default)]
    params: Option<IndexMap<String, Value>>,
    #[serde(default)]
    after: Option<RawAfter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawAfter {
    #[serde(default)]
    env: Option<IndexMap<String, String>>,
}

/// Reads, resolves and validates the request document at `path`.
pub fn load_request<S: VariableSource + ?Sized>(
    path: &Path,
    source: &S,
    options: ParseOptions,
) -> Result<RequestDefinition, ParseError> {
    let raw = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_request(&raw, source, options)
}

/// Resolves placeholders in `text` and parses the result.
///
/// # Examples
///
/// ```
/// use restler::parser::{parse_request, ParseOptions};
/// use std::collections::HashMap;
///
/// let mut vars = HashMap::new();
/// vars.insert("HOST".to_string(), "api.test".to_string());
///
/// let doc = "Name: ping\nURL: https://{{HOST}}/ping\nMethod: GET\nHeaders: {}\n";
/// let request = parse_request(doc, &vars, ParseOptions::default()).unwrap();
/// assert_eq!(request.url, "https://api.test/ping");
/// ```
pub fn parse_request<S: VariableSource + ?Sized>(
    text: &str,
    source: &S,
    options: ParseOptions,
) -> Result<RequestDefinition, ParseError> {
    let resolved = substitute_variables(text, source);
    let unresolved = placeholder_names(&resolved);
    if !unresolved.is_empty() {
        log::warn!(
            "request document references unset variables, sending them as written: {}",
            unresolved.join(", ")
        );
    }
    let raw: RawRequest = serde_yaml::from_str(&resolved)?;
    validate_request(raw, options)
}

fn validate_request(raw: RawRequest, options: ParseOptions) -> Result<RequestDefinition, ParseError> {
    let name = required_text(raw.name, "Name")?;
    let url = required_text(raw.url, "URL")?;
    let method_text = required_text(raw.method, "Method")?;
    let method =
        HttpMethod::from_str(&method_text).ok_or(ParseError::InvalidMethod(method_text))?;

    let headers = raw.headers.ok_or(ParseError::MissingField("Headers"))?;
    let headers = string_map(headers, "Headers")?;

    if options.require_body && !method.body_optional() && raw.body.is_none() {
        return Err(ParseError::MissingBody(method));
    }

    let params = raw
        .params
        .map(|params| string_map(params, "Params"))
        .transpose()?;

    let captures = raw.after.and_then(|after| after.env).unwrap_or_default();

    Ok(RequestDefinition {
        name,
        url,
        method,
        headers,
        body: raw.body,
        params,
        captures,
    })
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, ParseError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(ParseError::MissingField(field)),
    }
}

/// Converts a mapping of scalars to strings. Nested values are rejected.
fn string_map(
    map: IndexMap<String, Value>,
    field: &'static str,
) -> Result<IndexMap<String, String>, ParseError> {
    map.into_iter()
        .map(|(key, value)| match value {
            Value::Array(_) | Value::Object(_) => Err(ParseError::InvalidField {
                field,
                key,
                reason: "expected a string, number or boolean".to_string(),
            }),
            scalar => {
                let text = stringify_value(&scalar);
                Ok((key, text))
            }
        })
        .collect()
}
