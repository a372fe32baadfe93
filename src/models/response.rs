//! Response data model.
//!
//! A [`ResponseView`] is what the executor hands back: status, multi-valued
//! headers under canonical names, and a body that has already been
//! decompressed according to `Content-Encoding`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// An executed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseView {
    /// HTTP status code (e.g., 200, 404, 500).
    pub status_code: u16,

    /// Reason phrase (e.g., "OK", "Not Found").
    pub status_text: String,

    /// Header values keyed by canonical name, in arrival order.
    ///
    /// Names are canonicalized with [`canonical_header_name`] so that
    /// `x-token` and `X-Token` land in the same entry.
    pub headers: IndexMap<String, Vec<String>>,

    /// Decoded response body.
    pub body: Vec<u8>,

    /// Wall-clock duration of the network call.
    pub duration: Duration,

    /// Final request URL, including query parameters.
    pub url: String,
}

impl ResponseView {
    /// Creates a response with no headers and an empty body.
    pub fn new(status_code: u16, status_text: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            headers: IndexMap::new(),
            body: Vec::new(),
            duration: Duration::ZERO,
            url: String::new(),
        }
    }

    /// Appends a header value under its canonical name.
    pub fn add_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .entry(canonical_header_name(name))
            .or_default()
            .push(value.into());
    }

    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// All values of a header, looked up case-insensitively.
    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.headers
            .get(&canonical_header_name(name))
            .map(Vec::as_slice)
    }

    /// First value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Checks if the response status indicates success (2xx).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Decodes the body as JSON.
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Canonical header view used for `Header[...]` captures.
    ///
    /// A header with exactly one value maps to a string; a header with
    /// several values maps to a sequence of strings.
    pub fn header_view(&self) -> Value {
        let mut view = Map::new();
        for (name, values) in &self.headers {
            let value = match values.as_slice() {
                [single] => Value::String(single.clone()),
                many => Value::Array(many.iter().cloned().map(Value::String).collect()),
            };
            view.insert(name.clone(), value);
        }
        Value::Object(view)
    }
}

/// Canonical MIME header name: the first letter and every letter after a
/// hyphen upper-cased, everything else lower-cased (`x-request-id` →
/// `X-Request-Id`). Names containing characters that are not valid in a
/// header token are returned unchanged.
pub fn canonical_header_name(name: &str) -> String {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b));
    if !valid {
        return name.to_string();
    }

    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}
