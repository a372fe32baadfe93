//! Request definition data model.
//!
//! A [`RequestDefinition`] is the validated form of a request document after
//! placeholder substitution. It owns everything the executor needs to build
//! the wire request plus the capture rules applied to the response.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header that switches proxying on (`Y`, the default) or off (`N`).
pub const PROXY_ENABLE_HEADER: &str = "R-Proxy-Enable";

/// Header that overrides the ambient proxy URL for one request.
pub const PROXY_URL_HEADER: &str = "R-Proxy-Url";

/// Media type that switches body encoding from JSON to form encoding.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    HEAD,
}

impl HttpMethod {
    /// Returns the string representation of the HTTP method.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::HEAD => "HEAD",
        }
    }

    /// Parses a method name, ignoring case.
    ///
    /// # Returns
    ///
    /// `Some(HttpMethod)` if the string is a supported method, `None` otherwise.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            "HEAD" => Some(HttpMethod::HEAD),
            _ => None,
        }
    }

    /// Methods whose documents may omit `Body`.
    pub fn body_optional(&self) -> bool {
        matches!(
            self,
            HttpMethod::GET | HttpMethod::OPTIONS | HttpMethod::DELETE
        )
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved, validated request ready for execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDefinition {
    /// Human-readable request name, never empty.
    pub name: String,

    /// Target URL after placeholder substitution.
    pub url: String,

    pub method: HttpMethod,

    /// Headers applied to the outgoing request, in document order.
    ///
    /// Also carries the `R-Proxy-*` control headers.
    pub headers: IndexMap<String, String>,

    /// Structural body; JSON-encoded unless the request is form encoded.
    pub body: Option<Value>,

    /// Query parameters set on the URL, overwriting existing ones.
    pub params: Option<IndexMap<String, String>>,

    /// Capture rules from `After.Env`: environment key to source expression.
    pub captures: IndexMap<String, String>,
}

impl RequestDefinition {
    /// Creates a definition with no headers, body, params or captures.
    pub fn new(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method,
            headers: IndexMap::new(),
            body: None,
            params: None,
            captures: IndexMap::new(),
        }
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }

    pub fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }

    pub fn add_capture(&mut self, env_key: impl Into<String>, expression: impl Into<String>) {
        self.captures.insert(env_key.into(), expression.into());
    }

    /// Looks up a header value, ignoring the case of the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Gets the Content-Type header value if present.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Whether the body should be sent form encoded.
    pub fn is_form_encoded(&self) -> bool {
        self.content_type()
            .and_then(|ct| ct.split(';').next())
            .map(|media| media.trim().eq_ignore_ascii_case(FORM_URLENCODED))
            .unwrap_or(false)
    }

    /// Whether proxying is allowed for this request (`R-Proxy-Enable` is not `N`).
    pub fn proxy_enabled(&self) -> bool {
        match self.header(PROXY_ENABLE_HEADER).map(str::trim) {
            Some(flag) if !flag.is_empty() => flag != "N",
            _ => true,
        }
    }

    /// The per-request proxy override, if set and non-empty.
    pub fn proxy_override(&self) -> Option<&str> {
        self.header(PROXY_URL_HEADER)
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Whether the request declares any capture rules.
    pub fn has_captures(&self) -> bool {
        !self.captures.is_empty()
    }
}
