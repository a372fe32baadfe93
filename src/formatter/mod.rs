//! Markdown response reports.
//!
//! Every executed request leaves a report next to its request file (or in
//! the configured report directory) named
//! `.<stem>.<method>.<timestamp>.res.md`.

use crate::models::{HttpMethod, RequestDefinition, ResponseView};
use chrono::{DateTime, Local};
use std::fmt::Write;
use std::path::Path;

/// Pretty-prints `json`. Fails when the text is not JSON.
///
/// # Examples
///
/// ```
/// use restler::formatter::format_json;
///
/// let formatted = format_json(r#"{"key":"value","nested":{"array":[1,2,3]}}"#).unwrap();
/// assert!(formatted.contains("  \"key\": \"value\""));
/// ```
pub fn format_json(json: &str) -> Result<String, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    serde_json::to_string_pretty(&value)
}

/// Response headers as `Name: value` lines, sorted by name. A header with
/// several values produces one line per value.
pub fn format_headers(response: &ResponseView) -> String {
    let mut names: Vec<&String> = response.headers.keys().collect();
    names.sort();

    let mut out = String::new();
    for name in names {
        for value in &response.headers[name] {
            let _ = writeln!(out, "{}: {}", name, value);
        }
    }
    out
}

/// Renders the markdown report for one request/response exchange.
pub fn format_report(request: &RequestDefinition, response: &ResponseView) -> String {
    let text = String::from_utf8_lossy(&response.body);
    let (fence, body) = match format_json(&text) {
        Ok(pretty) => ("json", pretty),
        Err(_) => ("text", text.into_owned()),
    };

    let url = if response.url.is_empty() {
        request.url.as_str()
    } else {
        response.url.as_str()
    };

    let mut out = String::new();
    let _ = writeln!(out, "# Response For: {}", request.name);
    let _ = writeln!(
        out,
        "Status Code: {}, Status: {} {}",
        response.status_code, response.status_code, response.status_text
    );
    out.push_str("\n\n## Response Header:\n");
    out.push_str(&format_headers(response));
    out.push_str("\n\n## Response Body:\n");
    let _ = writeln!(out, "```{}\n{}\n```", fence, body);
    out.push_str("\n\n## Duration:\n");
    let _ = writeln!(out, "{} ms", response.duration.as_millis());
    out.push_str("\n\n## Original Request\n");
    let _ = writeln!(out, "Method: {}, URL: {}", request.method, url);
    out
}

/// Report file name for a request file executed at `timestamp`.
///
/// `users/list.get.yaml` run as GET yields
/// `.list.get.get.<yyyyMMddHHmmssffffff>.res.md`.
pub fn report_file_name(request_path: &Path, method: HttpMethod, timestamp: DateTime<Local>) -> String {
    let stem = request_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "request".to_string());

    format!(
        ".{}.{}.{}.res.md",
        stem,
        method.as_str().to_lowercase(),
        timestamp.format("%Y%m%d%H%M%S%6f")
    )
}
