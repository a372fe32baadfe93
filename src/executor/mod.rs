//! HTTP request executor.
//!
//! Turns a resolved [`RequestDefinition`] into a wire request, sends it with
//! reqwest and hands back a [`ResponseView`] with a decoded body.
//!
//! Wire details:
//!
//! - proxy chosen per request by [`proxy::select_proxy`]
//! - `Params` set on the URL query, replacing any existing value for the key
//! - `application/x-www-form-urlencoded` bodies are form encoded, everything
//!   else is sent as JSON
//! - gzip response bodies are decompressed when `Content-Encoding: gzip`

pub mod config;
pub mod error;
pub mod proxy;

pub use config::ExecutionConfig;
pub use error::RequestError;
pub use proxy::{select_proxy, ProxyChoice, ProxySettings};

use crate::models::{HttpMethod, RequestDefinition, ResponseView};
use crate::variables::walker::stringify_value;
use flate2::read::GzDecoder;
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_ENCODING};
use serde_json::Value;
use std::io::Read;
use std::time::Instant;
use url::Url;

/// Executes `request` and returns the decoded response.
///
/// Any HTTP status counts as a completed exchange; only transport, build and
/// decode failures are errors.
pub async fn execute_request(
    request: &RequestDefinition,
    config: &ExecutionConfig,
    proxy: &ProxySettings,
) -> Result<ResponseView, RequestError> {
    let client = build_client(request, config, proxy)?;
    let url = build_url(&request.url, request.params.as_ref())?;
    let headers = build_headers(&request.headers)?;
    let body = encode_body(request)?;

    log::info!("{} {}", request.method, url);

    let mut builder = client
        .request(to_reqwest_method(request.method), url.clone())
        .headers(headers);
    if let Some(body) = body {
        builder = builder.body(body);
    }

    let start = Instant::now();
    let response = builder.send().await?;

    let status = response.status();
    let final_url = response.url().to_string();
    let mut view = ResponseView::new(
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown"),
    );
    for (name, value) in response.headers() {
        match value.to_str() {
            Ok(text) => view.add_header(name.as_str(), text),
            Err(_) => log::debug!("skipping non-text value for response header {}", name),
        }
    }
    let gzip = is_gzip(response.headers());

    let raw = response.bytes().await?;
    view.duration = start.elapsed();
    view.url = final_url;
    view.set_body(decode_body(raw.to_vec(), gzip)?);

    log::info!(
        "{} {} -> {} in {} ms",
        request.method,
        url,
        view.status_code,
        view.duration.as_millis()
    );

    Ok(view)
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::GET => reqwest::Method::GET,
        HttpMethod::POST => reqwest::Method::POST,
        HttpMethod::PUT => reqwest::Method::PUT,
        HttpMethod::DELETE => reqwest::Method::DELETE,
        HttpMethod::PATCH => reqwest::Method::PATCH,
        HttpMethod::HEAD => reqwest::Method::HEAD,
        HttpMethod::OPTIONS => reqwest::Method::OPTIONS,
    }
}

fn build_client(
    request: &RequestDefinition,
    config: &ExecutionConfig,
    proxy: &ProxySettings,
) -> Result<reqwest::Client, RequestError> {
    let builder = reqwest::Client::builder().timeout(config.timeout_duration());

    let builder = match select_proxy(request, proxy)? {
        ProxyChoice::Direct => builder.no_proxy(),
        ProxyChoice::Via(url) => {
            let proxy = reqwest::Proxy::all(url.as_str())
                .map_err(|e| RequestError::ProxyConfiguration(e.to_string()))?;
            builder.proxy(proxy)
        }
    };

    builder
        .build()
        .map_err(|e| RequestError::Build(e.to_string()))
}

/// Parses `raw` and sets every entry of `params` on its query.
///
/// A key already present in the URL is replaced rather than repeated; other
/// existing pairs keep their order.
pub fn build_url(raw: &str, params: Option<&IndexMap<String, String>>) -> Result<Url, RequestError> {
    let mut url = Url::parse(raw)?;

    let params = match params {
        Some(params) if !params.is_empty() => params,
        _ => return Ok(url),
    };

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !params.contains_key(key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .extend_pairs(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    Ok(url)
}

fn build_headers(headers: &IndexMap<String, String>) -> Result<HeaderMap, RequestError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| RequestError::Build(format!("header name '{}': {}", name, e)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| RequestError::Build(format!("header '{}' value: {}", name, e)))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}

/// Serializes the request body for the wire.
///
/// Returns `None` when there is nothing to send. Form-encoded requests always
/// carry a body, empty if the document has none.
pub fn encode_body(request: &RequestDefinition) -> Result<Option<Vec<u8>>, RequestError> {
    if request.is_form_encoded() {
        return Ok(Some(encode_form(request).into_bytes()));
    }

    match &request.body {
        Some(body) => serde_json::to_vec(body)
            .map(Some)
            .map_err(|e| RequestError::Build(format!("body serialization: {}", e))),
        None => Ok(None),
    }
}

fn encode_form(request: &RequestDefinition) -> String {
    let mut form = url::form_urlencoded::Serializer::new(String::new());

    match &request.body {
        None => {}
        Some(Value::Object(fields)) => {
            for (key, value) in fields {
                match value {
                    Value::Array(_) | Value::Object(_) => {
                        log::error!(
                            "form field '{}' in request '{}' is not a scalar, sending it empty",
                            key,
                            request.name
                        );
                        form.append_pair(key, "");
                    }
                    scalar => {
                        form.append_pair(key, &stringify_value(scalar));
                    }
                }
            }
        }
        Some(_) => {
            log::error!(
                "form body of request '{}' is not a mapping, sending an empty form",
                request.name
            );
        }
    }

    form.finish()
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.trim().eq_ignore_ascii_case("gzip"))
}

/// Decompresses `raw` when the response was gzip encoded.
pub fn decode_body(raw: Vec<u8>, gzip: bool) -> Result<Vec<u8>, RequestError> {
    if !gzip {
        return Ok(raw);
    }

    let mut decoded = Vec::new();
    GzDecoder::new(raw.as_slice())
        .read_to_end(&mut decoded)
        .map_err(|e| RequestError::Decode(format!("gzip: {}", e)))?;
    Ok(decoded)
}
