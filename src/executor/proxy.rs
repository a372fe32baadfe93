//! Proxy policy.
//!
//! The ambient proxy comes from the process environment (`HTTPS_PROXY`, then
//! `HTTP_PROXY`). Each request can opt out with `R-Proxy-Enable: N` or point
//! somewhere else with `R-Proxy-Url`.

use super::error::RequestError;
use crate::models::RequestDefinition;
use url::Url;

/// Environment variables consulted for the ambient proxy, in order.
const PROXY_ENV_VARS: &[&str] = &["HTTPS_PROXY", "https_proxy", "HTTP_PROXY", "http_proxy"];

/// Proxy schemes the HTTP client is built with.
const SUPPORTED_SCHEMES: &[&str] = &["http", "https"];

/// Ambient proxy configuration for a process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxySettings {
    /// Proxy URL used when a request does not override it.
    pub url: Option<String>,
}

impl ProxySettings {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url: url.filter(|u| !u.trim().is_empty()),
        }
    }

    /// No ambient proxy.
    pub fn direct() -> Self {
        Self::default()
    }

    /// Reads the ambient proxy from the process environment.
    pub fn from_env() -> Self {
        let url = PROXY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty());
        Self::new(url)
    }
}

/// How a single request reaches its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyChoice {
    Direct,
    Via(Url),
}

/// Decides the proxy for `request`.
///
/// `R-Proxy-Enable: N` always means a direct connection. Otherwise the
/// `R-Proxy-Url` header wins over the ambient setting. A proxy URL that is
/// present but unusable fails the request.
pub fn select_proxy(
    request: &RequestDefinition,
    settings: &ProxySettings,
) -> Result<ProxyChoice, RequestError> {
    if !request.proxy_enabled() {
        log::debug!("proxy disabled for request '{}'", request.name);
        return Ok(ProxyChoice::Direct);
    }

    let candidate = request
        .proxy_override()
        .or_else(|| settings.url.as_deref().map(str::trim));

    match candidate {
        Some(raw) => {
            let url = parse_proxy_url(raw)?;
            log::debug!("using proxy {} for request '{}'", url, request.name);
            Ok(ProxyChoice::Via(url))
        }
        None => Ok(ProxyChoice::Direct),
    }
}

fn parse_proxy_url(raw: &str) -> Result<Url, RequestError> {
    let url = Url::parse(raw)
        .map_err(|e| RequestError::ProxyConfiguration(format!("'{}': {}", raw, e)))?;

    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(RequestError::ProxyConfiguration(format!(
            "'{}': unsupported scheme '{}'",
            raw,
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(RequestError::ProxyConfiguration(format!(
            "'{}': missing host",
            raw
        )));
    }

    Ok(url)
}
