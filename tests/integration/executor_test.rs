//! Request executor against a local mock server.

use super::init_test_env;
use flate2::write::GzEncoder;
use flate2::Compression;
use indexmap::IndexMap;
use restler::executor::{execute_request, ExecutionConfig, ProxySettings, RequestError};
use restler::models::request::{FORM_URLENCODED, PROXY_ENABLE_HEADER, PROXY_URL_HEADER};
use restler::models::{HttpMethod, RequestDefinition};
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config() -> ExecutionConfig {
    ExecutionConfig::default()
}

#[tokio::test]
async fn test_params_overwrite_url_query() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .and(query_param("q", "a b"))
        .and(query_param("sort", "asc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = RequestDefinition::new(
        "search",
        HttpMethod::GET,
        format!("{}/search?page=1&sort=asc", server.uri()),
    );
    let mut params = IndexMap::new();
    params.insert("page".to_string(), "2".to_string());
    params.insert("q".to_string(), "a b".to_string());
    request.params = Some(params);

    let response = execute_request(&request, &config(), &ProxySettings::direct())
        .await
        .unwrap();
    assert_eq!(response.status_code, 200);
    assert!(!response.url.contains("page=1"));
}

#[tokio::test]
async fn test_json_body_and_headers() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/items/1"))
        .and(header("X-Api-Key", "k"))
        .and(body_json(json!({"name": "widget", "tags": ["a"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = RequestDefinition::new(
        "update",
        HttpMethod::PUT,
        format!("{}/items/1", server.uri()),
    );
    request.add_header("Content-Type", "application/json");
    request.add_header("X-Api-Key", "k");
    request.set_body(json!({"name": "widget", "tags": ["a"]}));

    let response = execute_request(&request, &config(), &ProxySettings::direct())
        .await
        .unwrap();
    assert_eq!(response.body_json().unwrap(), json!({"ok": true}));
    assert_eq!(response.content_type(), Some("application/json"));
}

#[tokio::test]
async fn test_form_encoded_body() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(header("Content-Type", FORM_URLENCODED))
        .and(body_string("grant_type=client_credentials&scope=read+write&retries=3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let mut request = RequestDefinition::new(
        "token",
        HttpMethod::POST,
        format!("{}/oauth/token", server.uri()),
    );
    request.add_header("Content-Type", FORM_URLENCODED);
    request.set_body(json!({
        "grant_type": "client_credentials",
        "scope": "read write",
        "retries": 3
    }));

    let response = execute_request(&request, &config(), &ProxySettings::direct())
        .await
        .unwrap();
    assert_eq!(response.status_code, 200);
}

#[tokio::test]
async fn test_gzip_response_is_decoded() {
    init_test_env();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(br#"{"access_token":"zipped"}"#).unwrap();
    let compressed = encoder.finish().unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gz"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Encoding", "gzip")
                .insert_header("Content-Type", "application/json")
                .set_body_bytes(compressed),
        )
        .mount(&server)
        .await;

    let request = RequestDefinition::new("gz", HttpMethod::GET, format!("{}/gz", server.uri()));
    let response = execute_request(&request, &config(), &ProxySettings::direct())
        .await
        .unwrap();
    assert_eq!(response.body_json().unwrap(), json!({"access_token": "zipped"}));
}

#[tokio::test]
async fn test_error_status_is_not_an_error() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .append_header("Set-Cookie", "a=1")
                .append_header("Set-Cookie", "b=2"),
        )
        .mount(&server)
        .await;

    let request = RequestDefinition::new(
        "missing",
        HttpMethod::DELETE,
        format!("{}/missing", server.uri()),
    );
    let response = execute_request(&request, &config(), &ProxySettings::direct())
        .await
        .unwrap();
    assert_eq!(response.status_code, 404);
    assert_eq!(response.status_text, "Not Found");
    assert!(!response.is_success());
    assert_eq!(
        response.header_values("set-cookie"),
        Some(&["a=1".to_string(), "b=2".to_string()][..])
    );
}

#[tokio::test]
async fn test_invalid_proxy_url_fails_request() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut request = RequestDefinition::new("p", HttpMethod::GET, server.uri());
    request.add_header(PROXY_URL_HEADER, "::bad proxy::");

    let err = execute_request(&request, &config(), &ProxySettings::direct())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::ProxyConfiguration(_)));
}

#[tokio::test]
async fn test_proxy_disabled_ignores_ambient_proxy() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/direct"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let unreachable = ProxySettings::new(Some("http://127.0.0.1:1".to_string()));

    let mut direct = RequestDefinition::new("d", HttpMethod::GET, format!("{}/direct", server.uri()));
    direct.add_header(PROXY_ENABLE_HEADER, "N");
    let response = execute_request(&direct, &config(), &unreachable).await.unwrap();
    assert_eq!(response.status_code, 200);

    let proxied = RequestDefinition::new("p", HttpMethod::GET, format!("{}/direct", server.uri()));
    let err = execute_request(&proxied, &config(), &unreachable)
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Network(_)));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    init_test_env();
    let request = RequestDefinition::new("down", HttpMethod::GET, "http://127.0.0.1:1/");
    let err = execute_request(&request, &config(), &ProxySettings::direct())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Network(_)));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    init_test_env();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let request = RequestDefinition::new("slow", HttpMethod::GET, format!("{}/slow", server.uri()));
    let err = execute_request(&request, &ExecutionConfig::new(1), &ProxySettings::direct())
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Timeout));
}
