//! End-to-end request chaining: captures from one response feed the next
//! request through the environment file.

use super::{init_test_env, write_env, write_request};
use restler::chain::CaptureState;
use restler::config::RestlerConfig;
use restler::environment::Environment;
use restler::executor::ProxySettings;
use restler::runner::{RunError, Runner};
use serde_json::json;
use serial_test::serial;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runner_for(env_path: &std::path::Path) -> Runner {
    let env = Environment::load(env_path).unwrap();
    Runner::new(RestlerConfig::default(), ProxySettings::direct(), env).with_reports(false)
}

const LOGIN: &str = r#"
Name: login
URL: "{{BASE_URL}}/auth/token"
Method: POST
Headers:
  Content-Type: application/json
Body:
  username: "{{USER}}"
After:
  Env:
    TOKEN: Body[access_token]
    USER_ID: Body[user][id]
    FIRST_ROLE: Body[user][roles][0]
    SESSION: Header[x-session]
    MISSING: Body[user][email]
"#;

const ORDER: &str = r#"
Name: create order
URL: "{{BASE_URL}}/orders"
Method: POST
Headers:
  Content-Type: application/json
  Authorization: "Bearer {{TOKEN}}"
Body:
  token: "{{TOKEN}}"
  user: "{{USER_ID}}"
  qty: 2
"#;

#[tokio::test]
async fn test_token_captured_and_reused() {
    init_test_env();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(body_json(json!({"username": "alice"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "access_token": "abc123",
                    "user": {"id": 7, "roles": ["admin", "dev"]}
                }))
                .insert_header("X-Session", "s-1"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("Authorization", "Bearer abc123"))
        .and(body_json(json!({"token": "abc123", "user": "7", "qty": 2})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "o-1"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let env_path = write_env(
        dir.path(),
        &format!("# local settings\nBASE_URL={}\nUSER=alice\nTOKEN=stale\n", server.uri()),
    );
    let login = write_request(dir.path(), "login.post.yaml", LOGIN);
    let order = write_request(dir.path(), "order.post.yaml", ORDER);

    let mut runner = runner_for(&env_path);
    let outcomes = runner.run_files(&[login, order]).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    let capture = outcomes[0].capture.as_ref().unwrap();
    assert_eq!(capture.state, CaptureState::Capturing);
    assert!(capture.persisted);
    assert!(outcomes[1].capture.is_none());
    assert_eq!(outcomes[1].response.status_code, 201);

    assert_eq!(runner.environment().get("TOKEN"), Some("abc123"));
    assert_eq!(runner.environment().get("MISSING"), Some(""));

    let written = fs::read_to_string(&env_path).unwrap();
    assert_eq!(
        written,
        format!(
            "# local settings\nBASE_URL={}\nUSER=alice\nTOKEN=abc123\n\
             USER_ID=7\nFIRST_ROLE=admin\nSESSION=s-1\nMISSING=\n",
            server.uri()
        )
    );
}

#[tokio::test]
async fn test_non_json_body_still_captures_headers() {
    init_test_env();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("OK")
                .insert_header("X-Request-Id", "r-9"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let env_path = write_env(dir.path(), &format!("BASE_URL={}\n", server.uri()));
    let request = write_request(
        dir.path(),
        "health.get.yaml",
        "Name: health\nURL: '{{BASE_URL}}/health'\nMethod: GET\nHeaders: {}\n\
         After:\n  Env:\n    STATUS: Body[status]\n    REQUEST_ID: Header[X-Request-Id]\n",
    );

    let mut runner = runner_for(&env_path);
    let outcome = runner.run_file(&request).await.unwrap();

    let capture = outcome.capture.unwrap();
    assert!(capture.body_not_json);
    assert_eq!(capture.captured.len(), 1);
    assert_eq!(runner.environment().get("REQUEST_ID"), Some("r-9"));
    assert_eq!(runner.environment().get("STATUS"), None);
    assert_eq!(
        fs::read_to_string(&env_path).unwrap(),
        format!("BASE_URL={}\nREQUEST_ID=r-9\n", server.uri())
    );
}

#[tokio::test]
async fn test_unknown_placeholder_is_sent_verbatim() {
    init_test_env();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/trace"))
        .and(header("X-Trace", "{{UNKNOWN}}"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let env_path = write_env(dir.path(), &format!("BASE_URL={}\n", server.uri()));
    let request = write_request(
        dir.path(),
        "trace.get.yaml",
        "Name: trace\nURL: '{{BASE_URL}}/trace'\nMethod: GET\nHeaders:\n  X-Trace: '{{UNKNOWN}}'\n",
    );

    let mut runner = runner_for(&env_path);
    let outcome = runner.run_file(&request).await.unwrap();
    assert_eq!(outcome.response.status_code, 204);
    assert!(outcome.capture.is_none());
    assert_eq!(
        fs::read_to_string(&env_path).unwrap(),
        format!("BASE_URL={}\n", server.uri())
    );
}

#[tokio::test]
async fn test_report_written_next_to_request() {
    init_test_env();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let env_path = write_env(dir.path(), &format!("BASE_URL={}\n", server.uri()));
    let request = write_request(
        dir.path(),
        "users.get.yaml",
        "Name: users\nURL: '{{BASE_URL}}/users'\nMethod: GET\nHeaders: {}\n",
    );

    let env = Environment::load(&env_path).unwrap();
    let mut runner = Runner::new(RestlerConfig::default(), ProxySettings::direct(), env);
    let outcome = runner.run_file(&request).await.unwrap();

    let report_path = outcome.report_path.unwrap();
    assert_eq!(report_path.parent(), Some(dir.path()));
    let file_name = report_path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(file_name.starts_with(".users.get.get."));
    assert!(file_name.ends_with(".res.md"));

    let report = fs::read_to_string(&report_path).unwrap();
    assert!(report.starts_with("# Response For: users\n"));
    assert!(report.contains("\"id\": 1"));
}

#[tokio::test]
async fn test_run_files_stops_at_first_failure() {
    init_test_env();
    let dir = TempDir::new().unwrap();
    let env_path = write_env(dir.path(), "BASE_URL=http://127.0.0.1:1\n");
    let failing = write_request(
        dir.path(),
        "down.get.yaml",
        "Name: down\nURL: '{{BASE_URL}}/x'\nMethod: GET\nHeaders: {}\nAfter:\n  Env:\n    X: Body[x]\n",
    );
    let never = write_request(dir.path(), "never.get.yaml", "not: [valid");

    let mut runner = runner_for(&env_path);
    let err = runner.run_files(&[failing, never]).await.unwrap_err();
    assert!(matches!(err, RunError::Request { ref name, .. } if name == "down"));
    assert_eq!(runner.environment().get("X"), None);
}

#[tokio::test]
#[serial]
async fn test_for_project_with_proxy_disabled_request() {
    init_test_env();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/direct"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".env.local"), format!("BASE_URL={}\n", server.uri())).unwrap();
    fs::write(dir.path().join(".env"), "BASE_URL=http://wrong.invalid\n").unwrap();
    let request = write_request(
        dir.path(),
        "direct.get.yaml",
        "Name: direct\nURL: '{{BASE_URL}}/direct'\nMethod: GET\nHeaders:\n  R-Proxy-Enable: N\n",
    );

    std::env::set_var("HTTPS_PROXY", "http://127.0.0.1:1");
    let runner = Runner::for_project(dir.path(), RestlerConfig::default());
    std::env::remove_var("HTTPS_PROXY");

    let mut runner = runner.unwrap().with_reports(false);
    let outcome = runner.run_file(&request).await.unwrap();
    assert_eq!(outcome.response.status_code, 200);
}
