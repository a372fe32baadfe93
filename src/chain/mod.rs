//! Capture & merge engine.
//!
//! After a request that declares `After.Env` rules returns, its rules are
//! evaluated against the response and the captured values flow back into the
//! [`Environment`] so later requests can reference them as `{{KEY}}`.
//!
//! Failures inside this engine never abort a run:
//!
//! - a malformed rule is skipped with a warning
//! - a body that is not JSON skips the `Body[...]` rules only
//! - a path that resolves to nothing captures the empty string
//! - a failed write to the backing file is logged and the in-memory
//!   environment is still updated

use crate::environment::{EnvError, Environment};
use crate::models::{canonical_header_name, RequestDefinition, ResponseView};
use crate::variables::capture::{parse_capture_expression, CaptureError, CaptureRule, SourceKind};
use crate::variables::walker::{stringify_value, walk};
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Captured values keyed by environment key, in rule order.
pub type MergeResult = IndexMap<String, String>;

/// Per-request engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// The request declares no capture rules; nothing is touched.
    Idle,
    /// Rules are present and are evaluated once.
    Capturing,
}

impl CaptureState {
    pub fn for_request(request: &RequestDefinition) -> Self {
        if request.has_captures() {
            CaptureState::Capturing
        } else {
            CaptureState::Idle
        }
    }
}

/// What a capture pass produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutcome {
    pub state: CaptureState,

    /// One entry per applied rule. Values not found are empty strings.
    pub captured: MergeResult,

    /// Rules that could not be parsed, with the reason.
    pub skipped: Vec<(String, CaptureError)>,

    /// Set when `Body[...]` rules were dropped because the body is not JSON.
    pub body_not_json: bool,

    /// Whether the captured values reached the backing file.
    pub persisted: bool,
}

impl CaptureOutcome {
    fn idle() -> Self {
        Self {
            state: CaptureState::Idle,
            captured: MergeResult::new(),
            skipped: Vec::new(),
            body_not_json: false,
            persisted: false,
        }
    }
}

/// Parses every capture rule of `request`, separating out the invalid ones.
pub fn parse_rules(request: &RequestDefinition) -> (Vec<CaptureRule>, Vec<(String, CaptureError)>) {
    let mut rules = Vec::new();
    let mut skipped = Vec::new();

    for (env_key, expr) in &request.captures {
        match parse_capture_expression(expr) {
            Ok(expression) => rules.push(CaptureRule {
                env_key: env_key.clone(),
                expression,
            }),
            Err(err @ CaptureError::EmptyPath(_)) => {
                log::debug!("skipping capture rule {}: {}", env_key, err);
                skipped.push((env_key.clone(), err));
            }
            Err(err) => {
                log::warn!("skipping capture rule {}: {}", env_key, err);
                skipped.push((env_key.clone(), err));
            }
        }
    }

    (rules, skipped)
}

/// Evaluates the capture rules of `request` against `response` without
/// touching any environment.
pub fn capture_values(request: &RequestDefinition, response: &ResponseView) -> CaptureOutcome {
    if CaptureState::for_request(request) == CaptureState::Idle {
        return CaptureOutcome::idle();
    }

    let (rules, skipped) = parse_rules(request);
    let (body_rules, header_rules): (Vec<_>, Vec<_>) = rules
        .into_iter()
        .partition(|rule| rule.expression.source == SourceKind::Body);

    let mut body_not_json = false;
    let mut body_values = Map::new();
    if !body_rules.is_empty() {
        match response.body_json() {
            Ok(document) => body_values = evaluate(&body_rules, &document, |path| path.to_vec()),
            Err(err) => {
                log::warn!(
                    "response body of '{}' is not JSON ({}), skipping {} Body capture rule(s)",
                    request.name,
                    err,
                    body_rules.len()
                );
                body_not_json = true;
            }
        }
    }

    let header_values = if header_rules.is_empty() {
        Map::new()
    } else {
        evaluate(&header_rules, &response.header_view(), canonical_header_path)
    };

    let mut merged = Map::new();
    deep_merge(&mut merged, body_values);
    deep_merge(&mut merged, header_values);

    // Report in declaration order.
    let captured = request
        .captures
        .keys()
        .filter_map(|key| {
            merged
                .get(key)
                .map(|value| (key.clone(), stringify_value(value)))
        })
        .collect();

    CaptureOutcome {
        state: CaptureState::Capturing,
        captured,
        skipped,
        body_not_json,
        persisted: false,
    }
}

/// Runs the capture step for `request` and folds the result into `env`.
///
/// The environment snapshot and the captured values are deep-merged into the
/// new in-memory environment. Only the captured keys are written to the
/// backing file.
pub fn apply(
    request: &RequestDefinition,
    response: &ResponseView,
    env: &mut Environment,
) -> CaptureOutcome {
    let mut outcome = capture_values(request, response);
    if outcome.state == CaptureState::Idle || outcome.captured.is_empty() {
        return outcome;
    }

    let mut working: Map<String, Value> = env
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();
    let incoming: Map<String, Value> = outcome
        .captured
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    deep_merge(&mut working, incoming);

    match env.persist(&outcome.captured) {
        Ok(()) => outcome.persisted = true,
        Err(EnvError::NoBackingFile) => {
            log::debug!("environment has no backing file, keeping captures in memory")
        }
        Err(err) => log::error!("failed to persist captured values: {}", err),
    }

    env.replace_all(
        working
            .iter()
            .map(|(k, v)| (k.clone(), stringify_value(v)))
            .collect(),
    );

    log::info!(
        "captured {} value(s) from '{}'",
        outcome.captured.len(),
        request.name
    );
    outcome
}

/// Recursively merges `src` into `dest`.
///
/// When both sides hold a mapping under the same key the mappings are merged;
/// in every other case the incoming value replaces the existing one.
///
/// # Examples
///
/// ```
/// use restler::chain::deep_merge;
/// use serde_json::json;
///
/// let mut dest = json!({"a": {"x": 1}});
/// let src = json!({"a": {"y": 2}});
/// deep_merge(
///     dest.as_object_mut().unwrap(),
///     src.as_object().unwrap().clone(),
/// );
/// assert_eq!(dest, json!({"a": {"x": 1, "y": 2}}));
/// ```
pub fn deep_merge(dest: &mut Map<String, Value>, src: Map<String, Value>) {
    for (key, incoming) in src {
        match incoming {
            Value::Object(nested) => {
                if let Some(Value::Object(existing)) = dest.get_mut(&key) {
                    deep_merge(existing, nested);
                    continue;
                }
                dest.insert(key, Value::Object(nested));
            }
            other => {
                dest.insert(key, other);
            }
        }
    }
}

fn evaluate<F>(rules: &[CaptureRule], document: &Value, prepare: F) -> Map<String, Value>
where
    F: Fn(&[String]) -> Vec<String>,
{
    let mut values = Map::new();
    for rule in rules {
        let path = prepare(&rule.expression.path);
        let value = match walk(document, &path) {
            Some(found) => Value::String(stringify_value(found)),
            None => {
                log::debug!(
                    "capture {} = {} found nothing, storing empty value",
                    rule.env_key,
                    rule.expression
                );
                Value::String(String::new())
            }
        };
        values.insert(rule.env_key.clone(), value);
    }
    values
}

/// Header names are matched case-insensitively against the canonical view.
fn canonical_header_path(path: &[String]) -> Vec<String> {
    let mut path = path.to_vec();
    if let Some(name) = path.first_mut() {
        *name = canonical_header_name(name);
    }
    path
}
