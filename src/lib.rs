//! Restler: file-driven REST request runner.
//!
//! Requests are described in YAML (or JSON) files and executed one at a time.
//! Values captured from one response are written back to a `KEY=value`
//! environment file so the next request can reference them as `{{KEY}}`.
//!
//! # Architecture
//!
//! - **variables**: `{{name}}` substitution, capture expression parsing and
//!   the value walker
//! - **parser**: loads request documents into [`models::RequestDefinition`]
//! - **executor**: sends requests with reqwest (proxy, params, form/JSON
//!   bodies, gzip)
//! - **chain**: evaluates `After.Env` capture rules and merges the results
//!   into the environment
//! - **environment**: the environment store and its backing file
//! - **formatter**: markdown response reports
//! - **runner**: ties the pieces together for one invocation
//! - **config**: `config.yaml` handling
//!
//! # Request file
//!
//! ```yaml
//! Name: login
//! URL: "{{BASE_URL}}/auth/token"
//! Method: POST
//! Headers:
//!   Content-Type: application/json
//! Body:
//!   username: "{{USER}}"
//! After:
//!   Env:
//!     TOKEN: Body[access_token]
//! ```
//!
//! After this request runs, `TOKEN=<access_token>` is in the environment file
//! and any later request can send `Authorization: Bearer {{TOKEN}}`.

pub mod chain;
pub mod config;
pub mod environment;
pub mod executor;
pub mod formatter;
pub mod models;
pub mod parser;
pub mod runner;
pub mod variables;

pub use chain::{deep_merge, CaptureOutcome, MergeResult};
pub use environment::Environment;
pub use executor::{execute_request, ProxySettings, RequestError};
pub use models::{RequestDefinition, ResponseView};
pub use runner::{RunError, RunOutcome, Runner};
