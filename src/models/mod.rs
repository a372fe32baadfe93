//! Data models for request definitions and executed responses.

pub mod request;
pub mod response;

pub use request::{HttpMethod, RequestDefinition};
pub use response::{canonical_header_name, ResponseView};
