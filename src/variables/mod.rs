//! Variable resolution for request documents.
//!
//! - [`substitution`] replaces `{{name}}` placeholders before a request is built
//! - [`capture`] parses `Body[...]` / `Header[...]` capture expressions
//! - [`walker`] follows a parsed path through a response value

pub mod capture;
pub mod substitution;
pub mod walker;

pub use capture::{parse_capture_expression, CaptureError, CaptureExpression, CaptureRule, SourceKind};
pub use substitution::{placeholder_names, substitute_variables, VariableSource};
pub use walker::{stringify_value, walk};
