//! Placeholder substitution for request documents.
//!
//! Replaces `{{name}}` tokens in raw request text with values from a
//! [`VariableSource`] before the document is parsed. Substitution is a single
//! pass: a substituted value is never scanned again, and a placeholder whose
//! name is unknown is left in the text exactly as written.

use crate::environment::Environment;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::collections::HashMap;

/// `{{`, optional whitespace, one or more ASCII word characters, optional whitespace, `}}`.
static PLACEHOLDER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("Failed to compile placeholder regex")
});

/// Anything placeholders can be resolved against.
pub trait VariableSource {
    /// Returns the value stored under `name`, if any.
    fn lookup(&self, name: &str) -> Option<&str>;
}

impl VariableSource for Environment {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name)
    }
}

impl VariableSource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

impl VariableSource for IndexMap<String, String> {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Substitutes every `{{name}}` placeholder in `text`.
///
/// # Examples
///
/// ```
/// use restler::variables::substitute_variables;
/// use std::collections::HashMap;
///
/// let mut vars = HashMap::new();
/// vars.insert("HOST".to_string(), "api.test".to_string());
///
/// assert_eq!(substitute_variables("https://{{HOST}}/v1", &vars), "https://api.test/v1");
/// assert_eq!(substitute_variables("{{ MISSING }}", &vars), "{{ MISSING }}");
/// ```
pub fn substitute_variables<S: VariableSource + ?Sized>(text: &str, source: &S) -> String {
    // Fast path: nothing that could be a placeholder
    if !text.contains("{{") {
        return text.to_string();
    }

    let replaced: Cow<'_, str> = PLACEHOLDER_REGEX.replace_all(text, |caps: &Captures<'_>| {
        match source.lookup(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        }
    });

    replaced.into_owned()
}

/// Lists the distinct placeholder names referenced in `text`, in order of first use.
pub fn placeholder_names(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_REGEX.captures_iter(text) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}
