use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::errors::S2cError;

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder regex"))
}

/// A fixed template plus the values bound to its `{name}` placeholders.
///
/// Rendering makes a single pass over the template text. Bound values are
/// copied into the output as-is and never scanned for placeholders, so
/// user text containing braces or `%` comes out exactly as it went in.
#[derive(Debug, Clone)]
pub struct Template<'a> {
    text: &'a str,
    values: BTreeMap<&'static str, String>,
}

impl<'a> Template<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, values: BTreeMap::new() }
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<String>) -> &mut Self {
        self.values.insert(name, value.into());
        self
    }

    pub fn placeholders(&self) -> Vec<String> {
        placeholder_re()
            .captures_iter(self.text)
            .map(|c| c[1].to_string())
            .collect()
    }

    pub fn render(&self) -> Result<String, S2cError> {
        let missing: Vec<String> = self
            .placeholders()
            .into_iter()
            .filter(|p| !self.values.contains_key(p.as_str()))
            .collect();
        if !missing.is_empty() {
            return Err(S2cError::Template(format!("unbound placeholders: {}", missing.join(", "))));
        }
        let out = placeholder_re().replace_all(self.text, |c: &Captures| {
            self.values.get(&c[1]).cloned().unwrap_or_default()
        });
        Ok(out.into_owned())
    }
}
