use regex::{Captures, Regex};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("prompt '{template}' is missing a value for '{field}'")]
    MissingField { template: String, field: String },

    #[error("override for '{template}' must use placeholders {expected:?}, found {found:?}")]
    OverrideMismatch {
        template: String,
        expected: BTreeSet<String>,
        found: BTreeSet<String>,
    },

    #[error("unknown prompt override '{0}'")]
    UnknownCapability(String),
}

/// Values interpolated into a template, keyed by placeholder name.
#[derive(Debug, Clone, Default)]
pub struct TemplateVars {
    values: BTreeMap<&'static str, String>,
}

impl TemplateVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.values.insert(name, value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Instruction text with `{{field}}` / `{{{field}}}` interpolation points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: String,
    pub version: u32,
    pub text: String,
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\{?\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}\}?")
            .expect("placeholder pattern is valid")
    })
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, version: u32, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version,
            text: text.into(),
        }
    }

    /// Names of every interpolation point in the template.
    pub fn placeholders(&self) -> BTreeSet<String> {
        placeholder_pattern()
            .captures_iter(&self.text)
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Interpolate `vars` into the template. Every placeholder must have a value.
    pub fn render(&self, vars: &TemplateVars) -> Result<String, PromptError> {
        if let Some(field) = self
            .placeholders()
            .into_iter()
            .find(|name| vars.get(name).is_none())
        {
            return Err(PromptError::MissingField {
                template: self.name.clone(),
                field,
            });
        }

        let rendered = placeholder_pattern().replace_all(&self.text, |caps: &Captures| {
            vars.get(&caps[1]).unwrap_or_default().to_string()
        });
        Ok(rendered.into_owned())
    }
}
