//! Declarative form schemas.
//!
//! A schema always validates the whole form. Field-level validation runs the
//! same pass and picks out the issue for one path, so cross-field rules such
//! as password confirmation behave the same either way.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Field path to current value.
pub type FormValues = BTreeMap<String, String>;

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Field path the issue belongs to
    pub path: String,
    /// Message shown to the user
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Whole-form validation.
pub trait Schema: Send + Sync + 'static {
    /// Validates every field, returning all issues found.
    fn validate(&self, values: &FormValues) -> Result<(), Vec<FieldIssue>>;
}

impl<F> Schema for F
where
    F: Fn(&FormValues) -> Result<(), Vec<FieldIssue>> + Send + Sync + 'static,
{
    fn validate(&self, values: &FormValues) -> Result<(), Vec<FieldIssue>> {
        self(values)
    }
}

/// Predicate used by [`Rule::Custom`].
pub type Predicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

// == Rule ==
/// A single check on a field value. Each carries its failure message.
#[derive(Clone)]
pub enum Rule {
    /// Value must contain non-whitespace characters
    Required(String),
    /// At least this many characters
    MinLength(usize, String),
    /// At most this many characters
    MaxLength(usize, String),
    /// Value must look like an email address
    Email(String),
    /// Value must equal the value of another field
    Matches(String, String),
    /// Arbitrary predicate on the value
    Custom(Predicate, String),
}

impl Rule {
    pub fn required(message: impl Into<String>) -> Self {
        Rule::Required(message.into())
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Rule::MinLength(min, message.into())
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Rule::MaxLength(max, message.into())
    }

    pub fn email(message: impl Into<String>) -> Self {
        Rule::Email(message.into())
    }

    pub fn matches(other_field: impl Into<String>, message: impl Into<String>) -> Self {
        Rule::Matches(other_field.into(), message.into())
    }

    pub fn custom<F>(predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Rule::Custom(Arc::new(predicate), message.into())
    }

    /// Returns the failure message if `value` breaks this rule.
    fn check<'a>(&'a self, value: &str, values: &FormValues) -> Option<&'a str> {
        let passed = match self {
            Rule::Required(_) => !value.trim().is_empty(),
            Rule::MinLength(min, _) => value.chars().count() >= *min,
            Rule::MaxLength(max, _) => value.chars().count() <= *max,
            Rule::Email(_) => is_valid_email(value),
            Rule::Matches(other, _) => values.get(other).map(String::as_str).unwrap_or("") == value,
            Rule::Custom(predicate, _) => predicate(value),
        };

        if passed {
            None
        } else {
            Some(self.message())
        }
    }

    fn message(&self) -> &str {
        match self {
            Rule::Required(m)
            | Rule::MinLength(_, m)
            | Rule::MaxLength(_, m)
            | Rule::Email(m)
            | Rule::Matches(_, m)
            | Rule::Custom(_, m) => m,
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required(m) => f.debug_tuple("Required").field(m).finish(),
            Rule::MinLength(n, m) => f.debug_tuple("MinLength").field(n).field(m).finish(),
            Rule::MaxLength(n, m) => f.debug_tuple("MaxLength").field(n).field(m).finish(),
            Rule::Email(m) => f.debug_tuple("Email").field(m).finish(),
            Rule::Matches(o, m) => f.debug_tuple("Matches").field(o).field(m).finish(),
            Rule::Custom(_, m) => f.debug_tuple("Custom").field(m).finish(),
        }
    }
}

#[derive(Debug, Clone)]
struct FieldRules {
    path: String,
    optional: bool,
    rules: Vec<Rule>,
}

// == Form Schema ==
/// Rule-based schema: an ordered list of fields, each with ordered rules.
///
/// Only the first failing rule of a field is reported.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    fields: Vec<FieldRules>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field whose rules always apply. A missing field validates as "".
    pub fn field(mut self, path: impl Into<String>, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.fields.push(FieldRules {
            path: path.into(),
            optional: false,
            rules: rules.into_iter().collect(),
        });
        self
    }

    /// Adds a field whose rules are skipped while it is empty.
    pub fn optional(
        mut self,
        path: impl Into<String>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Self {
        self.fields.push(FieldRules {
            path: path.into(),
            optional: true,
            rules: rules.into_iter().collect(),
        });
        self
    }
}

impl Schema for FormSchema {
    fn validate(&self, values: &FormValues) -> Result<(), Vec<FieldIssue>> {
        let issues: Vec<FieldIssue> = self
            .fields
            .iter()
            .filter_map(|field| {
                let value = values.get(&field.path).map(String::as_str).unwrap_or("");
                if field.optional && value.trim().is_empty() {
                    return None;
                }
                field
                    .rules
                    .iter()
                    .find_map(|rule| rule.check(value, values))
                    .map(|message| FieldIssue::new(&field.path, message))
            })
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

/// Loose address check: one `@`, a non-empty local part and a dotted domain.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty() && !domain.starts_with('.'),
        None => false,
    }
}
