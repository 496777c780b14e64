// Common validation types and traits
//
// A `Schema` is an ordered list of fields, each holding an ordered chain of
// rules. Every rule on a field is evaluated, so one input can collect several
// messages for the same field. Rules see the value as submitted; `trim` only
// shapes the value handed onward and the cross-field comparison.

use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: &str, message: &str) {
        self.is_valid = false;
        self.errors.push(ValidationError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    /// Messages recorded for one field, in rule order.
    #[cfg(test)]
    pub fn messages_for(&self, field: &str) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

pub trait Validator<T> {
    fn validate(&self, data: &T) -> ValidationResult;
}

/// Read access to named form values.
///
/// Absent fields validate as empty strings.
pub trait FormFields {
    fn field(&self, name: &str) -> Option<&str>;
}

// ============================================================================
// Predicate chains
// ============================================================================

/// A single predicate a field value must satisfy.
#[derive(Debug, Clone)]
pub enum Check {
    /// Non-empty after trimming.
    Required,
    /// At least this many Unicode scalar values.
    MinLength(usize),
    /// Syntactically valid email address.
    Email,
    /// The pattern must match somewhere in the value.
    Pattern(Regex),
    /// At least one character from the set.
    ContainsAny(&'static str),
    /// Equal to another field, both sides compared after their `trim` setting.
    EqualsField(&'static str),
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub check: Check,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub trim: bool,
    pub rules: Vec<Rule>,
}

impl FieldSchema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            trim: false,
            rules: Vec::new(),
        }
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn rule(mut self, check: Check, message: impl Into<String>) -> Self {
        self.rules.push(Rule {
            check,
            message: message.into(),
        });
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(Check::Required, message)
    }

    pub fn min_length(self, min: usize, message: impl Into<String>) -> Self {
        self.rule(Check::MinLength(min), message)
    }

    pub fn email(self, message: impl Into<String>) -> Self {
        self.rule(Check::Email, message)
    }

    pub fn pattern(self, regex: &Regex, message: impl Into<String>) -> Self {
        self.rule(Check::Pattern(regex.clone()), message)
    }

    pub fn contains_any(self, set: &'static str, message: impl Into<String>) -> Self {
        self.rule(Check::ContainsAny(set), message)
    }

    pub fn equals_field(self, other: &'static str, message: impl Into<String>) -> Self {
        self.rule(Check::EqualsField(other), message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub fields: Vec<FieldSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Field value after the field's `trim` setting.
    pub fn cleaned<'a>(&self, form: &'a dyn FormFields, name: &str) -> &'a str {
        let raw = form.field(name).unwrap_or("");
        let trim = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .map_or(false, |f| f.trim);
        if trim {
            raw.trim()
        } else {
            raw
        }
    }
}

impl<T: FormFields> Validator<T> for Schema {
    fn validate(&self, data: &T) -> ValidationResult {
        let mut result = ValidationResult::new();

        for field in &self.fields {
            let value = data.field(field.name).unwrap_or("");
            for rule in &field.rules {
                let ok = match &rule.check {
                    Check::Required => !value.trim().is_empty(),
                    Check::MinLength(min) => value.chars().count() >= *min,
                    Check::Email => is_valid_email(value),
                    Check::Pattern(regex) => regex.is_match(value),
                    Check::ContainsAny(set) => value.chars().any(|c| set.contains(c)),
                    Check::EqualsField(other) => {
                        self.cleaned(data, field.name) == self.cleaned(data, other)
                    }
                };
                if !ok {
                    result.add_error(field.name, &rule.message);
                }
            }
        }

        result
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Email syntax check: a dot-free edge local part without `..`, an `@`, and a
/// dotted domain whose last label has at least two letters.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    if local.is_empty() || local.starts_with('.') || email.contains("..") {
        return false;
    }
    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '\'' | '+' | '-' | '.'));
    if !local_ok || local.ends_with(['.', '\'']) {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, hosts)) = labels.split_last() else {
        return false;
    };
    if hosts.is_empty() {
        return false;
    }
    let hosts_ok = hosts.iter().all(|label| {
        label
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_alphanumeric())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });

    hosts_ok && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}
