//! Declarative input validation.
//!
//! A [`Schema`] is an ordered list of fields, each carrying a tagged set of
//! [`Rule`]s. [`Schema::validate`] interprets the rules against a JSON payload and
//! returns either the normalised payload or every field violation found.
//!
//! The same interpreter serves request bodies, query strings and path parameters;
//! string inputs are coerced for integer fields so all three sources behave alike.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::DomainError;

/// How a field failed, which decides the status code the caller sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Absent, null or blank.
    Missing,
    /// Present but malformed (wrong type, unknown field, out of range).
    Invalid,
    /// Present and well-formed but rejected by a content policy.
    Policy,
}

/// A violation raised by a single rule, before it is attached to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn missing(message: impl Into<String>) -> Self {
        Self { kind: ViolationKind::Missing, message: message.into() }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self { kind: ViolationKind::Invalid, message: message.into() }
    }

    pub fn policy(message: impl Into<String>) -> Self {
        Self { kind: ViolationKind::Policy, message: message.into() }
    }
}

/// A violation attached to the field that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    #[serde(skip)]
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldViolation {
    fn new(field: &str, violation: Violation) -> Self {
        Self {
            field: field.to_string(),
            kind: violation.kind,
            message: violation.message,
        }
    }
}

impl From<FieldViolation> for DomainError {
    fn from(v: FieldViolation) -> Self {
        match v.kind {
            ViolationKind::Missing => DomainError::MissingField(v.message),
            ViolationKind::Invalid => DomainError::Validation(v.message),
            ViolationKind::Policy => DomainError::PolicyViolation(v.message),
        }
    }
}

/// Custom content check applied to a string field.
pub type CheckFn = fn(&str) -> Result<(), Violation>;

/// A single validation rule.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Field must be present and non-blank.
    Required,
    /// String, trimmed.
    Text,
    /// String, kept verbatim (passwords).
    Secret,
    /// Integer within optional bounds; numeric strings are accepted.
    Integer { min: Option<i64>, max: Option<i64> },
    /// Email address, lowercased.
    Email,
    /// UUID in canonical textual form.
    Uuid,
    /// One of a fixed set of strings.
    OneOf(&'static [&'static str]),
    MinLength(usize),
    MaxLength(usize),
    /// Array of non-blank strings, each trimmed.
    TextList,
    Check(CheckFn),
}

/// One field of a [`Schema`].
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    /// Capitalised name used in messages ("Email is required").
    pub label: &'static str,
    pub rules: Vec<Rule>,
}

impl FieldSchema {
    fn is_required(&self) -> bool {
        self.rules.iter().any(|r| matches!(r, Rule::Required))
    }

    fn apply(&self, value: &Value) -> Result<Value, Violation> {
        let mut current = value.clone();
        for rule in &self.rules {
            current = apply_rule(*rule, self.label, current)?;
        }
        Ok(current)
    }
}

/// An ordered set of field rules.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(
        mut self,
        name: &'static str,
        label: &'static str,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Self {
        self.fields.push(FieldSchema {
            name,
            label,
            rules: rules.into_iter().collect(),
        });
        self
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Validate `payload` against the schema.
    ///
    /// Fields are checked in schema order and each contributes at most one
    /// violation. Optional fields that are absent or blank are dropped from the
    /// output. Unknown fields are reported after all declared ones.
    pub fn validate(&self, payload: &Value) -> Result<Map<String, Value>, Vec<FieldViolation>> {
        let empty = Map::new();
        let obj = match payload {
            Value::Object(map) => map,
            Value::Null => &empty,
            _ => {
                return Err(vec![FieldViolation::new(
                    "",
                    Violation::invalid("payload must be an object"),
                )]);
            }
        };

        let mut out = Map::new();
        let mut violations = Vec::new();

        for field in &self.fields {
            let Some(value) = obj.get(field.name).filter(|v| !is_blank(v)) else {
                if field.is_required() {
                    violations.push(FieldViolation::new(
                        field.name,
                        Violation::missing(format!("{} is required", field.label)),
                    ));
                }
                continue;
            };

            match field.apply(value) {
                Ok(normalised) => {
                    out.insert(field.name.to_string(), normalised);
                }
                Err(v) => violations.push(FieldViolation::new(field.name, v)),
            }
        }

        for key in obj.keys() {
            if !self.fields.iter().any(|f| f.name == key) {
                violations.push(FieldViolation::new(
                    key,
                    Violation::invalid(format!("{key} is not allowed")),
                ));
            }
        }

        if violations.is_empty() {
            Ok(out)
        } else {
            Err(violations)
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn as_text<'a>(value: &'a Value, label: &str) -> Result<&'a str, Violation> {
    value
        .as_str()
        .ok_or_else(|| Violation::invalid(format!("{label} must be a string")))
}

fn apply_rule(rule: Rule, label: &str, value: Value) -> Result<Value, Violation> {
    match rule {
        Rule::Required => Ok(value),
        Rule::Text => Ok(Value::String(as_text(&value, label)?.trim().to_string())),
        Rule::Secret => {
            as_text(&value, label)?;
            Ok(value)
        }
        Rule::Integer { min, max } => {
            let n = match &value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| Violation::invalid(format!("{label} must be an integer")))?;

            if let Some(min) = min.filter(|m| n < *m) {
                return Err(Violation::invalid(format!(
                    "{label} must be greater than or equal to {min}"
                )));
            }
            if let Some(max) = max.filter(|m| n > *m) {
                return Err(Violation::invalid(format!(
                    "{label} must be less than or equal to {max}"
                )));
            }
            Ok(Value::from(n))
        }
        Rule::Email => {
            let s = as_text(&value, label)?.trim();
            if !looks_like_email(s) {
                return Err(Violation::invalid(format!("{label} must be a valid email")));
            }
            Ok(Value::String(s.to_lowercase()))
        }
        Rule::Uuid => {
            let s = as_text(&value, label)?.trim();
            let id = uuid::Uuid::parse_str(s)
                .map_err(|_| Violation::invalid(format!("{label} must be a valid id")))?;
            Ok(Value::String(id.to_string()))
        }
        Rule::OneOf(options) => {
            let s = as_text(&value, label)?;
            if !options.contains(&s) {
                return Err(Violation::invalid(format!(
                    "{label} must be one of [{}]",
                    options.join(", ")
                )));
            }
            Ok(value)
        }
        Rule::MinLength(n) => {
            if as_text(&value, label)?.chars().count() < n {
                return Err(Violation::invalid(format!(
                    "{label} must be at least {n} characters long"
                )));
            }
            Ok(value)
        }
        Rule::MaxLength(n) => {
            if as_text(&value, label)?.chars().count() > n {
                return Err(Violation::invalid(format!(
                    "{label} must be at most {n} characters long"
                )));
            }
            Ok(value)
        }
        Rule::TextList => {
            let invalid = || Violation::invalid(format!("{label} must be a list of strings"));
            let items = value.as_array().ok_or_else(invalid)?;
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let s = item.as_str().map(str::trim).filter(|s| !s.is_empty());
                out.push(Value::String(s.ok_or_else(invalid)?.to_string()));
            }
            Ok(Value::Array(out))
        }
        Rule::Check(check) => {
            check(as_text(&value, label)?)?;
            Ok(value)
        }
    }
}

/// Structural email check: one `@`, a non-empty local part, and a dotted domain.
fn looks_like_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_digits(s: &str) -> Result<(), Violation> {
        if s.chars().any(|c| c.is_ascii_digit()) {
            Err(Violation::policy("digits are not welcome here"))
        } else {
            Ok(())
        }
    }

    fn signup() -> Schema {
        Schema::new()
            .field("email", "Email", [Rule::Required, Rule::Email])
            .field("firstname", "Firstname", [Rule::Required, Rule::Text])
            .field("nickname", "Nickname", [Rule::Text, Rule::Check(no_digits)])
            .field("age", "Age", [Rule::Integer { min: Some(0), max: Some(150) }])
    }

    #[test]
    fn missing_and_blank_fields_report_label_is_required() {
        let errs = signup()
            .validate(&json!({ "email": "", "firstname": null }))
            .unwrap_err();

        assert_eq!(errs.len(), 2);
        assert_eq!(errs[0].field, "email");
        assert_eq!(errs[0].kind, ViolationKind::Missing);
        assert_eq!(errs[0].message, "Email is required");
        assert_eq!(errs[1].message, "Firstname is required");
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let errs = signup()
            .validate(&json!({ "email": "a@b.com", "firstname": "   " }))
            .unwrap_err();
        assert_eq!(errs[0].message, "Firstname is required");
    }

    #[test]
    fn valid_payload_is_normalised() {
        let out = signup()
            .validate(&json!({ "email": " John@Example.COM ", "firstname": "  John ", "age": "42" }))
            .unwrap();

        assert_eq!(out["email"], "john@example.com");
        assert_eq!(out["firstname"], "John");
        assert_eq!(out["age"], 42);
        assert!(!out.contains_key("nickname"));
    }

    #[test]
    fn unknown_fields_are_rejected_after_declared_ones() {
        let errs = signup()
            .validate(&json!({ "firstname": "x", "admin": true }))
            .unwrap_err();

        assert_eq!(errs[0].message, "Email is required");
        assert_eq!(errs[1].field, "admin");
        assert_eq!(errs[1].message, "admin is not allowed");
        assert_eq!(errs[1].kind, ViolationKind::Invalid);
    }

    #[test]
    fn integer_bounds_are_enforced() {
        let errs = signup()
            .validate(&json!({ "email": "a@b.com", "firstname": "x", "age": -1 }))
            .unwrap_err();
        assert_eq!(errs[0].message, "Age must be greater than or equal to 0");

        let errs = signup()
            .validate(&json!({ "email": "a@b.com", "firstname": "x", "age": "old" }))
            .unwrap_err();
        assert_eq!(errs[0].message, "Age must be an integer");
    }

    #[test]
    fn custom_checks_keep_their_violation_kind() {
        let errs = signup()
            .validate(&json!({ "email": "a@b.com", "firstname": "x", "nickname": "r2d2" }))
            .unwrap_err();
        assert_eq!(errs[0].kind, ViolationKind::Policy);
        assert_eq!(errs[0].message, "digits are not welcome here");
    }

    #[test]
    fn malformed_email_is_invalid() {
        for bad in ["plain", "a@b", "@b.com", "a b@c.com", "a@@b.com", "a@b..com"] {
            let errs = signup()
                .validate(&json!({ "email": bad, "firstname": "x" }))
                .unwrap_err();
            assert_eq!(errs[0].message, "Email must be a valid email", "input: {bad}");
        }
    }

    #[test]
    fn type_mismatch_is_invalid() {
        let errs = signup()
            .validate(&json!({ "email": 12, "firstname": "x" }))
            .unwrap_err();
        assert_eq!(errs[0].message, "Email must be a string");
    }

    #[test]
    fn one_of_uuid_and_lists() {
        let schema = Schema::new()
            .field("id", "Id", [Rule::Required, Rule::Uuid])
            .field("sort", "Sort", [Rule::OneOf(&["newest", "votes"])])
            .field("tags", "Tags", [Rule::TextList]);

        let errs = schema
            .validate(&json!({ "id": "nope", "sort": "random", "tags": ["ok", ""] }))
            .unwrap_err();
        assert_eq!(errs[0].message, "Id must be a valid id");
        assert_eq!(errs[1].message, "Sort must be one of [newest, votes]");
        assert_eq!(errs[2].message, "Tags must be a list of strings");

        let out = schema
            .validate(&json!({
                "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "tags": [" rust ", "axum"]
            }))
            .unwrap();
        assert_eq!(out["tags"], json!(["rust", "axum"]));
    }

    #[test]
    fn null_payload_is_treated_as_empty_and_scalars_are_rejected() {
        let errs = signup().validate(&Value::Null).unwrap_err();
        assert_eq!(errs.len(), 2);

        let errs = signup().validate(&json!("string")).unwrap_err();
        assert_eq!(errs[0].message, "payload must be an object");
    }

    #[test]
    fn field_violation_maps_to_domain_error() {
        let v = FieldViolation::new("password", Violation::policy("weak"));
        assert_eq!(DomainError::from(v), DomainError::PolicyViolation("weak".into()));
    }
}
