//! Validation errors and their rendered diagnostics.
//!
//! Every failure is a [`ValidationError`] with a path (`age`,
//! `addresses[1].city`), a classified [`ErrorKind`], a message, a snapshot of
//! the received value, and a snapshot of the expected configuration. Errors are
//! collected into a [`ValidationResult`], whose rendering looks like:
//!
//! ```text
//! error[E0003]: validation failed for field 'age'
//!   --> schema::age
//!    |
//!    | Value 9.5 is less than the minimum value of 10
//!    |
//!    | received: 9.5
//!    | expected schema: {min: 10, inclusive: true}
//!    |
//!    = help: Check the 'age' value against the schema requirements
//! ```

use crate::error::{ModelError, Result};
use crate::value::Value;
use std::fmt;

/// Snapshot limit for scalar values, in characters.
pub const SCALAR_SNAPSHOT_LIMIT: usize = 100;
/// Snapshot limit for containers and nested models, in characters.
pub const COMPOSITE_SNAPSHOT_LIMIT: usize = 200;

/// Classification of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Value does not have the declared type
    TypeMismatch,
    /// `None` given for a field that does not accept it
    NoneNotAllowed,
    /// Number outside a minimum, maximum, or range
    BoundViolation,
    /// String or collection length outside its limits
    LengthViolation,
    /// String does not match a regex or substring check
    PatternMismatch,
    /// Value not among the allowed choices, or among the excluded ones
    MembershipViolation,
    /// Tuple with the wrong number of items
    ArityMismatch,
    /// Failure inside a nested model; the inner kind is kept separately
    NestedValidationFailure,
    /// Field not declared on the model, under the forbidding extra-field policy
    UnexpectedField,
    /// Failure reported by a user-registered validator without its own kind
    Custom,
}

impl ErrorKind {
    /// Diagnostic code shown in the rendered header.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "E0001",
            ErrorKind::NoneNotAllowed => "E0002",
            ErrorKind::BoundViolation => "E0003",
            ErrorKind::LengthViolation => "E0004",
            ErrorKind::PatternMismatch => "E0005",
            ErrorKind::MembershipViolation => "E0006",
            ErrorKind::ArityMismatch => "E0007",
            ErrorKind::NestedValidationFailure => "E0008",
            ErrorKind::UnexpectedField => "E0009",
            ErrorKind::Custom => "E0010",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::TypeMismatch => "type_mismatch",
            ErrorKind::NoneNotAllowed => "none_not_allowed",
            ErrorKind::BoundViolation => "bound_violation",
            ErrorKind::LengthViolation => "length_violation",
            ErrorKind::PatternMismatch => "pattern_mismatch",
            ErrorKind::MembershipViolation => "membership_violation",
            ErrorKind::ArityMismatch => "arity_mismatch",
            ErrorKind::NestedValidationFailure => "nested_validation_failure",
            ErrorKind::UnexpectedField => "unexpected_field",
            ErrorKind::Custom => "custom",
        }
    }

    /// Kinds after which the remaining checks of a field are skipped.
    pub fn is_fail_fast(&self) -> bool {
        matches!(self, ErrorKind::TypeMismatch | ErrorKind::NoneNotAllowed)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Truncates to `limit` characters, ending with `...` when shortened.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut out: String = text.chars().take(limit.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

fn limit_for(value: &Value) -> usize {
    if value.is_composite() {
        COMPOSITE_SNAPSHOT_LIMIT
    } else {
        SCALAR_SNAPSHOT_LIMIT
    }
}

/// Truncated plain-text form of a value, for use inside messages.
pub fn value_text(value: &Value) -> String {
    truncate(&value.to_string(), limit_for(value))
}

/// Truncated literal form of a value, for the `received:` snapshot.
pub fn value_repr(value: &Value) -> String {
    truncate(&value.repr(), limit_for(value))
}

/// Appends a child path to a parent path (`owner` + `city`, `tags` + `[2]`).
pub fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else if child.is_empty() {
        parent.to_string()
    } else if child.starts_with('[') {
        format!("{parent}{child}")
    } else {
        format!("{parent}.{child}")
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Dotted/indexed path of the failing value
    pub path: String,
    pub kind: ErrorKind,
    pub message: String,
    /// Truncated literal snapshot of the offending value
    pub received: Option<String>,
    /// Expected configuration, as ordered key/value pairs
    pub expected: Vec<(String, String)>,
    pub suggestion: Option<String>,
    /// Innermost kind, when `kind` is a nested validation failure
    pub nested_kind: Option<ErrorKind>,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
            received: None,
            expected: Vec::new(),
            suggestion: None,
            nested_kind: None,
        }
    }

    /// Type mismatch in the standard "Expected type X, got Y with value: Z" form.
    pub fn type_mismatch(path: impl Into<String>, expected: &str, value: &Value) -> Self {
        let message = format!(
            "Expected type {expected}, got {} with value: {}",
            value.type_name(),
            value_text(value)
        );
        Self::new(path, ErrorKind::TypeMismatch, message)
            .with_received(value)
            .with_expected(vec![("type".to_string(), expected.to_string())])
    }

    pub fn with_received(mut self, value: &Value) -> Self {
        self.received = Some(value_repr(value));
        self
    }

    pub fn with_expected(mut self, expected: Vec<(String, String)>) -> Self {
        self.expected = expected;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Root field name of the path.
    pub fn field(&self) -> &str {
        let end = self
            .path
            .find(['.', '['])
            .unwrap_or(self.path.len());
        &self.path[..end]
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Re-parents an error raised inside a nested value.
    ///
    /// The path is joined under `parent`, the message gains `prefix`, and the
    /// received snapshot becomes the containing element. The innermost kind is
    /// kept in `nested_kind`.
    pub fn nest(mut self, parent: &str, prefix: &str, element: &Value) -> Self {
        self.path = join_path(parent, &self.path);
        self.message = format!("{prefix}{}", self.message);
        self.nested_kind = match self.kind {
            ErrorKind::NestedValidationFailure => self.nested_kind,
            kind => Some(kind),
        };
        self.kind = ErrorKind::NestedValidationFailure;
        self.received = Some(value_repr(element));
        self
    }

    /// Renders the multi-line diagnostic block.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!(
                "error[{}]: validation failed for field '{}'",
                self.code(),
                self.path
            ),
            format!("  --> schema::{}", self.path),
            "   |".to_string(),
            format!("   | {}", self.message),
            "   |".to_string(),
        ];

        if let Some(received) = &self.received {
            lines.push(format!("   | received: {received}"));
            if let Some((offset, width)) = self.caret(received) {
                lines.push(format!(
                    "   |           {}{}",
                    " ".repeat(offset),
                    "^".repeat(width)
                ));
            }
        }

        let expected: Vec<String> = self
            .expected
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect();
        lines.push(format!("   | expected schema: {{{}}}", expected.join(", ")));
        lines.push("   |".to_string());

        let help = self.suggestion.clone().unwrap_or_else(|| {
            format!(
                "Check the '{}' value against the schema requirements",
                self.path
            )
        });
        lines.push(format!("   = help: {help}"));
        lines.join("\n")
    }

    /// Locates the quoted problem key inside the received snapshot.
    fn caret(&self, received: &str) -> Option<(usize, usize)> {
        let last = self.path.rsplit('.').next().unwrap_or(&self.path);
        let last = last.split('[').next().unwrap_or(last);
        let mut candidates = vec![last];
        if self.field() != last {
            candidates.push(self.field());
        }

        candidates.into_iter().find_map(|key| {
            if key.is_empty() {
                return None;
            }
            let quoted = format!("'{key}'");
            received.find(&quoted).map(|byte_pos| {
                (
                    received[..byte_pos].chars().count(),
                    key.chars().count() + 2,
                )
            })
        })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Aggregate outcome of validating a model instance or a single field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff there are no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    /// Errors whose root field is `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field() == field)
    }

    /// One-line count, e.g. `2 validation errors`.
    pub fn summary(&self) -> String {
        match self.errors.len() {
            1 => "1 validation error".to_string(),
            n => format!("{n} validation errors"),
        }
    }

    /// All diagnostic blocks, separated by blank lines.
    pub fn render(&self) -> String {
        self.errors
            .iter()
            .map(ValidationError::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// `Ok(())` when valid, otherwise a [`ModelError::Validation`].
    pub fn into_result(self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ModelError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            f.write_str("validation passed")
        } else {
            f.write_str(&self.render())
        }
    }
}

impl From<Vec<ValidationError>> for ValidationResult {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self { errors }
    }
}

impl Extend<ValidationError> for ValidationResult {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl IntoIterator for ValidationResult {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Mapping;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_error_kind_codes() {
        let kinds = [
            ErrorKind::TypeMismatch,
            ErrorKind::NoneNotAllowed,
            ErrorKind::BoundViolation,
            ErrorKind::LengthViolation,
            ErrorKind::PatternMismatch,
            ErrorKind::MembershipViolation,
            ErrorKind::ArityMismatch,
            ErrorKind::NestedValidationFailure,
            ErrorKind::UnexpectedField,
            ErrorKind::Custom,
        ];
        let codes: Vec<String> = kinds.iter().map(|k| k.code().to_string()).collect();
        let expected: Vec<String> = (1..=10).map(|n| format!("E{n:04}")).collect();
        assert_eq!(codes, expected);

        assert_eq!(ErrorKind::NestedValidationFailure.to_string(), "nested_validation_failure");
        let fail_fast: Vec<ErrorKind> = kinds.into_iter().filter(ErrorKind::is_fail_fast).collect();
        assert_eq!(fail_fast, vec![ErrorKind::TypeMismatch, ErrorKind::NoneNotAllowed]);
    }

    #[test]
    fn test_render_scalar_error() {
        let error = ValidationError::new(
            "age",
            ErrorKind::BoundViolation,
            "Value 9.5 is less than the minimum value of 10",
        )
        .with_received(&Value::Float(9.5))
        .with_expected(vec![
            ("min".to_string(), "10".to_string()),
            ("inclusive".to_string(), "true".to_string()),
        ]);

        let expected = "\
error[E0003]: validation failed for field 'age'
  --> schema::age
   |
   | Value 9.5 is less than the minimum value of 10
   |
   | received: 9.5
   | expected schema: {min: 10, inclusive: true}
   |
   = help: Check the 'age' value against the schema requirements";
        assert_eq!(error.render(), expected);
    }

    #[test]
    fn test_render_places_caret_under_key() {
        let element = Value::from(Mapping::new().with("street", "Main").with("city", 123));
        let error = ValidationError::type_mismatch("city", "str", &Value::Int(123)).nest(
            "addresses[1]",
            "Item at index 1: ",
            &element,
        );

        assert_eq!(error.path, "addresses[1].city");
        assert_eq!(error.kind, ErrorKind::NestedValidationFailure);
        assert_eq!(error.nested_kind, Some(ErrorKind::TypeMismatch));
        assert_eq!(
            error.message,
            "Item at index 1: Expected type str, got int with value: 123"
        );

        let rendered = error.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[5], "   | received: {'street': 'Main', 'city': 123}");
        let received_at = lines[5].find("'city'").unwrap();
        let caret_at = lines[6].find('^').unwrap();
        assert_eq!(received_at, caret_at);
        assert_eq!(lines[6].trim_start_matches([' ', '|']).len(), "'city'".len());
    }

    #[test]
    fn test_truncation_limits() {
        let long = "x".repeat(150);
        let text = value_text(&Value::from(long.as_str()));
        assert_eq!(text.chars().count(), SCALAR_SNAPSHOT_LIMIT);
        assert!(text.ends_with("..."));

        let list = Value::list(vec![Value::from(long.as_str()); 3]);
        assert_eq!(value_repr(&list).chars().count(), COMPOSITE_SNAPSHOT_LIMIT);
    }

    #[test]
    fn test_field_root() {
        let error = ValidationError::new("addresses[1].city", ErrorKind::TypeMismatch, "x");
        assert_eq!(error.field(), "addresses");
        let error = ValidationError::new("owner.city", ErrorKind::TypeMismatch, "x");
        assert_eq!(error.field(), "owner");
    }

    #[test]
    fn test_result_render_and_into_result() {
        let mut result = ValidationResult::new();
        assert!(result.is_valid());
        assert!(result.clone().into_result().is_ok());

        result.push(ValidationError::new("a", ErrorKind::NoneNotAllowed, "first"));
        result.push(ValidationError::new("b", ErrorKind::TypeMismatch, "second"));
        assert_eq!(result.summary(), "2 validation errors");
        assert_eq!(result.render().matches("error[").count(), 2);
        assert!(result.render().contains("\n\nerror[E0001]"));

        let err = result.into_result().unwrap_err();
        assert!(err.to_string().starts_with("error[E0002]"));
    }
}
