//! The validator abstraction.
//!
//! A [`Validator`] exposes two checks: an explicit one, driven by the
//! [`ValidatorSpec`] attached to a field, and a default one, run on fields that
//! carry no attachment of that kind. Both return a [`ValidationOutcome`].

use models_core::{ErrorKind, TypeDescriptor, Value, ValidatorSpec};
use regex::Regex;

/// What a validator sees when checking a single field value.
#[derive(Debug, Clone, Copy)]
pub struct ValidationInput<'a> {
    /// Field name (or path) reported in messages
    pub field: &'a str,
    pub value: &'a Value,
    pub descriptor: &'a TypeDescriptor,
    /// Whether `None` is acceptable for the field
    pub nullable: bool,
    /// Regex compiled from a pattern spec when the field was bound
    pub pattern: Option<&'a Regex>,
}

impl<'a> ValidationInput<'a> {
    pub fn new(field: &'a str, value: &'a Value, descriptor: &'a TypeDescriptor) -> Self {
        Self {
            field,
            value,
            descriptor,
            nullable: descriptor.is_nullable(),
            pattern: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_pattern(mut self, pattern: &'a Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }
}

/// Result of a single check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub valid: bool,
    pub message: Option<String>,
    /// Failure classification; unset means the engine picks a generic kind
    pub kind: Option<ErrorKind>,
    /// Replacement value for subsequent checks and the cached field value
    pub transformed: Option<Value>,
    /// Expected configuration shown in the diagnostic
    pub expected: Vec<(String, String)>,
    /// Sub-path below the field, e.g. `[2]`
    pub context: Option<String>,
}

impl ValidationOutcome {
    /// A passing outcome that leaves the value unchanged.
    pub fn valid() -> Self {
        Self {
            valid: true,
            message: None,
            kind: None,
            transformed: None,
            expected: Vec::new(),
            context: None,
        }
    }

    /// A passing outcome that replaces the value.
    pub fn transformed(value: Value) -> Self {
        Self {
            transformed: Some(value),
            ..Self::valid()
        }
    }

    pub fn fail(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: Some(message.into()),
            kind: Some(kind),
            ..Self::valid()
        }
    }

    pub fn with_expected(mut self, expected: Vec<(String, String)>) -> Self {
        self.expected = expected;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// A rule that can check field values.
///
/// Implementations must be stateless with respect to the values they check;
/// they are shared across threads through the registry.
pub trait Validator: Send + Sync {
    /// Runs the explicitly configured check.
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome;

    /// Runs the check applied when the field has no attachment of this kind.
    ///
    /// Default implementation accepts everything.
    fn default_check(&self, _input: &ValidationInput<'_>) -> ValidationOutcome {
        ValidationOutcome::valid()
    }
}

/// Fails with a type mismatch unless the value is a number.
pub(crate) fn expect_number(input: &ValidationInput<'_>) -> Result<models_core::Number, ValidationOutcome> {
    input.value.as_number().ok_or_else(|| {
        ValidationOutcome::fail(
            ErrorKind::TypeMismatch,
            format!(
                "Expected a number for field '{}', got {}",
                input.field,
                input.value.type_name()
            ),
        )
    })
}

/// Fails with a type mismatch unless the value is a string.
pub(crate) fn expect_str<'a>(input: &ValidationInput<'a>) -> Result<&'a str, ValidationOutcome> {
    input.value.as_str().ok_or_else(|| {
        ValidationOutcome::fail(
            ErrorKind::TypeMismatch,
            format!(
                "Expected a string for field '{}', got {}",
                input.field,
                input.value.type_name()
            ),
        )
    })
}

/// Fails when the spec handed to a validator is not the kind it handles.
pub(crate) fn mismatched_spec(kind: &str, spec: &ValidatorSpec) -> ValidationOutcome {
    ValidationOutcome::fail(
        ErrorKind::Custom,
        format!(
            "Validator '{kind}' cannot run a '{}' configuration",
            spec.kind()
        ),
    )
}
