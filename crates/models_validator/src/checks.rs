//! Inline checks: run one validator against one value outside any model.
//!
//! The field name is always passed explicitly; it only appears in messages
//! and paths.
//!
//! ```rust
//! use models_core::{ValidatorSpec, Value};
//! use models_validator::checks;
//!
//! let fruit = checks::run(
//!     "fruit",
//!     "APPLE",
//!     &ValidatorSpec::one_of(["apple", "banana"]).case_insensitive(),
//! )
//! .unwrap();
//! assert_eq!(fruit, Value::from("apple"));
//!
//! let err = checks::run("age", 3, &ValidatorSpec::min(18)).unwrap_err();
//! assert!(err.to_string().contains("Value 3 is less than the minimum value of 18"));
//! ```

use crate::engine::{compile_pattern, outcome_error};
use crate::registry::ValidatorRegistry;
use crate::validator::ValidationInput;
use models_core::{ModelError, Result, TypeDescriptor, ValidationResult, ValidatorSpec, Value};

/// Runs `spec` on `value` with the built-in registry.
///
/// Returns the value, transformed if the validator transforms it.
///
/// # Errors
///
/// Returns a configuration error for unregistered kinds,
/// [`ModelError::InvalidPattern`] for a pattern that does not compile, and
/// [`ModelError::Validation`] when the check fails.
pub fn run(field: &str, value: impl Into<Value>, spec: &ValidatorSpec) -> Result<Value> {
    run_with(&ValidatorRegistry::global(), field, value, spec)
}

/// Like [`run`], with a specific registry (for custom kinds).
pub fn run_with(
    registry: &ValidatorRegistry,
    field: &str,
    value: impl Into<Value>,
    spec: &ValidatorSpec,
) -> Result<Value> {
    let value = value.into();
    let registration = registry.get(spec.kind()).ok_or_else(|| {
        ModelError::configuration(format!(
            "Unknown validator kind '{}' for inline check on '{}'",
            spec.kind(),
            field
        ))
    })?;

    if value.is_none() && registration.skip_on_none() {
        return Ok(value);
    }

    let compiled = compile_pattern(field, spec)?;
    let descriptor = TypeDescriptor::any();
    let mut input = ValidationInput::new(field, &value, &descriptor);
    if let Some(regex) = &compiled {
        input = input.with_pattern(regex);
    }
    let outcome = registration.validator().check(spec, &input);
    if outcome.is_valid() {
        return Ok(outcome.transformed.unwrap_or(value));
    }

    let error = outcome_error(field, spec.kind(), Some(spec), outcome, &value);
    Err(ModelError::Validation(ValidationResult::from(vec![error])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use models_core::ErrorKind;

    #[test]
    fn test_passing_check_returns_value() {
        let value = run("name", "alice", &ValidatorSpec::min_length(3)).unwrap();
        assert_eq!(value, Value::from("alice"));
    }

    #[test]
    fn test_failure_carries_field_path() {
        let err = run("code", "ab", &ValidatorSpec::pattern(r"^\d+$")).unwrap_err();
        let result = err.validation_result().unwrap();
        assert_eq!(result.errors()[0].path, "code");
        assert_eq!(result.errors()[0].kind, ErrorKind::PatternMismatch);
    }

    #[test]
    fn test_none_skipped_for_rule_kinds() {
        assert_eq!(run("x", Value::None, &ValidatorSpec::min(1)).unwrap(), Value::None);
        assert!(run("x", Value::None, &ValidatorSpec::required()).is_err());
    }

    #[test]
    fn test_invalid_pattern_is_configuration_error() {
        let err = run("code", "ab", &ValidatorSpec::pattern("(unclosed")).unwrap_err();
        assert!(matches!(err, ModelError::InvalidPattern { ref field, .. } if field == "code"));
    }

    #[test]
    fn test_unknown_kind() {
        let spec = ValidatorSpec::custom("even", Default::default());
        let err = run("x", 2, &spec).unwrap_err();
        assert!(err.is_configuration());
    }
}
