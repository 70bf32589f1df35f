//! None-allowance and required validators.
//!
//! These two kinds run before type matching and also see `None` values. Their
//! default checks reject `None` on fields whose type is not nullable.

use crate::validator::{ValidationInput, ValidationOutcome, Validator, mismatched_spec};
use models_core::{ErrorKind, ValidatorSpec};

fn none_rejected(input: &ValidationInput<'_>) -> ValidationOutcome {
    ValidationOutcome::fail(
        ErrorKind::NoneNotAllowed,
        format!("None value is not allowed for field '{}'", input.field),
    )
}

/// Accepts or rejects `None` for a field.
pub struct NoneAllowanceValidator;

impl Validator for NoneAllowanceValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        let ValidatorSpec::NoneAllowance { allow } = spec else {
            return mismatched_spec("none_allowance", spec);
        };
        if input.value.is_none() && !allow {
            return none_rejected(input).with_expected(spec.expected());
        }
        ValidationOutcome::valid()
    }

    fn default_check(&self, input: &ValidationInput<'_>) -> ValidationOutcome {
        if input.value.is_none() && !input.nullable {
            return none_rejected(input)
                .with_expected(vec![("type".to_string(), input.descriptor.to_string())]);
        }
        ValidationOutcome::valid()
    }
}

/// Rejects `None` unconditionally when attached.
pub struct RequiredValidator;

impl RequiredValidator {
    fn missing(input: &ValidationInput<'_>) -> ValidationOutcome {
        ValidationOutcome::fail(
            ErrorKind::NoneNotAllowed,
            format!("Field '{}' is required and cannot be None", input.field),
        )
    }
}

impl Validator for RequiredValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        if !matches!(spec, ValidatorSpec::Required) {
            return mismatched_spec("required", spec);
        }
        if input.value.is_none() {
            return Self::missing(input).with_expected(spec.expected());
        }
        ValidationOutcome::valid()
    }

    fn default_check(&self, input: &ValidationInput<'_>) -> ValidationOutcome {
        if input.value.is_none() && !input.nullable {
            return Self::missing(input)
                .with_expected(vec![("type".to_string(), input.descriptor.to_string())]);
        }
        ValidationOutcome::valid()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models_core::{TypeDescriptor, Value};

    #[test]
    fn test_default_rejects_none_on_non_nullable() {
        let descriptor = TypeDescriptor::int();
        let input = ValidationInput::new("age", &Value::None, &descriptor);

        let outcome = NoneAllowanceValidator.default_check(&input);
        assert!(!outcome.is_valid());
        assert_eq!(outcome.kind, Some(ErrorKind::NoneNotAllowed));
        assert_eq!(
            outcome.message.as_deref(),
            Some("None value is not allowed for field 'age'")
        );
    }

    #[test]
    fn test_default_accepts_none_on_optional() {
        let descriptor = TypeDescriptor::optional(TypeDescriptor::int());
        let input = ValidationInput::new("age", &Value::None, &descriptor);
        assert!(NoneAllowanceValidator.default_check(&input).is_valid());
        assert!(RequiredValidator.default_check(&input).is_valid());
    }

    #[test]
    fn test_explicit_allow_overrides_descriptor() {
        let descriptor = TypeDescriptor::int();
        let input = ValidationInput::new("age", &Value::None, &descriptor);
        let outcome = NoneAllowanceValidator.check(&ValidatorSpec::allow_none(true), &input);
        assert!(outcome.is_valid());

        let outcome = NoneAllowanceValidator.check(&ValidatorSpec::allow_none(false), &input);
        assert!(!outcome.is_valid());
    }

    #[test]
    fn test_required_rejects_none_even_when_nullable() {
        let descriptor = TypeDescriptor::optional(TypeDescriptor::string());
        let input = ValidationInput::new("nick", &Value::None, &descriptor);
        let outcome = RequiredValidator.check(&ValidatorSpec::Required, &input);
        assert_eq!(
            outcome.message.as_deref(),
            Some("Field 'nick' is required and cannot be None")
        );

        let present = Value::from("x");
        let input = ValidationInput::new("nick", &present, &descriptor);
        assert!(RequiredValidator.check(&ValidatorSpec::Required, &input).is_valid());
    }
}
