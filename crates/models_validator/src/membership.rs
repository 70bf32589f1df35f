//! Membership validators: one-of and not-in.
//!
//! A case-insensitive one-of match transforms the value to the spelling used
//! in the allowed list.

use crate::validator::{ValidationInput, ValidationOutcome, Validator, mismatched_spec};
use models_core::{ErrorKind, Value, ValidatorSpec};

const CASE_INSENSITIVE: &str = " (case-insensitive)";

fn listing(members: &[Value]) -> String {
    members
        .iter()
        .map(Value::repr)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Finds the member equal to `value`, ignoring case for strings when asked.
fn find_member<'a>(members: &'a [Value], value: &Value, case_sensitive: bool) -> Option<&'a Value> {
    match value {
        Value::Str(text) if !case_sensitive => {
            let lowered = text.to_lowercase();
            members
                .iter()
                .find(|m| m.as_str().is_some_and(|s| s.to_lowercase() == lowered))
        }
        _ => members.iter().find(|m| *m == value),
    }
}

pub struct OneOfValidator;

impl Validator for OneOfValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        let ValidatorSpec::OneOf {
            enum_class,
            case_sensitive,
            ..
        } = spec
        else {
            return mismatched_spec("one_of", spec);
        };
        let members = spec.members();
        let case_sensitive = *case_sensitive || input.value.as_str().is_none();

        if let Some(member) = find_member(members, input.value, case_sensitive) {
            if let (Value::Str(canonical), Value::Str(given)) = (member, input.value) {
                if canonical != given {
                    return ValidationOutcome::transformed(member.clone());
                }
            }
            return ValidationOutcome::valid();
        }

        let suffix = if case_sensitive { "" } else { CASE_INSENSITIVE };
        let message = match enum_class {
            Some(enum_class) => format!(
                "Value '{}' is not a valid {} value. Valid values are: {}{suffix}",
                input.value,
                enum_class.name,
                listing(members)
            ),
            None => format!(
                "Value '{}' is not in the set of allowed values: {}{suffix}",
                input.value,
                listing(members)
            ),
        };
        ValidationOutcome::fail(ErrorKind::MembershipViolation, message)
            .with_expected(spec.expected())
    }
}

pub struct NotInValidator;

impl Validator for NotInValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        let ValidatorSpec::NotIn { case_sensitive, .. } = spec else {
            return mismatched_spec("not_in", spec);
        };
        let members = spec.members();
        let case_sensitive = *case_sensitive || input.value.as_str().is_none();

        if find_member(members, input.value, case_sensitive).is_none() {
            return ValidationOutcome::valid();
        }

        let suffix = if case_sensitive { "" } else { CASE_INSENSITIVE };
        ValidationOutcome::fail(
            ErrorKind::MembershipViolation,
            format!(
                "Value '{}' is in the set of disallowed values: {}{suffix}",
                input.value,
                listing(members)
            ),
        )
        .with_expected(spec.expected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models_core::{EnumClass, TypeDescriptor};

    fn run(validator: &dyn Validator, spec: &ValidatorSpec, value: Value) -> ValidationOutcome {
        let descriptor = TypeDescriptor::any();
        let input = ValidationInput::new("fruit", &value, &descriptor);
        validator.check(spec, &input)
    }

    #[test]
    fn test_one_of_case_insensitive_canonicalizes() {
        let spec = ValidatorSpec::one_of(["apple", "banana"]).case_insensitive();
        let outcome = run(&OneOfValidator, &spec, Value::from("APPLE"));
        assert!(outcome.is_valid());
        assert_eq!(outcome.transformed, Some(Value::from("apple")));

        let outcome = run(&OneOfValidator, &spec, Value::from("apple"));
        assert!(outcome.is_valid());
        assert_eq!(outcome.transformed, None);
    }

    #[test]
    fn test_one_of_failure_message() {
        let spec = ValidatorSpec::one_of(["apple", "banana"]).case_insensitive();
        let outcome = run(&OneOfValidator, &spec, Value::from("orange"));
        assert_eq!(outcome.kind, Some(ErrorKind::MembershipViolation));
        assert_eq!(
            outcome.message.as_deref(),
            Some(
                "Value 'orange' is not in the set of allowed values: 'apple', 'banana' (case-insensitive)"
            )
        );

        let strict = ValidatorSpec::one_of(["apple"]);
        let outcome = run(&OneOfValidator, &strict, Value::from("Apple"));
        assert_eq!(
            outcome.message.as_deref(),
            Some("Value 'Apple' is not in the set of allowed values: 'apple'")
        );
    }

    #[test]
    fn test_one_of_enum_class() {
        let spec = ValidatorSpec::one_of_enum(EnumClass::new("Color", ["red", "green"]));
        assert!(run(&OneOfValidator, &spec, Value::from("red")).is_valid());
        let outcome = run(&OneOfValidator, &spec, Value::from("blue"));
        assert_eq!(
            outcome.message.as_deref(),
            Some("Value 'blue' is not a valid Color value. Valid values are: 'red', 'green'")
        );
    }

    #[test]
    fn test_one_of_numbers() {
        let spec = ValidatorSpec::one_of([1, 2, 3]);
        assert!(run(&OneOfValidator, &spec, Value::Int(2)).is_valid());
        assert!(!run(&OneOfValidator, &spec, Value::Int(4)).is_valid());
    }

    #[test]
    fn test_not_in() {
        let spec = ValidatorSpec::not_in(["admin", "root"]).case_insensitive();
        assert!(run(&NotInValidator, &spec, Value::from("guest")).is_valid());
        let outcome = run(&NotInValidator, &spec, Value::from("ROOT"));
        assert_eq!(
            outcome.message.as_deref(),
            Some("Value 'ROOT' is in the set of disallowed values: 'admin', 'root' (case-insensitive)")
        );
    }
}
