//! String validators: length bounds, pattern, and substring checks.

use crate::validator::{
    ValidationInput, ValidationOutcome, Validator, expect_str, mismatched_spec,
};
use models_core::{ErrorKind, ValidatorSpec};
use regex::Regex;

const CASE_INSENSITIVE: &str = " (case-insensitive)";

fn too_short(value: &str, len: usize, min_length: usize) -> ValidationOutcome {
    ValidationOutcome::fail(
        ErrorKind::LengthViolation,
        format!(
            "String '{value}' has length {len}, which is less than the minimum length of {min_length}"
        ),
    )
}

fn too_long(value: &str, len: usize, max_length: usize) -> ValidationOutcome {
    ValidationOutcome::fail(
        ErrorKind::LengthViolation,
        format!(
            "String '{value}' has length {len}, which exceeds the maximum length of {max_length}"
        ),
    )
}

/// Checks a string's length in characters against optional bounds.
fn check_length(
    spec: &ValidatorSpec,
    input: &ValidationInput<'_>,
    min_length: Option<usize>,
    max_length: Option<usize>,
) -> ValidationOutcome {
    let value = match expect_str(input) {
        Ok(s) => s,
        Err(outcome) => return outcome.with_expected(spec.expected()),
    };
    let len = value.chars().count();

    if let Some(min) = min_length.filter(|min| len < *min) {
        return too_short(value, len, min).with_expected(spec.expected());
    }
    if let Some(max) = max_length.filter(|max| len > *max) {
        return too_long(value, len, max).with_expected(spec.expected());
    }
    ValidationOutcome::valid()
}

pub struct MinLengthValidator;

impl Validator for MinLengthValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        match spec {
            ValidatorSpec::MinLength { min_length } => {
                check_length(spec, input, Some(*min_length), None)
            }
            other => mismatched_spec("min_length", other),
        }
    }
}

pub struct MaxLengthValidator;

impl Validator for MaxLengthValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        match spec {
            ValidatorSpec::MaxLength { max_length } => {
                check_length(spec, input, None, Some(*max_length))
            }
            other => mismatched_spec("max_length", other),
        }
    }
}

pub struct LengthRangeValidator;

impl Validator for LengthRangeValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        match spec {
            ValidatorSpec::LengthRange {
                min_length,
                max_length,
            } => check_length(spec, input, Some(*min_length), Some(*max_length)),
            other => mismatched_spec("length_range", other),
        }
    }
}

/// Regex match anchored at the start of the value.
///
/// Uses the regex compiled when the field was bound. A spec checked on its
/// own is compiled for that one check.
pub struct PatternValidator;

fn matches_start(regex: &Regex, value: &str) -> bool {
    regex.find(value).is_some_and(|m| m.start() == 0)
}

impl Validator for PatternValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        let ValidatorSpec::Pattern { pattern } = spec else {
            return mismatched_spec("pattern", spec);
        };
        let value = match expect_str(input) {
            Ok(s) => s,
            Err(outcome) => return outcome.with_expected(spec.expected()),
        };

        let matched = match input.pattern {
            Some(regex) => matches_start(regex, value),
            None => match Regex::new(pattern) {
                Ok(regex) => matches_start(&regex, value),
                Err(e) => {
                    return ValidationOutcome::fail(
                        ErrorKind::PatternMismatch,
                        format!("Invalid regex pattern '{pattern}': {e}"),
                    )
                    .with_expected(spec.expected());
                }
            },
        };

        if matched {
            ValidationOutcome::valid()
        } else {
            ValidationOutcome::fail(
                ErrorKind::PatternMismatch,
                format!("String '{value}' does not match pattern '{pattern}'"),
            )
            .with_expected(spec.expected())
        }
    }
}

/// Shared shape of the contains / starts-with / ends-with checks.
fn substring_check(
    spec: &ValidatorSpec,
    input: &ValidationInput<'_>,
    needle: &str,
    case_sensitive: bool,
    verb: &str,
    test: fn(&str, &str) -> bool,
) -> ValidationOutcome {
    let value = match expect_str(input) {
        Ok(s) => s,
        Err(outcome) => return outcome.with_expected(spec.expected()),
    };

    let found = if case_sensitive {
        test(value, needle)
    } else {
        test(&value.to_lowercase(), &needle.to_lowercase())
    };
    if found {
        return ValidationOutcome::valid();
    }

    let suffix = if case_sensitive { "" } else { CASE_INSENSITIVE };
    ValidationOutcome::fail(
        ErrorKind::PatternMismatch,
        format!("String '{value}' {verb} '{needle}'{suffix}"),
    )
    .with_expected(spec.expected())
}

pub struct ContainsValidator;

impl Validator for ContainsValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        match spec {
            ValidatorSpec::Contains {
                substring,
                case_sensitive,
            } => substring_check(spec, input, substring, *case_sensitive, "does not contain", |v, n| {
                v.contains(n)
            }),
            other => mismatched_spec("contains", other),
        }
    }
}

pub struct StartsWithValidator;

impl Validator for StartsWithValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        match spec {
            ValidatorSpec::StartsWith {
                prefix,
                case_sensitive,
            } => substring_check(spec, input, prefix, *case_sensitive, "does not begin with", |v, n| {
                v.starts_with(n)
            }),
            other => mismatched_spec("starts_with", other),
        }
    }
}

pub struct EndsWithValidator;

impl Validator for EndsWithValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        match spec {
            ValidatorSpec::EndsWith {
                suffix,
                case_sensitive,
            } => substring_check(spec, input, suffix, *case_sensitive, "does not end with", |v, n| {
                v.ends_with(n)
            }),
            other => mismatched_spec("ends_with", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models_core::{TypeDescriptor, Value};

    fn run(validator: &dyn Validator, spec: ValidatorSpec, value: &str) -> ValidationOutcome {
        let descriptor = TypeDescriptor::string();
        let value = Value::from(value);
        let input = ValidationInput::new("name", &value, &descriptor);
        validator.check(&spec, &input)
    }

    #[test]
    fn test_length_messages() {
        let outcome = run(&MinLengthValidator, ValidatorSpec::min_length(3), "ab");
        assert_eq!(outcome.kind, Some(ErrorKind::LengthViolation));
        assert_eq!(
            outcome.message.as_deref(),
            Some("String 'ab' has length 2, which is less than the minimum length of 3")
        );

        let outcome = run(&MaxLengthValidator, ValidatorSpec::max_length(3), "abcd");
        assert_eq!(
            outcome.message.as_deref(),
            Some("String 'abcd' has length 4, which exceeds the maximum length of 3")
        );

        assert!(run(&LengthRangeValidator, ValidatorSpec::length_range(2, 4), "abc").is_valid());
        assert!(!run(&LengthRangeValidator, ValidatorSpec::length_range(2, 4), "a").is_valid());
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(run(&MaxLengthValidator, ValidatorSpec::max_length(4), "café").is_valid());
    }

    #[test]
    fn test_pattern_is_anchored_at_start() {
        let validator = PatternValidator;
        assert!(run(&validator, ValidatorSpec::pattern(r"\d+"), "123abc").is_valid());
        let outcome = run(&validator, ValidatorSpec::pattern(r"\d+"), "abc123");
        assert_eq!(outcome.kind, Some(ErrorKind::PatternMismatch));
        assert_eq!(
            outcome.message.as_deref(),
            Some(r"String 'abc123' does not match pattern '\d+'")
        );
    }

    #[test]
    fn test_pattern_invalid_regex() {
        let outcome = run(&PatternValidator, ValidatorSpec::pattern("(unclosed"), "x");
        assert!(!outcome.is_valid());
        assert!(outcome.message.unwrap().starts_with("Invalid regex pattern '(unclosed'"));
    }

    #[test]
    fn test_pattern_uses_bound_regex() {
        let descriptor = TypeDescriptor::string();
        let value = Value::from("2024-01");
        let regex = Regex::new(r"\d{4}").unwrap();
        let input = ValidationInput::new("year", &value, &descriptor).with_pattern(&regex);

        // spec text is not compiled when a bound regex is present
        let outcome = PatternValidator.check(&ValidatorSpec::pattern("(unclosed"), &input);
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_substring_checks() {
        assert!(run(&ContainsValidator, ValidatorSpec::contains("ell"), "hello").is_valid());
        let outcome = run(&StartsWithValidator, ValidatorSpec::starts_with("He"), "hello");
        assert_eq!(
            outcome.message.as_deref(),
            Some("String 'hello' does not begin with 'He'")
        );
        assert!(
            run(&StartsWithValidator, ValidatorSpec::starts_with("He").case_insensitive(), "hello")
                .is_valid()
        );
        let outcome = run(&EndsWithValidator, ValidatorSpec::ends_with("X").case_insensitive(), "hello");
        assert_eq!(
            outcome.message.as_deref(),
            Some("String 'hello' does not end with 'X' (case-insensitive)")
        );
    }

    #[test]
    fn test_non_string_is_type_mismatch() {
        let descriptor = TypeDescriptor::any();
        let value = Value::Int(5);
        let input = ValidationInput::new("name", &value, &descriptor);
        let outcome = ContainsValidator.check(&ValidatorSpec::contains("a"), &input);
        assert_eq!(outcome.kind, Some(ErrorKind::TypeMismatch));
        assert_eq!(
            outcome.message.as_deref(),
            Some("Expected a string for field 'name', got int")
        );
    }
}
