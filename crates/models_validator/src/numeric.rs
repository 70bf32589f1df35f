//! Numeric bound validators: minimum, maximum, and range.

use crate::validator::{
    ValidationInput, ValidationOutcome, Validator, expect_number, mismatched_spec,
};
use models_core::{ErrorKind, Number, ValidatorSpec};
use std::cmp::Ordering;

fn below(value: Number, bound: Number, inclusive: bool) -> bool {
    match value.compare(bound) {
        Some(Ordering::Less) => true,
        Some(Ordering::Equal) => !inclusive,
        _ => false,
    }
}

fn above(value: Number, bound: Number, inclusive: bool) -> bool {
    match value.compare(bound) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => !inclusive,
        _ => false,
    }
}

/// Lower bound on a numeric value.
pub struct MinValueValidator;

impl Validator for MinValueValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        let ValidatorSpec::MinValue { min, inclusive } = spec else {
            return mismatched_spec("min_value", spec);
        };
        let value = match expect_number(input) {
            Ok(n) => n,
            Err(outcome) => return outcome.with_expected(spec.expected()),
        };

        if !below(value, *min, *inclusive) {
            return ValidationOutcome::valid();
        }
        let message = if *inclusive {
            format!("Value {value} is less than the minimum value of {min}")
        } else {
            format!("Value {value} is less than or equal to the minimum value of {min} (exclusive)")
        };
        ValidationOutcome::fail(ErrorKind::BoundViolation, message).with_expected(spec.expected())
    }
}

/// Upper bound on a numeric value.
pub struct MaxValueValidator;

impl Validator for MaxValueValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        let ValidatorSpec::MaxValue { max, inclusive } = spec else {
            return mismatched_spec("max_value", spec);
        };
        let value = match expect_number(input) {
            Ok(n) => n,
            Err(outcome) => return outcome.with_expected(spec.expected()),
        };

        if !above(value, *max, *inclusive) {
            return ValidationOutcome::valid();
        }
        let message = if *inclusive {
            format!("Value {value} exceeds the maximum value of {max}")
        } else {
            format!(
                "Value {value} is greater than or equal to the maximum value of {max} (exclusive)"
            )
        };
        ValidationOutcome::fail(ErrorKind::BoundViolation, message).with_expected(spec.expected())
    }
}

/// Both bounds at once, each optional.
pub struct RangeValidator;

impl Validator for RangeValidator {
    fn check(&self, spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
        let ValidatorSpec::Range {
            min,
            max,
            min_inclusive,
            max_inclusive,
        } = spec
        else {
            return mismatched_spec("range", spec);
        };
        let value = match expect_number(input) {
            Ok(n) => n,
            Err(outcome) => return outcome.with_expected(spec.expected()),
        };

        if let Some(min) = min {
            if below(value, *min, *min_inclusive) {
                let op = if *min_inclusive { ">=" } else { ">" };
                return ValidationOutcome::fail(
                    ErrorKind::BoundViolation,
                    format!("Value {value} must be {op} {min}"),
                )
                .with_expected(spec.expected());
            }
        }
        if let Some(max) = max {
            if above(value, *max, *max_inclusive) {
                let op = if *max_inclusive { "<=" } else { "<" };
                return ValidationOutcome::fail(
                    ErrorKind::BoundViolation,
                    format!("Value {value} must be {op} {max}"),
                )
                .with_expected(spec.expected());
            }
        }
        ValidationOutcome::valid()
    }
}
