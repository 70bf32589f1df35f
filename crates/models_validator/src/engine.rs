//! Per-field validation pipeline.
//!
//! Each declared field is bound once, at catalog construction, into a
//! [`FieldPlan`]: the ordered list of checks to run. Running a plan on a value
//! goes through three stages:
//!
//! 1. presence checks (kinds that also see `None`), fail-fast;
//! 2. type matching against the field's descriptor, fail-fast;
//! 3. the remaining checks, collecting every failure.
//!
//! In stages 1 and 3, explicitly attached validators run first in attachment
//! order, then the default checks of every registered kind not attached to
//! the field, in registry order. A transformed value feeds the next check.

use crate::catalog::Catalog;
use crate::matcher::Matcher;
use crate::registry::{Registration, ValidatorRegistry};
use crate::validator::{ValidationInput, ValidationOutcome};
use models_core::{
    ErrorKind, FieldSpec, ModelError, Result, ValidationError, ValidatorSpec, Value, join_path,
};
use regex::Regex;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct Step {
    /// Index into the field's attached validators; `None` for a default check
    spec: Option<usize>,
    registration: Registration,
    /// Compiled regex of an attached pattern spec
    pattern: Option<Regex>,
}

/// The bound check sequence of one field.
#[derive(Debug, Clone)]
pub(crate) struct FieldPlan {
    pub(crate) field: FieldSpec,
    nullable: bool,
    presence: Vec<Step>,
    rules: Vec<Step>,
}

/// Result of running a plan: the final value when the field passed.
#[derive(Debug)]
pub(crate) struct FieldOutcome {
    pub(crate) value: Option<Value>,
    pub(crate) errors: Vec<ValidationError>,
}

impl FieldOutcome {
    fn passed(value: Value) -> Self {
        Self {
            value: Some(value),
            errors: Vec::new(),
        }
    }

    fn failed(errors: Vec<ValidationError>) -> Self {
        Self {
            value: None,
            errors,
        }
    }
}

impl FieldPlan {
    /// Binds a field declaration against a registry.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when an attached validator kind is not
    /// registered, and [`ModelError::InvalidPattern`] when an attached pattern
    /// does not compile.
    pub(crate) fn bind(model: &str, field: &FieldSpec, registry: &ValidatorRegistry) -> Result<Self> {
        let mut presence = Vec::new();
        let mut rules = Vec::new();

        for (i, spec) in field.validators.iter().enumerate() {
            let registration = registry.get(spec.kind()).ok_or_else(|| {
                ModelError::configuration(format!(
                    "Unknown validator kind '{}' on field '{}.{}'",
                    spec.kind(),
                    model,
                    field.name
                ))
            })?;
            let step = Step {
                spec: Some(i),
                registration: registration.clone(),
                pattern: compile_pattern(&format!("{}.{}", model, field.name), spec)?,
            };
            if registration.skip_on_none() {
                rules.push(step);
            } else {
                presence.push(step);
            }
        }

        for registration in registry.iter() {
            if field.has_kind(registration.kind()) {
                continue;
            }
            let step = Step {
                spec: None,
                registration: registration.clone(),
                pattern: None,
            };
            if registration.skip_on_none() {
                rules.push(step);
            } else {
                presence.push(step);
            }
        }

        Ok(Self {
            field: field.clone(),
            nullable: field.allows_none(),
            presence,
            rules,
        })
    }

    pub(crate) fn name(&self) -> &str {
        &self.field.name
    }

    /// Runs the full pipeline on one value.
    pub(crate) fn run(&self, catalog: &Catalog, value: Value, depth: usize) -> FieldOutcome {
        let field = &self.field;
        let mut value = value;
        debug!("Validating field '{}' as {}", field.name, field.descriptor);

        for step in &self.presence {
            let outcome = self.dispatch(step, &value);
            if !outcome.valid {
                let error = self.error_from(step, outcome, &value);
                return FieldOutcome::failed(vec![error]);
            }
            if let Some(transformed) = outcome.transformed {
                value = transformed;
            }
        }

        if value.is_none() && self.nullable {
            return FieldOutcome::passed(value);
        }

        let matcher = Matcher::new(catalog, depth);
        value = match matcher.match_value(&field.descriptor, &value, &field.name) {
            Ok(matched) => matched,
            Err(errors) => return FieldOutcome::failed(errors),
        };

        let mut errors = Vec::new();
        for step in &self.rules {
            if value.is_none() && step.registration.skip_on_none() {
                continue;
            }
            let outcome = self.dispatch(step, &value);
            if !outcome.valid {
                let error = self.error_from(step, outcome, &value);
                let stop = error.kind.is_fail_fast();
                errors.push(error);
                if stop {
                    break;
                }
                continue;
            }
            if let Some(transformed) = outcome.transformed {
                trace!("Field '{}' transformed by '{}'", field.name, step.registration.kind());
                value = transformed;
            }
        }

        if errors.is_empty() {
            FieldOutcome::passed(value)
        } else {
            FieldOutcome::failed(errors)
        }
    }

    fn dispatch(&self, step: &Step, value: &Value) -> ValidationOutcome {
        let mut input = ValidationInput::new(&self.field.name, value, &self.field.descriptor)
            .with_nullable(self.nullable);
        if let Some(regex) = &step.pattern {
            input = input.with_pattern(regex);
        }
        let validator = step.registration.validator();
        match self.spec_of(step) {
            Some(spec) => {
                trace!("Explicit '{}' check on '{}'", spec.kind(), self.field.name);
                validator.check(spec, &input)
            }
            None => validator.default_check(&input),
        }
    }

    fn spec_of(&self, step: &Step) -> Option<&ValidatorSpec> {
        step.spec.and_then(|i| self.field.validators.get(i))
    }

    fn error_from(&self, step: &Step, outcome: ValidationOutcome, value: &Value) -> ValidationError {
        outcome_error(
            &self.field.name,
            step.registration.kind(),
            self.spec_of(step),
            outcome,
            value,
        )
    }
}

/// Compiles the regex of a pattern spec. Other kinds need none.
pub(crate) fn compile_pattern(field: &str, spec: &ValidatorSpec) -> Result<Option<Regex>> {
    let ValidatorSpec::Pattern { pattern } = spec else {
        return Ok(None);
    };
    Regex::new(pattern)
        .map(Some)
        .map_err(|e| ModelError::InvalidPattern {
            field: field.to_string(),
            pattern: pattern.clone(),
            reason: e.to_string(),
        })
}

/// Turns a failed outcome into a [`ValidationError`] for `field`.
pub(crate) fn outcome_error(
    field: &str,
    kind_id: &str,
    spec: Option<&ValidatorSpec>,
    outcome: ValidationOutcome,
    value: &Value,
) -> ValidationError {
    let kind = outcome.kind.unwrap_or(ErrorKind::Custom);
    let path = match &outcome.context {
        Some(context) => join_path(field, context),
        None => field.to_string(),
    };
    let message = outcome
        .message
        .unwrap_or_else(|| format!("Validator '{kind_id}' rejected field '{field}'"));
    let expected = if !outcome.expected.is_empty() {
        outcome.expected
    } else if let Some(spec) = spec {
        spec.expected()
    } else {
        vec![("validator".to_string(), kind_id.to_string())]
    };

    ValidationError::new(path, kind, message)
        .with_received(value)
        .with_expected(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ValidatorRegistry;
    use models_core::{FieldBuilder, TypeDescriptor};

    fn plan(field: FieldSpec) -> FieldPlan {
        FieldPlan::bind("Test", &field, &ValidatorRegistry::global()).unwrap()
    }

    #[test]
    fn test_explicit_kind_suppresses_default() {
        let field = FieldBuilder::new("age", TypeDescriptor::int())
            .validator(ValidatorSpec::allow_none(true))
            .build();
        let plan = plan(field);
        let kinds: Vec<&str> = plan.presence.iter().map(|s| s.registration.kind()).collect();
        assert_eq!(kinds, vec!["none_allowance", "required"]);
        assert!(plan.presence[0].spec.is_some());
        assert!(plan.presence[1].spec.is_none());
        assert!(plan.nullable);
    }

    #[test]
    fn test_explicit_rules_run_before_defaults() {
        let field = FieldBuilder::new("name", TypeDescriptor::string())
            .validator(ValidatorSpec::max_length(5))
            .validator(ValidatorSpec::min_length(2))
            .build();
        let plan = plan(field);
        let kinds: Vec<&str> = plan.rules.iter().take(3).map(|s| s.registration.kind()).collect();
        assert_eq!(kinds, vec!["max_length", "min_length", "min_value"]);
        assert!(plan.rules.iter().all(|s| s.registration.kind() != "none_allowance"));
    }

    #[test]
    fn test_unknown_kind_is_configuration_error() {
        let field = FieldBuilder::new("x", TypeDescriptor::int())
            .validator(ValidatorSpec::custom("nope", Default::default()))
            .build();
        let err = FieldPlan::bind("Test", &field, &ValidatorRegistry::global()).unwrap_err();
        assert!(err.to_string().contains("Unknown validator kind 'nope' on field 'Test.x'"));
    }

    #[test]
    fn test_pattern_compiled_at_bind() {
        let field = FieldBuilder::new("code", TypeDescriptor::string())
            .validator(ValidatorSpec::pattern(r"^[A-Z]{3}$"))
            .build();
        let plan = plan(field);
        let step = plan
            .rules
            .iter()
            .find(|s| s.registration.kind() == "pattern")
            .unwrap();
        assert_eq!(step.pattern.as_ref().map(Regex::as_str), Some(r"^[A-Z]{3}$"));
        assert!(plan.rules.iter().filter(|s| s.spec.is_none()).all(|s| s.pattern.is_none()));

        let outcome = plan.dispatch(step, &Value::from("abc"));
        assert_eq!(outcome.kind, Some(ErrorKind::PatternMismatch));
    }

    #[test]
    fn test_invalid_pattern_fails_bind() {
        let field = FieldBuilder::new("code", TypeDescriptor::string())
            .validator(ValidatorSpec::pattern("[a-"))
            .build();
        let err = FieldPlan::bind("Code", &field, &ValidatorRegistry::global()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidPattern { ref field, ref pattern, .. } if field == "Code.code" && pattern == "[a-"
        ));
    }

    #[test]
    fn test_outcome_error_falls_back_to_generic_message() {
        let outcome = ValidationOutcome {
            valid: false,
            ..ValidationOutcome::valid()
        };
        let error = outcome_error("age", "even", None, outcome, &Value::Int(3));
        assert_eq!(error.kind, ErrorKind::Custom);
        assert_eq!(error.message, "Validator 'even' rejected field 'age'");
        assert_eq!(error.received.as_deref(), Some("3"));
    }
}
