//! Nested model validation.
//!
//! A value declared as a model reference is read as a field mapping (an
//! instance of that model, a string-keyed dict, or JSON object text) and
//! validated against the referenced model's plans. Failures found inside are
//! re-parented under the containing path.

use crate::matcher::Matcher;
use models_core::{ErrorKind, Mapping, ModelValue, ValidationError, Value};
use tracing::trace;

/// Reads the field mapping a value supplies for `model`, if its shape allows.
fn read_fields(model: &str, value: &Value) -> Option<Mapping> {
    match value {
        Value::Model(instance) if instance.model == model => Some(instance.fields.clone()),
        Value::Dict(_) => Mapping::from_value(value),
        Value::Str(text) => {
            serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(text)
                .ok()
                .map(Mapping::from)
        }
        _ => None,
    }
}

/// Validates `value` as an instance of `model`.
///
/// Returns the validated instance as a [`Value::Model`], or the nested
/// failures with paths under `path` and messages prefixed with `prefix`.
pub(crate) fn coerce_model(
    matcher: &Matcher<'_>,
    model: &str,
    value: &Value,
    path: &str,
    prefix: &str,
) -> std::result::Result<Value, Vec<ValidationError>> {
    let catalog = matcher.catalog;
    let depth = matcher.depth + 1;
    let limit = catalog.config().max_nesting_depth;

    if depth > limit {
        return Err(vec![
            ValidationError::new(
                path,
                ErrorKind::NestedValidationFailure,
                format!("{prefix}Maximum nesting depth of {limit} exceeded while validating '{model}'"),
            )
            .with_received(value),
        ]);
    }

    let Some(fields) = read_fields(model, value) else {
        let mut error = ValidationError::type_mismatch(path, model, value);
        error.message = format!("{prefix}{}", error.message);
        return Err(vec![error]);
    };

    let Some(bound) = catalog.bound(model) else {
        return Err(vec![ValidationError::new(
            path,
            ErrorKind::NestedValidationFailure,
            format!("{prefix}Unknown model type '{model}'"),
        )]);
    };

    trace!("Walking into '{}' at '{}' (depth {})", model, path, depth);
    let record = catalog.validate_fields(bound, &fields, depth);
    if record.result.is_valid() {
        return Ok(Value::from(ModelValue::new(model, record.values)));
    }

    Err(record
        .result
        .into_iter()
        .map(|error| error.nest(path, prefix, value))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::EngineConfig;
    use models_core::{ModelBuilder, TypeDescriptor, value_repr};
    use std::sync::Arc;

    fn catalog(depth: usize) -> Arc<Catalog> {
        let address = ModelBuilder::new("Address")
            .plain_field("street", TypeDescriptor::string())
            .plain_field("city", TypeDescriptor::string())
            .build()
            .unwrap();
        Catalog::builder()
            .model(address)
            .config(EngineConfig::new().with_max_nesting_depth(depth))
            .build()
            .unwrap()
    }

    fn fields(city: impl Into<Value>) -> Mapping {
        Mapping::new().with("street", "Main St").with("city", city)
    }

    #[test]
    fn test_read_fields_shapes() {
        let mapping = fields("Rome");
        assert_eq!(read_fields("Address", &Value::from(mapping.clone())), Some(mapping.clone()));

        let instance = Value::from(ModelValue::new("Address", mapping.clone()));
        assert_eq!(read_fields("Address", &instance), Some(mapping));
        assert_eq!(read_fields("Person", &instance), None);

        let text = Value::from(r#"{"city": "Rome"}"#);
        assert_eq!(read_fields("Address", &text), Some(Mapping::new().with("city", "Rome")));
        assert_eq!(read_fields("Address", &Value::from("[1, 2]")), None);
        assert_eq!(read_fields("Address", &Value::dict([(1, "a")])), None);
        assert_eq!(read_fields("Address", &Value::Int(1)), None);
    }

    #[test]
    fn test_coerce_builds_instance() {
        let catalog = catalog(4);
        let matcher = Matcher::new(&catalog, 0);
        let value =
            coerce_model(&matcher, "Address", &Value::from(fields("Rome")), "home", "").unwrap();
        assert_eq!(value, Value::from(ModelValue::new("Address", fields("Rome"))));
    }

    #[test]
    fn test_nested_failures_are_reparented() {
        let catalog = catalog(4);
        let matcher = Matcher::new(&catalog, 0);
        let element = Value::from(fields(5));
        let errors =
            coerce_model(&matcher, "Address", &element, "homes[2]", "Item at index 2: ").unwrap_err();

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "homes[2].city");
        assert_eq!(errors[0].kind, ErrorKind::NestedValidationFailure);
        assert_eq!(errors[0].nested_kind, Some(ErrorKind::TypeMismatch));
        assert_eq!(
            errors[0].message,
            "Item at index 2: Expected type str, got int with value: 5"
        );
        assert_eq!(errors[0].received, Some(value_repr(&element)));
    }

    #[test]
    fn test_wrong_shape_keeps_prefix() {
        let catalog = catalog(4);
        let matcher = Matcher::new(&catalog, 0);
        let errors =
            coerce_model(&matcher, "Address", &Value::Int(3), "homes[0]", "Item at index 0: ")
                .unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::TypeMismatch);
        assert_eq!(
            errors[0].message,
            "Item at index 0: Expected type Address, got int with value: 3"
        );
    }

    #[test]
    fn test_depth_limit() {
        let catalog = catalog(2);
        let value = Value::from(fields("Rome"));
        let errors = coerce_model(&Matcher::new(&catalog, 2), "Address", &value, "home", "").unwrap_err();
        assert_eq!(errors[0].kind, ErrorKind::NestedValidationFailure);
        assert_eq!(
            errors[0].message,
            "Maximum nesting depth of 2 exceeded while validating 'Address'"
        );

        assert!(coerce_model(&Matcher::new(&catalog, 1), "Address", &value, "home", "").is_ok());
    }

    #[test]
    fn test_unknown_model() {
        let catalog = catalog(4);
        let value = Value::from(fields("Rome"));
        let errors = coerce_model(&Matcher::new(&catalog, 0), "Ghost", &value, "x", "").unwrap_err();
        assert_eq!(errors[0].message, "Unknown model type 'Ghost'");
    }
}
