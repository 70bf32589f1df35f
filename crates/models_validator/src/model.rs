//! Validated model instances.
//!
//! A [`Model`] keeps two mappings: the raw values it was given and the cached
//! values that passed validation (possibly transformed, with nested models
//! coerced to instances). Reads go to the cache. Writes go through the field's
//! pipeline before reaching it.

use crate::catalog::{BoundModel, Catalog};
use crate::config::ExtraFields;
use crate::convert::{decode_fields, materialize_mapping};
use models_core::{
    Mapping, ModelError, ModelSchema, ModelValue, Result, ValidationResult, Value,
};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Construction input: either one mapping or named fields, never both.
#[derive(Debug, Clone, Default)]
pub struct ModelInput {
    mapping: Option<Mapping>,
    fields: Vec<(String, Value)>,
}

impl ModelInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input given as a single mapping.
    pub fn mapping(mapping: Mapping) -> Self {
        Self {
            mapping: Some(mapping),
            fields: Vec::new(),
        }
    }

    /// Adds a named field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Sets the mapping form alongside whatever is already present.
    pub fn with_mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = Some(mapping);
        self
    }

    /// Resolves the input into one mapping.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when both a mapping and named fields
    /// were supplied.
    pub fn into_mapping(self) -> Result<Mapping> {
        match (self.mapping, self.fields.is_empty()) {
            (Some(_), false) => Err(ModelError::configuration(
                "a mapping and named fields cannot be supplied together",
            )),
            (Some(mapping), true) => Ok(mapping),
            (None, _) => Ok(self.fields.into_iter().collect()),
        }
    }
}

impl From<Mapping> for ModelInput {
    fn from(mapping: Mapping) -> Self {
        ModelInput::mapping(mapping)
    }
}

/// An instance of a registered model type.
#[derive(Debug, Clone)]
pub struct Model {
    catalog: Arc<Catalog>,
    schema: Arc<ModelSchema>,
    raw: Mapping,
    values: Mapping,
}

impl Model {
    /// Creates an instance, failing if any field is invalid.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Validation`] with every field failure, or a
    /// configuration error as described for [`Model::build`].
    ///
    /// # Example
    ///
    /// ```rust
    /// use models_core::{FieldBuilder, Mapping, ModelBuilder, TypeDescriptor, ValidatorSpec, Value};
    /// use models_validator::{Catalog, Model, ModelInput};
    ///
    /// let user = ModelBuilder::new("User")
    ///     .field(
    ///         FieldBuilder::new("age", TypeDescriptor::float())
    ///             .validator(ValidatorSpec::min(10))
    ///             .build(),
    ///     )
    ///     .build()
    ///     .unwrap();
    /// let catalog = Catalog::builder().model(user).build().unwrap();
    ///
    /// let model = Model::new(&catalog, "User", ModelInput::new().field("age", 10)).unwrap();
    /// assert_eq!(model.get("age"), Some(&Value::Int(10)));
    ///
    /// let err = Model::new(&catalog, "User", Mapping::new().with("age", 9.5)).unwrap_err();
    /// assert!(err.to_string().contains("Value 9.5 is less than the minimum value of 10"));
    /// ```
    pub fn new(catalog: &Arc<Catalog>, model: &str, input: impl Into<ModelInput>) -> Result<Self> {
        let (instance, result) = Self::build(catalog, model, input)?;
        result.into_result()?;
        Ok(instance)
    }

    /// Creates an instance and returns the validation result alongside it.
    ///
    /// Fields that failed have no cached value.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownModel`], or a configuration error when the
    /// input mixes a mapping with named fields or carries undeclared fields
    /// under [`ExtraFields::Forbid`].
    pub fn build(
        catalog: &Arc<Catalog>,
        model: &str,
        input: impl Into<ModelInput>,
    ) -> Result<(Self, ValidationResult)> {
        let bound = catalog.require(model)?;
        let mut raw = input.into().into_mapping()?;

        let extras: Vec<String> = catalog
            .extra_fields(bound, &raw)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !extras.is_empty() && catalog.config().extra_fields == ExtraFields::Forbid {
            return Err(ModelError::configuration(format!(
                "unexpected field(s) for model '{}': {}",
                model,
                extras.join(", ")
            )));
        }

        let record = catalog.validate_fields(bound, &raw, 0);
        for extra in &extras {
            raw.remove(extra);
        }
        debug!(
            "Built '{}' instance with {} error(s)",
            model,
            record.result.len()
        );

        let instance = Self {
            catalog: Arc::clone(catalog),
            schema: Arc::clone(&bound.schema),
            raw,
            values: record.values,
        };
        Ok((instance, record.result))
    }

    /// Creates an instance from a plain mapping.
    pub fn from_mapping(catalog: &Arc<Catalog>, model: &str, mapping: Mapping) -> Result<Self> {
        Self::new(catalog, model, ModelInput::mapping(mapping))
    }

    /// Creates an instance from JSON object text.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Serialization`] for malformed JSON, a
    /// configuration error when the text is not an object, and otherwise
    /// behaves like [`Model::new`].
    pub fn from_text(catalog: &Arc<Catalog>, model: &str, text: &str) -> Result<Self> {
        let (instance, result) = Self::build_from_text(catalog, model, text)?;
        result.into_result()?;
        Ok(instance)
    }

    /// Non-raising form of [`Model::from_text`].
    pub fn build_from_text(
        catalog: &Arc<Catalog>,
        model: &str,
        text: &str,
    ) -> Result<(Self, ValidationResult)> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Self::build_from_json(catalog, model, json)
    }

    /// Non-raising construction from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `json` is not an object, and
    /// otherwise behaves like [`Model::build`].
    pub fn build_from_json(
        catalog: &Arc<Catalog>,
        model: &str,
        json: serde_json::Value,
    ) -> Result<(Self, ValidationResult)> {
        let schema = catalog
            .schema(model)
            .ok_or_else(|| ModelError::UnknownModel(model.to_string()))?;
        let serde_json::Value::Object(object) = json else {
            return Err(ModelError::configuration(format!(
                "text form of model '{model}' must be a JSON object"
            )));
        };
        let mapping = decode_fields(catalog, schema, object);
        Self::build(catalog, model, ModelInput::mapping(mapping))
    }

    pub fn name(&self) -> &str {
        &self.schema.name
    }

    pub fn schema(&self) -> &ModelSchema {
        &self.schema
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// The cached (validated) value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    /// The raw value last supplied for a field.
    pub fn raw(&self, field: &str) -> Option<&Value> {
        self.raw.get(field)
    }

    /// Stores and validates a new value for one field.
    ///
    /// On success the cache is updated and the validated value returned. On
    /// failure the raw value is kept but the cached value stays unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownField`] for undeclared fields and
    /// [`ModelError::Validation`] when the value is invalid.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<Value> {
        let value = value.into();
        let bound = self.bound()?;
        let plan = bound.plan(field).ok_or_else(|| ModelError::UnknownField {
            model: self.schema.name.clone(),
            field: field.to_string(),
        })?;

        let outcome = plan.run(&self.catalog, value.clone(), 0);
        self.raw.insert(field, value);
        match outcome.value {
            Some(validated) if outcome.errors.is_empty() => {
                self.values.insert(field, validated.clone());
                Ok(validated)
            }
            _ => Err(ModelError::Validation(ValidationResult::from(outcome.errors))),
        }
    }

    /// Re-validates every raw value, refreshing the cache for fields that pass.
    pub fn validate(&mut self) -> ValidationResult {
        let record = match self.catalog.bound(&self.schema.name) {
            Some(bound) => self.catalog.validate_fields(bound, &self.raw, 0),
            None => return ValidationResult::new(),
        };
        for (name, value) in record.values {
            self.values.insert(name, value);
        }
        record.result
    }

    /// Like [`Model::validate`], but raises on failure.
    pub fn ensure_valid(&mut self) -> Result<()> {
        self.validate().into_result()
    }

    /// Checks the raw values without touching the cache.
    pub fn check(&self) -> ValidationResult {
        match self.catalog.bound(&self.schema.name) {
            Some(bound) => self.catalog.validate_fields(bound, &self.raw, 0).result,
            None => ValidationResult::new(),
        }
    }

    /// Cached values in declaration order, nested instances as plain dicts.
    pub fn to_mapping(&self) -> Mapping {
        materialize_mapping(&self.ordered_values())
    }

    /// The instance as a [`Value::Model`].
    pub fn to_value(&self) -> Value {
        Value::from(ModelValue::new(self.schema.name.clone(), self.ordered_values()))
    }

    /// JSON object text of [`Model::to_mapping`].
    ///
    /// # Errors
    ///
    /// With `validate_on_serialize` set, returns [`ModelError::Validation`]
    /// when the raw values no longer validate.
    pub fn to_text(&self) -> Result<String> {
        if self.catalog.config().validate_on_serialize {
            self.check().into_result()?;
        }
        let object: serde_json::Map<String, serde_json::Value> = self.to_mapping().into();
        Ok(serde_json::to_string(&object)?)
    }

    fn ordered_values(&self) -> Mapping {
        self.schema
            .field_names()
            .filter_map(|name| self.values.get(name).map(|v| (name, v.clone())))
            .collect()
    }

    fn bound(&self) -> Result<&BoundModel> {
        self.catalog.require(&self.schema.name)
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.to_mapping() == other.to_mapping()
    }
}

/// `User(name='Ann', age=30)`
impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self
            .ordered_values()
            .iter()
            .map(|(name, value)| format!("{name}={}", value.repr()))
            .collect();
        write!(f, "{}({})", self.schema.name, fields.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models_core::{ErrorKind, ModelBuilder, TypeDescriptor};

    fn catalog() -> Arc<Catalog> {
        let point = ModelBuilder::new("Point")
            .plain_field("x", TypeDescriptor::int())
            .plain_field("y", TypeDescriptor::int())
            .build()
            .unwrap();
        Catalog::builder().model(point).build().unwrap()
    }

    #[test]
    fn test_mapping_and_fields_together_rejected() {
        let input = ModelInput::mapping(Mapping::new().with("x", 1)).field("y", 2);
        let err = Model::build(&catalog(), "Point", input).unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
    }

    #[test]
    fn test_unknown_model() {
        let err = Model::build(&catalog(), "Line", ModelInput::new()).unwrap_err();
        assert!(matches!(err, ModelError::UnknownModel(ref name) if name == "Line"));
    }

    #[test]
    fn test_build_reports_without_raising() {
        let (model, result) =
            Model::build(&catalog(), "Point", ModelInput::new().field("x", "one").field("y", 2))
                .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.errors()[0].kind, ErrorKind::TypeMismatch);
        assert_eq!(model.get("x"), None);
        assert_eq!(model.raw("x"), Some(&Value::from("one")));
        assert_eq!(model.get("y"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_set_unknown_field() {
        let mut model =
            Model::new(&catalog(), "Point", ModelInput::new().field("x", 1).field("y", 2)).unwrap();
        let err = model.set("z", 3).unwrap_err();
        assert!(matches!(err, ModelError::UnknownField { .. }));
    }

    #[test]
    fn test_display() {
        let model =
            Model::new(&catalog(), "Point", ModelInput::new().field("y", 2).field("x", 1)).unwrap();
        assert_eq!(model.to_string(), "Point(x=1, y=2)");
    }
}
