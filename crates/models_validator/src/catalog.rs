//! Model catalog: the registered model types and their bound field plans.
//!
//! A [`Catalog`] is built once from a set of [`ModelSchema`]s. Building it
//! checks every declaration up front: attached validator kinds must be
//! registered, model references must resolve inside the catalog, and regex
//! patterns must compile. After that it is immutable and shared through an
//! `Arc`, so instances of any model can be validated from several threads.

use crate::config::{EngineConfig, ExtraFields};
use crate::engine::FieldPlan;
use crate::registry::ValidatorRegistry;
use models_core::{
    ErrorKind, Mapping, ModelError, ModelSchema, Result, ValidationError, ValidationResult, Value,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A model type bound to its field plans.
#[derive(Debug)]
pub(crate) struct BoundModel {
    pub(crate) schema: Arc<ModelSchema>,
    pub(crate) plans: Vec<FieldPlan>,
}

impl BoundModel {
    pub(crate) fn plan(&self, field: &str) -> Option<&FieldPlan> {
        self.plans.iter().find(|p| p.name() == field)
    }
}

/// Field values that passed, plus every failure, for one mapping.
#[derive(Debug)]
pub(crate) struct Record {
    pub(crate) values: Mapping,
    pub(crate) result: ValidationResult,
}

/// Registered model types sharing one validator registry and configuration.
#[derive(Debug)]
pub struct Catalog {
    models: HashMap<String, BoundModel>,
    order: Vec<String>,
    registry: Arc<ValidatorRegistry>,
    config: EngineConfig,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Declaration of a registered model.
    pub fn schema(&self, model: &str) -> Option<&ModelSchema> {
        self.models.get(model).map(|b| b.schema.as_ref())
    }

    pub fn contains(&self, model: &str) -> bool {
        self.models.contains_key(model)
    }

    /// Model names in registration order.
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates a mapping against a model without creating an instance.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownModel`] when the model is not registered.
    pub fn validate_mapping(&self, model: &str, fields: &Mapping) -> Result<ValidationResult> {
        let bound = self.require(model)?;
        Ok(self.validate_fields(bound, fields, 0).result)
    }

    pub(crate) fn bound(&self, model: &str) -> Option<&BoundModel> {
        self.models.get(model)
    }

    pub(crate) fn require(&self, model: &str) -> Result<&BoundModel> {
        self.bound(model)
            .ok_or_else(|| ModelError::UnknownModel(model.to_string()))
    }

    /// Names in `fields` that the model does not declare.
    pub(crate) fn extra_fields<'f>(&self, bound: &BoundModel, fields: &'f Mapping) -> Vec<&'f str> {
        fields
            .keys()
            .filter(|key| bound.schema.field(key).is_none())
            .collect()
    }

    /// Runs every field plan of `bound` over `fields`, in declaration order.
    ///
    /// Missing fields are validated as `None`.
    pub(crate) fn validate_fields(&self, bound: &BoundModel, fields: &Mapping, depth: usize) -> Record {
        let model = &bound.schema.name;
        let mut values = Mapping::new();
        let mut result = ValidationResult::new();
        debug!("Validating model '{}' at depth {}", model, depth);

        for plan in &bound.plans {
            let value = fields.get(plan.name()).cloned().unwrap_or(Value::None);
            let outcome = plan.run(self, value, depth);
            result.extend(outcome.errors);
            if let Some(value) = outcome.value {
                values.insert(plan.name(), value);
            }
        }

        for key in self.extra_fields(bound, fields) {
            match self.config.extra_fields {
                ExtraFields::Ignore => {
                    warn!("Ignoring unknown field '{}' for model '{}'", key, model);
                }
                ExtraFields::Forbid => {
                    let mut error = ValidationError::new(
                        key,
                        ErrorKind::UnexpectedField,
                        format!("Unexpected field '{key}' for model '{model}'"),
                    );
                    if let Some(value) = fields.get(key) {
                        error = error.with_received(value);
                    }
                    result.push(error);
                }
            }
        }

        Record { values, result }
    }
}

/// Builder for a [`Catalog`].
///
/// # Example
///
/// ```rust
/// use models_core::{ModelBuilder, TypeDescriptor};
/// use models_validator::{Catalog, EngineConfig};
///
/// let address = ModelBuilder::new("Address")
///     .plain_field("city", TypeDescriptor::string())
///     .build()
///     .unwrap();
///
/// let catalog = Catalog::builder()
///     .model(address)
///     .config(EngineConfig::new().with_max_nesting_depth(8))
///     .build()
///     .unwrap();
/// assert!(catalog.contains("Address"));
/// ```
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    schemas: Vec<ModelSchema>,
    registry: Option<Arc<ValidatorRegistry>>,
    config: EngineConfig,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a model type.
    pub fn model(mut self, schema: ModelSchema) -> Self {
        self.schemas.push(schema);
        self
    }

    /// Registers several model types.
    pub fn models(mut self, schemas: impl IntoIterator<Item = ModelSchema>) -> Self {
        self.schemas.extend(schemas);
        self
    }

    /// Uses a specific registry instead of the global built-in one.
    pub fn registry(mut self, registry: Arc<ValidatorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Checks every declaration and binds the field plans.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for malformed or duplicate declarations,
    /// unknown validator kinds, or references to unregistered models, and
    /// [`ModelError::InvalidPattern`] for patterns that do not compile.
    pub fn build(self) -> Result<Arc<Catalog>> {
        let registry = self.registry.unwrap_or_else(ValidatorRegistry::global);

        let mut order: Vec<String> = Vec::with_capacity(self.schemas.len());
        for schema in &self.schemas {
            schema.check_definition()?;
            if order.contains(&schema.name) {
                return Err(ModelError::configuration(format!(
                    "model type '{}' is registered twice",
                    schema.name
                )));
            }
            order.push(schema.name.clone());
        }

        let mut models = HashMap::with_capacity(self.schemas.len());
        for schema in self.schemas {
            check_references(&schema, &order)?;
            let plans = schema
                .fields
                .iter()
                .map(|field| FieldPlan::bind(&schema.name, field, &registry))
                .collect::<Result<Vec<_>>>()?;
            debug!("Bound {} field(s) for model '{}'", plans.len(), schema.name);
            models.insert(
                schema.name.clone(),
                BoundModel {
                    schema: Arc::new(schema),
                    plans,
                },
            );
        }

        info!("Registered {} model type(s)", order.len());
        Ok(Arc::new(Catalog {
            models,
            order,
            registry,
            config: self.config,
        }))
    }
}

/// Resolves the model references declared on a model.
fn check_references(schema: &ModelSchema, registered: &[String]) -> Result<()> {
    for field in &schema.fields {
        for target in field.descriptor.referenced_models() {
            if !registered.iter().any(|name| name == target) {
                return Err(ModelError::configuration(format!(
                    "field '{}.{}' references unknown model type '{}'",
                    schema.name, field.name, target
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use models_core::{FieldBuilder, ModelBuilder, TypeDescriptor, ValidatorSpec};

    fn address() -> ModelSchema {
        ModelBuilder::new("Address")
            .plain_field("street", TypeDescriptor::string())
            .plain_field("city", TypeDescriptor::string())
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_registers_models_in_order() {
        let person = ModelBuilder::new("Person")
            .plain_field("home", TypeDescriptor::model("Address"))
            .build()
            .unwrap();
        let catalog = Catalog::builder().model(person).model(address()).build().unwrap();

        assert_eq!(catalog.model_names().collect::<Vec<_>>(), vec!["Person", "Address"]);
        assert_eq!(catalog.schema("Address").unwrap().fields.len(), 2);
        assert!(catalog.schema("Missing").is_none());
    }

    #[test]
    fn test_unresolved_reference_is_configuration_error() {
        let person = ModelBuilder::new("Person")
            .plain_field("homes", "List[Address]".parse().unwrap())
            .build()
            .unwrap();
        let err = Catalog::builder().model(person).build().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("unknown model type 'Address'"));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let model = ModelBuilder::new("Code")
            .field(
                FieldBuilder::new("code", TypeDescriptor::string())
                    .validator(ValidatorSpec::pattern("[a-"))
                    .build(),
            )
            .build()
            .unwrap();
        let err = Catalog::builder().model(model).build().unwrap_err();
        assert!(matches!(err, ModelError::InvalidPattern { ref field, .. } if field == "Code.code"));
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let err = Catalog::builder()
            .model(address())
            .model(address())
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
    }

    #[test]
    fn test_validate_mapping_treats_missing_as_none() {
        let catalog = Catalog::builder().model(address()).build().unwrap();
        let result = catalog
            .validate_mapping("Address", &Mapping::new().with("street", "Main"))
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.errors()[0].path, "city");
        assert_eq!(result.errors()[0].kind, ErrorKind::NoneNotAllowed);

        assert!(matches!(
            catalog.validate_mapping("Nope", &Mapping::new()),
            Err(ModelError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_forbidden_extra_field_in_mapping() {
        let catalog = Catalog::builder()
            .model(address())
            .config(EngineConfig::new().with_extra_fields(ExtraFields::Forbid))
            .build()
            .unwrap();
        let fields = Mapping::new()
            .with("street", "Main")
            .with("city", "Rome")
            .with("zip", "00100");
        let result = catalog.validate_mapping("Address", &fields).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.errors()[0].kind, ErrorKind::UnexpectedField);
    }
}
