//! Builder pattern for creating model declarations.
//!
//! This module provides ergonomic builders for constructing model schemas
//! and their fields with a fluent API.

use crate::{FieldSpec, ModelSchema, Result, TypeDescriptor, ValidatorSpec};

/// Builder for creating a [`ModelSchema`].
///
/// # Example
///
/// ```rust
/// use models_core::{FieldBuilder, ModelBuilder, TypeDescriptor, ValidatorSpec};
///
/// let user = ModelBuilder::new("User")
///     .description("Registered user")
///     .field(
///         FieldBuilder::new("age", TypeDescriptor::int())
///             .validator(ValidatorSpec::min(18))
///             .build(),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(user.fields.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    name: String,
    description: Option<String>,
    fields: Vec<FieldSpec>,
}

impl ModelBuilder {
    /// Creates a new model builder.
    ///
    /// # Arguments
    ///
    /// * `name` - Model type name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the model description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a field.
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds multiple fields.
    pub fn fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Shorthand for a field with no attached validators.
    pub fn plain_field(self, name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        self.field(FieldSpec::new(name, descriptor))
    }

    /// Builds the schema.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty model name, empty field
    /// names, or duplicate field names.
    pub fn build(self) -> Result<ModelSchema> {
        let schema = ModelSchema {
            name: self.name,
            description: self.description,
            fields: self.fields,
        };
        schema.check_definition()?;
        Ok(schema)
    }
}

/// Builder for creating a [`FieldSpec`].
///
/// # Example
///
/// ```rust
/// use models_core::{FieldBuilder, TypeDescriptor, ValidatorSpec};
///
/// let field = FieldBuilder::new("fruit", TypeDescriptor::string())
///     .validator(ValidatorSpec::one_of(["apple", "banana"]).case_insensitive())
///     .build();
/// assert!(field.is_explicit());
/// ```
#[derive(Debug)]
pub struct FieldBuilder {
    field: FieldSpec,
}

impl FieldBuilder {
    /// Creates a new field builder.
    ///
    /// # Arguments
    ///
    /// * `name` - Field name
    /// * `descriptor` - Accepted value shape(s)
    pub fn new(name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        Self {
            field: FieldSpec::new(name, descriptor),
        }
    }

    /// Sets the field description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.field.description = Some(description.into());
        self
    }

    /// Attaches a validator. Attachment order is execution order.
    pub fn validator(mut self, validator: ValidatorSpec) -> Self {
        self.field.validators.push(validator);
        self
    }

    /// Attaches several validators.
    pub fn validators(mut self, validators: Vec<ValidatorSpec>) -> Self {
        self.field.validators.extend(validators);
        self
    }

    /// Builds the field.
    pub fn build(self) -> FieldSpec {
        self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelError;

    #[test]
    fn test_model_builder() {
        let schema = ModelBuilder::new("User")
            .plain_field("name", TypeDescriptor::string())
            .field(
                FieldBuilder::new("age", TypeDescriptor::int())
                    .description("Age in years")
                    .validator(ValidatorSpec::min(18))
                    .validator(ValidatorSpec::max(130))
                    .build(),
            )
            .build()
            .unwrap();

        assert_eq!(schema.name, "User");
        assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["name", "age"]);
        let age = schema.field("age").unwrap();
        assert_eq!(age.validators.len(), 2);
        assert_eq!(age.validators[0].kind(), "min_value");
        assert!(!schema.field("name").unwrap().is_explicit());
    }

    #[test]
    fn test_builder_rejects_duplicates() {
        let err = ModelBuilder::new("User")
            .plain_field("id", TypeDescriptor::int())
            .plain_field("id", TypeDescriptor::int())
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
    }

    #[test]
    fn test_builder_rejects_empty_name() {
        assert!(ModelBuilder::new("  ").build().is_err());
    }
}
