//! Model and field declarations.
//!
//! A [`ModelSchema`] names a model type and lists its [`FieldSpec`]s in
//! declaration order. Each field carries a [`TypeDescriptor`] and the
//! validators explicitly attached to it.

use crate::descriptor::TypeDescriptor;
use crate::error::{ModelError, Result};
use crate::value::{Mapping, Number, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_true() -> bool {
    true
}

/// A model type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Model type name, unique within a catalog
    pub name: String,

    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fields in declaration order
    pub fields: Vec<FieldSpec>,
}

impl ModelSchema {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Checks the declaration itself: non-empty names, no duplicate fields.
    pub fn check_definition(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ModelError::configuration("model name cannot be empty"));
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.trim().is_empty() {
                return Err(ModelError::configuration(format!(
                    "model '{}' declares a field with an empty name",
                    self.name
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(ModelError::configuration(format!(
                    "duplicate field '{}' in model '{}'",
                    field.name, self.name
                )));
            }
        }
        Ok(())
    }
}

/// Immutable binding of a field name, its type, and its attached validators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name
    pub name: String,

    /// Accepted value shape(s)
    #[serde(rename = "type")]
    pub descriptor: TypeDescriptor,

    /// Explicitly attached validators, in attachment order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<ValidatorSpec>,

    /// Optional human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, descriptor: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            descriptor,
            validators: Vec::new(),
            description: None,
        }
    }

    /// True iff at least one validator is explicitly attached.
    pub fn is_explicit(&self) -> bool {
        !self.validators.is_empty()
    }

    /// Whether a validator of the given kind is attached.
    pub fn has_kind(&self, kind: &str) -> bool {
        self.validators.iter().any(|v| v.kind() == kind)
    }

    /// Whether `None` is an acceptable value for this field, either from the
    /// descriptor or from an attached `none_allowance` that allows it.
    pub fn allows_none(&self) -> bool {
        self.descriptor.is_nullable()
            || self
                .validators
                .iter()
                .any(|v| matches!(v, ValidatorSpec::NoneAllowance { allow: true }))
    }
}

/// A named enumeration whose values serve as a membership list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumClass {
    pub name: String,
    pub values: Vec<Value>,
}

impl EnumClass {
    pub fn new<T: Into<Value>>(name: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Configuration of an explicitly attached validator.
///
/// The `type` tag is the validator kind id the registry dispatches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidatorSpec {
    /// Whether `None` is accepted for the field
    NoneAllowance {
        #[serde(default = "default_true")]
        allow: bool,
    },

    /// The field must not be `None`
    Required,

    MinValue {
        min: Number,
        #[serde(default = "default_true")]
        inclusive: bool,
    },

    MaxValue {
        max: Number,
        #[serde(default = "default_true")]
        inclusive: bool,
    },

    /// Both bounds optional, each with its own inclusivity
    Range {
        #[serde(default)]
        min: Option<Number>,
        #[serde(default)]
        max: Option<Number>,
        #[serde(default = "default_true")]
        min_inclusive: bool,
        #[serde(default = "default_true")]
        max_inclusive: bool,
    },

    MinLength {
        min_length: usize,
    },

    MaxLength {
        max_length: usize,
    },

    LengthRange {
        min_length: usize,
        max_length: usize,
    },

    /// Regular expression anchored at the start of the value
    Pattern {
        pattern: String,
    },

    Contains {
        substring: String,
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },

    StartsWith {
        prefix: String,
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },

    EndsWith {
        suffix: String,
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },

    /// Value must be a member of the allowed values or of the enum class
    OneOf {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        allowed_values: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enum_class: Option<EnumClass>,
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },

    /// Value must not be a member of the disallowed values or of the enum class
    NotIn {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        disallowed_values: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        enum_class: Option<EnumClass>,
        #[serde(default = "default_true")]
        case_sensitive: bool,
    },

    /// A user-registered validator kind
    Custom {
        kind: String,
        #[serde(default)]
        params: Mapping,
    },
}

impl ValidatorSpec {
    pub fn allow_none(allow: bool) -> Self {
        ValidatorSpec::NoneAllowance { allow }
    }

    pub fn required() -> Self {
        ValidatorSpec::Required
    }

    pub fn min(min: impl Into<Number>) -> Self {
        ValidatorSpec::MinValue {
            min: min.into(),
            inclusive: true,
        }
    }

    pub fn min_exclusive(min: impl Into<Number>) -> Self {
        ValidatorSpec::MinValue {
            min: min.into(),
            inclusive: false,
        }
    }

    pub fn max(max: impl Into<Number>) -> Self {
        ValidatorSpec::MaxValue {
            max: max.into(),
            inclusive: true,
        }
    }

    pub fn max_exclusive(max: impl Into<Number>) -> Self {
        ValidatorSpec::MaxValue {
            max: max.into(),
            inclusive: false,
        }
    }

    /// Inclusive range on both ends.
    pub fn range(min: impl Into<Number>, max: impl Into<Number>) -> Self {
        ValidatorSpec::Range {
            min: Some(min.into()),
            max: Some(max.into()),
            min_inclusive: true,
            max_inclusive: true,
        }
    }

    pub fn min_length(min_length: usize) -> Self {
        ValidatorSpec::MinLength { min_length }
    }

    pub fn max_length(max_length: usize) -> Self {
        ValidatorSpec::MaxLength { max_length }
    }

    pub fn length_range(min_length: usize, max_length: usize) -> Self {
        ValidatorSpec::LengthRange {
            min_length,
            max_length,
        }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        ValidatorSpec::Pattern {
            pattern: pattern.into(),
        }
    }

    pub fn contains(substring: impl Into<String>) -> Self {
        ValidatorSpec::Contains {
            substring: substring.into(),
            case_sensitive: true,
        }
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        ValidatorSpec::StartsWith {
            prefix: prefix.into(),
            case_sensitive: true,
        }
    }

    pub fn ends_with(suffix: impl Into<String>) -> Self {
        ValidatorSpec::EndsWith {
            suffix: suffix.into(),
            case_sensitive: true,
        }
    }

    pub fn one_of<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        ValidatorSpec::OneOf {
            allowed_values: values.into_iter().map(Into::into).collect(),
            enum_class: None,
            case_sensitive: true,
        }
    }

    pub fn one_of_enum(enum_class: EnumClass) -> Self {
        ValidatorSpec::OneOf {
            allowed_values: Vec::new(),
            enum_class: Some(enum_class),
            case_sensitive: true,
        }
    }

    pub fn not_in<T: Into<Value>>(values: impl IntoIterator<Item = T>) -> Self {
        ValidatorSpec::NotIn {
            disallowed_values: values.into_iter().map(Into::into).collect(),
            enum_class: None,
            case_sensitive: true,
        }
    }

    pub fn custom(kind: impl Into<String>, params: Mapping) -> Self {
        ValidatorSpec::Custom {
            kind: kind.into(),
            params,
        }
    }

    /// Switches string and membership validators to case-insensitive matching.
    /// Other kinds are returned unchanged.
    pub fn case_insensitive(mut self) -> Self {
        match &mut self {
            ValidatorSpec::Contains { case_sensitive, .. }
            | ValidatorSpec::StartsWith { case_sensitive, .. }
            | ValidatorSpec::EndsWith { case_sensitive, .. }
            | ValidatorSpec::OneOf { case_sensitive, .. }
            | ValidatorSpec::NotIn { case_sensitive, .. } => *case_sensitive = false,
            _ => {}
        }
        self
    }

    /// Kind id used for registry dispatch and explicit/default precedence.
    pub fn kind(&self) -> &str {
        match self {
            ValidatorSpec::NoneAllowance { .. } => "none_allowance",
            ValidatorSpec::Required => "required",
            ValidatorSpec::MinValue { .. } => "min_value",
            ValidatorSpec::MaxValue { .. } => "max_value",
            ValidatorSpec::Range { .. } => "range",
            ValidatorSpec::MinLength { .. } => "min_length",
            ValidatorSpec::MaxLength { .. } => "max_length",
            ValidatorSpec::LengthRange { .. } => "length_range",
            ValidatorSpec::Pattern { .. } => "pattern",
            ValidatorSpec::Contains { .. } => "contains",
            ValidatorSpec::StartsWith { .. } => "starts_with",
            ValidatorSpec::EndsWith { .. } => "ends_with",
            ValidatorSpec::OneOf { .. } => "one_of",
            ValidatorSpec::NotIn { .. } => "not_in",
            ValidatorSpec::Custom { kind, .. } => kind,
        }
    }

    /// Membership list for `one_of` / `not_in`; the enum class wins when set.
    pub fn members(&self) -> &[Value] {
        match self {
            ValidatorSpec::OneOf {
                allowed_values: values,
                enum_class,
                ..
            }
            | ValidatorSpec::NotIn {
                disallowed_values: values,
                enum_class,
                ..
            } => enum_class.as_ref().map_or(values.as_slice(), |e| e.values.as_slice()),
            _ => &[],
        }
    }

    /// Configuration snapshot shown as the "expected schema" of a failure.
    pub fn expected(&self) -> Vec<(String, String)> {
        fn pair(key: &str, value: impl ToString) -> (String, String) {
            (key.to_string(), value.to_string())
        }

        match self {
            ValidatorSpec::NoneAllowance { allow } => vec![pair("allow_none", allow)],
            ValidatorSpec::Required => vec![pair("required", true)],
            ValidatorSpec::MinValue { min, inclusive } => {
                vec![pair("min", min), pair("inclusive", inclusive)]
            }
            ValidatorSpec::MaxValue { max, inclusive } => {
                vec![pair("max", max), pair("inclusive", inclusive)]
            }
            ValidatorSpec::Range {
                min,
                max,
                min_inclusive,
                max_inclusive,
            } => {
                let mut pairs = Vec::new();
                if let Some(min) = min {
                    pairs.push(pair("min", min));
                    pairs.push(pair("min_inclusive", min_inclusive));
                }
                if let Some(max) = max {
                    pairs.push(pair("max", max));
                    pairs.push(pair("max_inclusive", max_inclusive));
                }
                pairs
            }
            ValidatorSpec::MinLength { min_length } => vec![pair("min_length", min_length)],
            ValidatorSpec::MaxLength { max_length } => vec![pair("max_length", max_length)],
            ValidatorSpec::LengthRange {
                min_length,
                max_length,
            } => vec![pair("min_length", min_length), pair("max_length", max_length)],
            ValidatorSpec::Pattern { pattern } => vec![pair("pattern", pattern)],
            ValidatorSpec::Contains {
                substring,
                case_sensitive,
            } => vec![pair("contains", substring), pair("case_sensitive", case_sensitive)],
            ValidatorSpec::StartsWith {
                prefix,
                case_sensitive,
            } => vec![pair("starts_with", prefix), pair("case_sensitive", case_sensitive)],
            ValidatorSpec::EndsWith {
                suffix,
                case_sensitive,
            } => vec![pair("ends_with", suffix), pair("case_sensitive", case_sensitive)],
            ValidatorSpec::OneOf {
                enum_class,
                case_sensitive,
                ..
            }
            | ValidatorSpec::NotIn {
                enum_class,
                case_sensitive,
                ..
            } => {
                let mut pairs = vec![pair(self.kind(), Value::List(self.members().to_vec()).repr())];
                if let Some(enum_class) = enum_class {
                    pairs.push(pair("enum_class", &enum_class.name));
                }
                pairs.push(pair("case_sensitive", case_sensitive));
                pairs
            }
            ValidatorSpec::Custom { kind, params } => {
                let mut pairs = vec![pair("validator", kind)];
                pairs.extend(params.iter().map(|(k, v)| pair(k, v.repr())));
                pairs
            }
        }
    }
}
