//! Validator registry.
//!
//! The registry maps validator kind ids to implementations, in a fixed
//! registration order. That order is the order default checks run in. A
//! process-wide registry holding the built-in kinds is available through
//! [`ValidatorRegistry::global`]; catalogs can be given their own registry
//! instead, built with [`RegistryBuilder`].

use crate::membership::{NotInValidator, OneOfValidator};
use crate::numeric::{MaxValueValidator, MinValueValidator, RangeValidator};
use crate::presence::{NoneAllowanceValidator, RequiredValidator};
use crate::text::{
    ContainsValidator, EndsWithValidator, LengthRangeValidator, MaxLengthValidator,
    MinLengthValidator, PatternValidator, StartsWithValidator,
};
use crate::validator::Validator;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

static GLOBAL: Lazy<Arc<ValidatorRegistry>> =
    Lazy::new(|| Arc::new(RegistryBuilder::new().with_builtins().build()));

/// A registered validator kind.
#[derive(Clone)]
pub struct Registration {
    kind: String,
    skip_on_none: bool,
    validator: Arc<dyn Validator>,
}

impl Registration {
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Whether the engine skips this kind for `None` values.
    ///
    /// Only kinds that decide on `None` itself (none-allowance, required)
    /// run on `None`; those kinds also run before type matching.
    pub fn skip_on_none(&self) -> bool {
        self.skip_on_none
    }

    pub fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("kind", &self.kind)
            .field("skip_on_none", &self.skip_on_none)
            .finish()
    }
}

/// Ordered set of validator kinds.
#[derive(Debug, Clone, Default)]
pub struct ValidatorRegistry {
    entries: Vec<Registration>,
    index: HashMap<String, usize>,
}

impl ValidatorRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The shared registry of built-in kinds.
    pub fn global() -> Arc<ValidatorRegistry> {
        Arc::clone(&GLOBAL)
    }

    pub fn get(&self, kind: &str) -> Option<&Registration> {
        self.index.get(kind).map(|&i| &self.entries[i])
    }

    /// Registration order of a kind.
    pub fn position(&self, kind: &str) -> Option<usize> {
        self.index.get(kind).copied()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.index.contains_key(kind)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Registration> {
        self.entries.iter()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.kind.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for a [`ValidatorRegistry`].
///
/// Registering a kind twice replaces the earlier implementation but keeps its
/// original position.
///
/// # Example
///
/// ```rust
/// use models_validator::{ValidationInput, ValidationOutcome, Validator, ValidatorRegistry};
/// use models_core::ValidatorSpec;
///
/// struct Even;
///
/// impl Validator for Even {
///     fn check(&self, _spec: &ValidatorSpec, input: &ValidationInput<'_>) -> ValidationOutcome {
///         match input.value.as_i64() {
///             Some(n) if n % 2 == 0 => ValidationOutcome::valid(),
///             _ => ValidationOutcome::fail(
///                 models_core::ErrorKind::Custom,
///                 format!("Value {} is not even", input.value),
///             ),
///         }
///     }
/// }
///
/// let registry = ValidatorRegistry::builder()
///     .with_builtins()
///     .register("even", Even)
///     .build();
/// assert_eq!(registry.kinds().last(), Some("even"));
/// ```
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<Registration>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the built-in kinds in their standard order.
    pub fn with_builtins(self) -> Self {
        self.register_presence("none_allowance", NoneAllowanceValidator)
            .register_presence("required", RequiredValidator)
            .register("min_value", MinValueValidator)
            .register("max_value", MaxValueValidator)
            .register("range", RangeValidator)
            .register("min_length", MinLengthValidator)
            .register("max_length", MaxLengthValidator)
            .register("length_range", LengthRangeValidator)
            .register("pattern", PatternValidator)
            .register("contains", ContainsValidator)
            .register("starts_with", StartsWithValidator)
            .register("ends_with", EndsWithValidator)
            .register("one_of", OneOfValidator)
            .register("not_in", NotInValidator)
    }

    /// Registers a kind that is skipped for `None` values.
    pub fn register(self, kind: impl Into<String>, validator: impl Validator + 'static) -> Self {
        self.insert(kind.into(), true, Arc::new(validator))
    }

    /// Registers a kind that also runs on `None`, ahead of type matching.
    pub fn register_presence(
        self,
        kind: impl Into<String>,
        validator: impl Validator + 'static,
    ) -> Self {
        self.insert(kind.into(), false, Arc::new(validator))
    }

    fn insert(mut self, kind: String, skip_on_none: bool, validator: Arc<dyn Validator>) -> Self {
        let registration = Registration {
            kind,
            skip_on_none,
            validator,
        };
        match self.entries.iter_mut().find(|r| r.kind == registration.kind) {
            Some(existing) => {
                debug!("Replacing validator kind '{}'", registration.kind);
                *existing = registration;
            }
            None => self.entries.push(registration),
        }
        self
    }

    pub fn build(self) -> ValidatorRegistry {
        let index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, r)| (r.kind.clone(), i))
            .collect();
        ValidatorRegistry {
            entries: self.entries,
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{ValidationInput, ValidationOutcome};
    use models_core::ValidatorSpec;
    use pretty_assertions::assert_eq;

    struct AlwaysValid;

    impl Validator for AlwaysValid {
        fn check(&self, _spec: &ValidatorSpec, _input: &ValidationInput<'_>) -> ValidationOutcome {
            ValidationOutcome::valid()
        }
    }

    #[test]
    fn test_builtin_order() {
        let registry = ValidatorRegistry::global();
        let kinds: Vec<&str> = registry.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                "none_allowance",
                "required",
                "min_value",
                "max_value",
                "range",
                "min_length",
                "max_length",
                "length_range",
                "pattern",
                "contains",
                "starts_with",
                "ends_with",
                "one_of",
                "not_in",
            ]
        );
        assert!(!registry.get("none_allowance").unwrap().skip_on_none());
        assert!(registry.get("min_value").unwrap().skip_on_none());
    }

    #[test]
    fn test_replacement_keeps_position() {
        let registry = ValidatorRegistry::builder()
            .with_builtins()
            .register("pattern", AlwaysValid)
            .register("shout", AlwaysValid)
            .build();

        assert_eq!(registry.position("pattern"), Some(8));
        assert_eq!(registry.position("shout"), Some(14));
        assert_eq!(registry.len(), 15);
    }

    #[test]
    fn test_unknown_kind() {
        let registry = ValidatorRegistry::builder().build();
        assert!(registry.is_empty());
        assert!(registry.get("min_value").is_none());
    }
}
