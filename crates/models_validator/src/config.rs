//! Engine configuration.

/// Handling of input fields a model does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtraFields {
    /// Drop them, logging a warning
    #[default]
    Ignore,
    /// Reject them: a configuration error at construction, a validation
    /// error inside nested values
    Forbid,
}

/// Options shared by every model in a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum depth of nested model validation
    pub max_nesting_depth: usize,

    /// Policy for undeclared fields
    pub extra_fields: ExtraFields,

    /// Whether the text form is produced only from valid instances
    pub validate_on_serialize: bool,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self {
            max_nesting_depth: 32,
            extra_fields: ExtraFields::Ignore,
            validate_on_serialize: true,
        }
    }

    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_extra_fields(mut self, policy: ExtraFields) -> Self {
        self.extra_fields = policy;
        self
    }

    pub fn with_validate_on_serialize(mut self, enabled: bool) -> Self {
        self.validate_on_serialize = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
