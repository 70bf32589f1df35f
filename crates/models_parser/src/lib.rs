//! Parser for model declaration files (YAML/TOML/JSON formats).
//!
//! A declaration file lists model types, their fields, and the validators
//! attached to each field, plus optional engine settings:
//!
//! ```rust
//! use models_parser::parse_yaml;
//!
//! let yaml = r#"
//! version: "1.0.0"
//! settings:
//!   extra_fields: forbid
//! models:
//!   - name: Address
//!     fields:
//!       - name: street
//!         type: str
//!       - name: city
//!         type: str
//!         validators:
//!           - type: min_length
//!             min_length: 2
//!   - name: Person
//!     fields:
//!       - name: addresses
//!         type: List[Address]
//! "#;
//!
//! let document = parse_yaml(yaml).expect("Failed to parse declaration");
//! assert_eq!(document.models.len(), 2);
//! assert_eq!(document.models[1].fields[0].descriptor.to_string(), "List[Address]");
//! ```

use models_core::{ModelError, ModelSchema};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while parsing declaration files.
#[derive(Debug, Error)]
pub enum ParserError {
    /// YAML parsing or deserialization failed
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// TOML parsing or deserialization failed
    #[error("Failed to parse TOML: {0}")]
    TomlError(String),

    /// JSON parsing or deserialization failed
    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error
    #[error("File I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Unsupported file format
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Invalid file extension
    #[error("Invalid or missing file extension")]
    InvalidExtension,

    /// The document parsed but declares something inconsistent
    #[error("Invalid declaration: {0}")]
    Declaration(#[from] ModelError),
}

/// Result type alias for parser operations.
pub type Result<T> = std::result::Result<T, ParserError>;

/// Supported declaration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationFormat {
    /// YAML format (.yml, .yaml)
    Yaml,
    /// TOML format (.toml)
    Toml,
    /// JSON format (.json)
    Json,
}

/// Extra-field policy as written in declaration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraFieldsSetting {
    Ignore,
    Forbid,
}

/// Engine settings carried by a declaration file. Unset values keep the
/// engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_nesting_depth: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_fields: Option<ExtraFieldsSetting>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate_on_serialize: Option<bool>,
}

/// A parsed declaration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Declaration format version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub settings: Settings,

    /// Model types in declaration order
    pub models: Vec<ModelSchema>,
}

impl CatalogDocument {
    /// Looks up a declared model by name.
    pub fn model(&self, name: &str) -> Option<&ModelSchema> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Checks every model declaration and rejects duplicate model names.
    ///
    /// References between models and validator kinds are resolved later, when
    /// the models are registered with the engine.
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for model in &self.models {
            model.check_definition()?;
            if !seen.insert(model.name.as_str()) {
                return Err(ModelError::configuration(format!(
                    "model type '{}' is declared twice",
                    model.name
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// Parse a declaration document from a YAML string.
pub fn parse_yaml(content: &str) -> Result<CatalogDocument> {
    let document: CatalogDocument = serde_yaml_ng::from_str(content)?;
    Ok(document)
}

/// Parse a declaration document from a TOML string.
///
/// # Example
///
/// ```rust
/// use models_parser::parse_toml;
///
/// let toml = r#"
/// [[models]]
/// name = "Record"
///
/// [[models.fields]]
/// name = "value"
/// type = "int"
/// validators = [{ type = "min_value", min = 10 }]
/// "#;
///
/// let document = parse_toml(toml).unwrap();
/// assert_eq!(document.models[0].name, "Record");
/// ```
pub fn parse_toml(content: &str) -> Result<CatalogDocument> {
    let document: CatalogDocument =
        toml::from_str(content).map_err(|e| ParserError::TomlError(e.to_string()))?;
    Ok(document)
}

/// Parse a declaration document from a JSON string.
pub fn parse_json(content: &str) -> Result<CatalogDocument> {
    let document: CatalogDocument = serde_json::from_str(content)?;
    Ok(document)
}

/// Detect the declaration format from a file path based on its extension.
///
/// # Supported Extensions
///
/// * `.yaml`, `.yml` → `DeclarationFormat::Yaml`
/// * `.toml` → `DeclarationFormat::Toml`
/// * `.json` → `DeclarationFormat::Json`
///
/// # Errors
///
/// Returns `ParserError::InvalidExtension` if the file has no extension.
/// Returns `ParserError::UnsupportedFormat` if the extension is not recognized.
pub fn detect_format(path: &Path) -> Result<DeclarationFormat> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or(ParserError::InvalidExtension)?;

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => Ok(DeclarationFormat::Yaml),
        "toml" => Ok(DeclarationFormat::Toml),
        "json" => Ok(DeclarationFormat::Json),
        other => Err(ParserError::UnsupportedFormat(other.to_string())),
    }
}

/// Parse a declaration file with automatic format detection, then check it.
///
/// ```no_run
/// use models_parser::parse_file;
/// use std::path::Path;
///
/// let document = parse_file(Path::new("models/people.yml")).unwrap();
/// println!("Loaded {} model(s)", document.models.len());
/// ```
pub fn parse_file(path: &Path) -> Result<CatalogDocument> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    debug!("Parsing {:?} declaration: {}", format, path.display());

    let document = match format {
        DeclarationFormat::Yaml => parse_yaml(&content)?,
        DeclarationFormat::Toml => parse_toml(&content)?,
        DeclarationFormat::Json => parse_json(&content)?,
    };
    document.check()?;
    Ok(document)
}
