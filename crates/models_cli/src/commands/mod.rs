pub mod check;
pub mod validate;

use anyhow::{Context, Result};
use models_parser::{CatalogDocument, ExtraFieldsSetting, Settings, parse_file};
use models_validator::{Catalog, EngineConfig, ExtraFields};
use std::path::Path;
use std::sync::Arc;

/// Engine configuration from declaration settings; unset values keep defaults.
pub fn engine_config(settings: &Settings) -> EngineConfig {
    let mut config = EngineConfig::new();
    if let Some(depth) = settings.max_nesting_depth {
        config = config.with_max_nesting_depth(depth);
    }
    if let Some(policy) = settings.extra_fields {
        config = config.with_extra_fields(match policy {
            ExtraFieldsSetting::Ignore => ExtraFields::Ignore,
            ExtraFieldsSetting::Forbid => ExtraFields::Forbid,
        });
    }
    if let Some(enabled) = settings.validate_on_serialize {
        config = config.with_validate_on_serialize(enabled);
    }
    config
}

/// Parses a declaration file and registers its models.
pub fn load_catalog(
    declaration_path: &str,
    config: impl FnOnce(EngineConfig) -> EngineConfig,
) -> Result<(CatalogDocument, Arc<Catalog>)> {
    let path = Path::new(declaration_path);
    let document = parse_file(path)
        .with_context(|| format!("Failed to parse declaration file: {}", declaration_path))?;

    let catalog = Catalog::builder()
        .models(document.models.iter().cloned())
        .config(config(engine_config(&document.settings)))
        .build()
        .with_context(|| format!("Invalid model declarations in: {}", declaration_path))?;

    Ok((document, catalog))
}
