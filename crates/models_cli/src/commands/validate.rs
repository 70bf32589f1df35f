use anyhow::{Context, Result, anyhow};
use models_validator::{ExtraFields, Model};
use std::path::Path;
use tracing::{debug, info};

use crate::output::{self, RecordReport};

pub fn execute(
    declaration_path: &str,
    data_path: &str,
    model: &str,
    forbid_extra: bool,
    format: &str,
) -> Result<()> {
    info!("Validating records: {}", data_path);
    info!("Model: {}", model);
    info!("Forbid extra fields: {}", forbid_extra);

    let (_, catalog) = super::load_catalog(declaration_path, |config| {
        if forbid_extra {
            config.with_extra_fields(ExtraFields::Forbid)
        } else {
            config
        }
    })?;

    if !catalog.contains(model) {
        let known: Vec<&str> = catalog.model_names().collect();
        return Err(anyhow!(
            "Model '{}' is not declared in {} (declared: {})",
            model,
            declaration_path,
            known.join(", ")
        ));
    }

    let records = read_records(Path::new(data_path))?;
    if format != "json" {
        output::print_info(&format!(
            "Loaded {} record(s) for model {}",
            records.len(),
            model
        ));
    }

    let mut reports = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        debug!("Validating record {}", index);
        let report = match Model::build_from_json(&catalog, model, record) {
            Ok((instance, result)) => RecordReport {
                index,
                normalized: result.is_valid().then(|| instance.to_mapping()),
                result,
                problem: None,
            },
            // Extra fields under the forbidding policy and non-object records
            Err(e) if e.is_configuration() => RecordReport::rejected(index, e.to_string()),
            Err(e) => return Err(e).context("Validation failed"),
        };
        reports.push(report);
    }

    output::print_validation_report(model, &reports, format)?;

    if reports.iter().any(|r| !r.passed()) {
        std::process::exit(1);
    }

    Ok(())
}

/// Reads a JSON data file: a single object or an array of objects.
fn read_records(path: &Path) -> Result<Vec<serde_json::Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file: {}", path.display()))?;
    let json: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON data file: {}", path.display()))?;

    match json {
        serde_json::Value::Array(records) => Ok(records),
        record @ serde_json::Value::Object(_) => Ok(vec![record]),
        other => Err(anyhow!(
            "Data file must contain a JSON object or an array of objects, found: {}",
            other
        )),
    }
}
