use anyhow::Result;
use models_core::ModelSchema;
use serde_json::json;
use tracing::info;

use crate::output;

pub fn execute(declaration_path: &str, format: &str) -> Result<()> {
    info!("Checking declaration: {}", declaration_path);

    // Registering the models resolves references, validator kinds and patterns
    let (document, catalog) = super::load_catalog(declaration_path, |config| config)?;

    if format == "json" {
        let models: Vec<_> = document.models.iter().map(model_summary).collect();
        let summary = json!({
            "valid": true,
            "version": document.version,
            "settings": {
                "max_nesting_depth": catalog.config().max_nesting_depth,
                "extra_fields": format!("{:?}", catalog.config().extra_fields).to_lowercase(),
                "validate_on_serialize": catalog.config().validate_on_serialize,
            },
            "models": models,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::print_info(&format!(
        "Declaration loaded: {} model(s) (version: {})",
        catalog.len(),
        document.version.as_deref().unwrap_or("N/A")
    ));
    output::print_success("Model declarations are valid");

    println!("\nDeclaration Summary:");
    println!("  Models:        {}", catalog.len());
    println!("  Max depth:     {}", catalog.config().max_nesting_depth);
    println!("  Extra fields:  {:?}", catalog.config().extra_fields);

    for model in &document.models {
        println!("\nModel {}", model.name);
        if let Some(description) = &model.description {
            println!("  {}", description);
        }
        println!("  Fields: {}", model.fields.len());
        for field in &model.fields {
            let kinds: Vec<&str> = field.validators.iter().map(|v| v.kind()).collect();
            if kinds.is_empty() {
                println!("    {}: {}", field.name, field.descriptor);
            } else {
                println!("    {}: {} [{}]", field.name, field.descriptor, kinds.join(", "));
            }
        }
    }

    Ok(())
}

fn model_summary(model: &ModelSchema) -> serde_json::Value {
    let fields: Vec<_> = model
        .fields
        .iter()
        .map(|field| {
            json!({
                "name": field.name,
                "type": field.descriptor.to_string(),
                "validators": field.validators.iter().map(|v| v.kind()).collect::<Vec<_>>(),
            })
        })
        .collect();
    json!({
        "name": model.name,
        "description": model.description,
        "fields": fields,
    })
}
