use anyhow::Result;
use colored::*;
use models_core::{Mapping, ValidationError, ValidationResult};
use serde_json::json;

/// Outcome of validating one input record.
pub struct RecordReport {
    pub index: usize,
    pub result: ValidationResult,
    /// Validated values, present when the record passed
    pub normalized: Option<Mapping>,
    /// Reason the record was rejected before field validation
    pub problem: Option<String>,
}

impl RecordReport {
    pub fn rejected(index: usize, problem: String) -> Self {
        Self {
            index,
            result: ValidationResult::new(),
            normalized: None,
            problem: Some(problem),
        }
    }

    pub fn passed(&self) -> bool {
        self.problem.is_none() && self.result.is_valid()
    }
}

pub fn print_validation_report(model: &str, reports: &[RecordReport], format: &str) -> Result<()> {
    match format {
        "json" => print_json_report(model, reports),
        _ => {
            print_text_report(model, reports);
            Ok(())
        }
    }
}

fn print_text_report(model: &str, reports: &[RecordReport]) {
    println!("\n{}", "═".repeat(60));
    println!("{}", format!("  VALIDATION REPORT: {}", model).bold());
    println!("{}", "═".repeat(60));

    let failed = reports.iter().filter(|r| !r.passed()).count();
    if failed == 0 {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    for report in reports {
        if let Some(problem) = &report.problem {
            println!(
                "\n{} Record {}: {}",
                "✗".red().bold(),
                report.index,
                problem.red()
            );
        } else if report.result.is_valid() {
            println!("\n{} Record {}: valid", "✓".green().bold(), report.index);
        } else {
            println!(
                "\n{} Record {}: {}",
                "✗".red().bold(),
                report.index,
                report.result.summary().red()
            );
            println!("{}", report.result.render());
        }
    }

    let error_count: usize = reports.iter().map(|r| r.result.len()).sum();
    println!("\n{}", "Summary:".bold());
    println!("  Records:      {}", reports.len());
    println!("  Failed:       {}", failed);
    println!("  Total errors: {}", error_count);
    println!("{}", "═".repeat(60));
}

fn error_json(error: &ValidationError) -> serde_json::Value {
    let expected: serde_json::Map<String, serde_json::Value> = error
        .expected
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
        .collect();
    json!({
        "path": error.path,
        "code": error.code(),
        "kind": error.kind.as_str(),
        "message": error.message,
        "received": error.received,
        "expected": expected,
    })
}

fn print_json_report(model: &str, reports: &[RecordReport]) -> Result<()> {
    let records: Vec<_> = reports
        .iter()
        .map(|report| {
            json!({
                "index": report.index,
                "valid": report.passed(),
                "problem": report.problem,
                "errors": report.result.iter().map(error_json).collect::<Vec<_>>(),
                "normalized": report.normalized,
            })
        })
        .collect();

    let failed = reports.iter().filter(|r| !r.passed()).count();
    let output = json!({
        "model": model,
        "passed": failed == 0,
        "records": records,
        "summary": {
            "record_count": reports.len(),
            "failed_count": failed,
            "error_count": reports.iter().map(|r| r.result.len()).sum::<usize>(),
        }
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
