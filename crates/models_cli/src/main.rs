mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "vme")]
#[command(version, about = "Validated Models Engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate JSON records against a declared model
    Validate {
        /// Path to the declaration file (YAML, TOML or JSON)
        declaration: String,

        /// JSON file holding one record object or an array of records
        data: String,

        /// Model type the records are validated as
        #[arg(short, long)]
        model: String,

        /// Reject fields the model does not declare
        #[arg(long)]
        forbid_extra: bool,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Check a declaration file without validating data
    Check {
        /// Path to the declaration file (YAML, TOML or JSON)
        declaration: String,

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    // Execute command
    match cli.command {
        Commands::Validate {
            declaration,
            data,
            model,
            forbid_extra,
            format,
        } => commands::validate::execute(&declaration, &data, &model, forbid_extra, &format),

        Commands::Check {
            declaration,
            format,
        } => commands::check::execute(&declaration, &format),
    }
}
