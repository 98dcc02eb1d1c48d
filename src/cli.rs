//! Command-line interface for datadelta

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "datadelta")]
#[command(about = "Compare two tabular datasets that share a primary key")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compare an old and a new table
    Compare {
        /// Old table (CSV, TSV, Parquet, JSON or JSONL)
        old: PathBuf,

        /// New table
        new: PathBuf,

        /// Column identifying a record in both tables
        #[arg(long, short = 'k')]
        primary_key: String,

        /// Restrict value and type comparison to these columns (comma separated)
        #[arg(long, value_delimiter = ',')]
        columns: Option<Vec<String>>,

        /// Write an HTML report to this file (".html" is appended when missing)
        #[arg(long)]
        html: Option<PathBuf>,

        /// Save the report as a snapshot file for regression testing
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Overwrite existing report and snapshot files
        #[arg(long)]
        overwrite: bool,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,

        /// Identifiers shown per changed category (overrides the config file)
        #[arg(long, value_parser = validate_positive)]
        max_detail_values: Option<usize>,
    },

    /// Show a saved report snapshot
    Show {
        /// Snapshot file
        snapshot: PathBuf,

        /// Output format: "pretty", "json"
        #[arg(long, default_value = "pretty")]
        format: String,
    },
}

/// Parse output format string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {}. Use 'pretty' or 'json'", s)),
        }
    }
}

/// Validate that a count is greater than 0
fn validate_positive(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("Invalid value: '{}'. Must be a positive integer.", s))?;

    if value == 0 {
        return Err("Value must be greater than 0".to_string());
    }

    Ok(value)
}
