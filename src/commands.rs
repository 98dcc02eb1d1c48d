//! Command implementations for the datadelta CLI

use crate::cli::{Commands, OutputFormat};
use crate::comparison::ReportAssembler;
use crate::config::DataDeltaConfig;
use crate::data::DataLoader;
use crate::error::{DataDeltaError, Result};
use crate::output::{HtmlExporter, JsonFormatter, PrettyPrinter};
use crate::progress::ProgressReporter;
use crate::snapshot::ReportSnapshot;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// Execute a command
pub fn execute_command(command: Commands, config_path: Option<&Path>) -> Result<()> {
    match command {
        Commands::Compare {
            old,
            new,
            primary_key,
            columns,
            html,
            snapshot,
            overwrite,
            format,
            max_detail_values,
        } => compare_command(
            config_path,
            CompareArgs {
                old,
                new,
                primary_key,
                columns,
                html,
                snapshot,
                overwrite,
                format,
                max_detail_values,
            },
        ),
        Commands::Show { snapshot, format } => show_command(config_path, &snapshot, &format),
    }
}

struct CompareArgs {
    old: PathBuf,
    new: PathBuf,
    primary_key: String,
    columns: Option<Vec<String>>,
    html: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    overwrite: bool,
    format: String,
    max_detail_values: Option<usize>,
}

fn load_config(config_path: Option<&Path>, max_detail_values: Option<usize>) -> Result<DataDeltaConfig> {
    let mut config = DataDeltaConfig::load_or_default(config_path)?;
    if let Some(max) = max_detail_values {
        config.export.max_detail_values = max;
    }
    config.validate()?;
    Ok(config)
}

/// Load both tables, compare them and write the requested outputs
fn compare_command(config_path: Option<&Path>, args: CompareArgs) -> Result<()> {
    let format = OutputFormat::parse(&args.format).map_err(DataDeltaError::invalid_input)?;
    let config = load_config(config_path, args.max_detail_values)?;

    let columns: Option<Vec<String>> = args.columns.map(|cols| {
        cols.into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    });
    if matches!(&columns, Some(cols) if cols.is_empty()) {
        return Err(DataDeltaError::invalid_input("--columns must name at least one column"));
    }

    let mut progress = ProgressReporter::new(format == OutputFormat::Pretty);
    let loader = DataLoader::new_with_config(&config.loader)?;

    progress.stage("Loading old table...");
    let old = loader
        .load_table(&args.old)
        .with_context(|| format!("Failed to load old table {}", args.old.display()))?;

    progress.stage("Loading new table...");
    let new = loader
        .load_table(&args.new)
        .with_context(|| format!("Failed to load new table {}", args.new.display()))?;

    progress.stage("Comparing tables...");
    let (report, comparison) =
        ReportAssembler::assemble(&old, &new, &args.primary_key, columns.as_deref())?;
    progress.finish("Comparison complete");

    match format {
        OutputFormat::Pretty => PrettyPrinter::print_report(
            &report,
            comparison.as_ref(),
            config.export.max_detail_values,
        ),
        OutputFormat::Json => {
            println!("{}", JsonFormatter::format_report(&report, comparison.as_ref())?)
        }
    }

    if let Some(path) = &args.html {
        HtmlExporter::new(config.export.clone()).export(
            &report,
            comparison.as_ref(),
            path,
            args.overwrite,
        )?;
    }

    if let Some(path) = &args.snapshot {
        ReportSnapshot::save(&report, path, args.overwrite)?;
    }

    Ok(())
}

/// Print a saved snapshot
fn show_command(config_path: Option<&Path>, snapshot: &Path, format: &str) -> Result<()> {
    let format = OutputFormat::parse(format).map_err(DataDeltaError::invalid_input)?;
    let config = load_config(config_path, None)?;

    let metadata = ReportSnapshot::load_metadata(snapshot)?;
    let report = ReportSnapshot::load(snapshot)?;

    match format {
        OutputFormat::Pretty => {
            println!("📸 Snapshot: {}", snapshot.display());
            println!("├─ Created: {}", metadata.created.to_rfc3339());
            println!("└─ Format version: {}", metadata.format_version);
            println!();
            PrettyPrinter::print_report(&report, None, config.export.max_detail_values);
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "metadata": metadata,
                "report": report,
            });
            println!("{}", JsonFormatter::format(&json)?);
        }
    }

    Ok(())
}
