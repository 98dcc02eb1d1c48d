//! Unit tests for CLI argument parsing and validation

use clap::Parser;
use datadelta::cli::{Cli, Commands, OutputFormat};
use std::path::PathBuf;

#[test]
fn test_cli_compare_command() {
    let cli = Cli::try_parse_from(&["datadelta", "compare", "old.csv", "new.csv", "--primary-key", "id"])
        .unwrap();
    match cli.command {
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
        } => {
            assert_eq!(old, PathBuf::from("old.csv"));
            assert_eq!(new, PathBuf::from("new.csv"));
            assert_eq!(primary_key, "id");
            assert!(columns.is_none());
            assert!(html.is_none());
            assert!(snapshot.is_none());
            assert!(!overwrite);
            assert_eq!(format, "pretty");
            assert!(max_detail_values.is_none());
        }
        _ => panic!("Expected Compare command"),
    }
}

#[test]
fn test_cli_compare_command_with_options() {
    let cli = Cli::try_parse_from(&[
        "datadelta", "compare", "old.csv", "new.csv",
        "-k", "id",
        "--columns", "name,price",
        "--html", "report",
        "--snapshot", "golden.ddsnap",
        "--overwrite",
        "--format", "json",
        "--max-detail-values", "5",
    ])
    .unwrap();

    match cli.command {
        Commands::Compare {
            columns,
            html,
            snapshot,
            overwrite,
            format,
            max_detail_values,
            ..
        } => {
            assert_eq!(columns, Some(vec!["name".to_string(), "price".to_string()]));
            assert_eq!(html, Some(PathBuf::from("report")));
            assert_eq!(snapshot, Some(PathBuf::from("golden.ddsnap")));
            assert!(overwrite);
            assert_eq!(format, "json");
            assert_eq!(max_detail_values, Some(5));
        }
        _ => panic!("Expected Compare command"),
    }
}

#[test]
fn test_cli_compare_requires_primary_key() {
    assert!(Cli::try_parse_from(&["datadelta", "compare", "old.csv", "new.csv"]).is_err());
}

#[test]
fn test_cli_rejects_zero_detail_values() {
    let result = Cli::try_parse_from(&[
        "datadelta", "compare", "old.csv", "new.csv", "-k", "id", "--max-detail-values", "0",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_cli_show_command() {
    let cli = Cli::try_parse_from(&["datadelta", "show", "golden.ddsnap", "--format", "json"]).unwrap();
    match cli.command {
        Commands::Show { snapshot, format } => {
            assert_eq!(snapshot, PathBuf::from("golden.ddsnap"));
            assert_eq!(format, "json");
        }
        _ => panic!("Expected Show command"),
    }
}

#[test]
fn test_cli_global_flags() {
    let cli = Cli::try_parse_from(&[
        "datadelta", "show", "golden.ddsnap", "--verbose", "--config", "datadelta.json",
    ])
    .unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config, Some(PathBuf::from("datadelta.json")));
}

#[test]
fn test_output_format_parse() {
    assert!(matches!(OutputFormat::parse("pretty"), Ok(OutputFormat::Pretty)));
    assert!(matches!(OutputFormat::parse("Json"), Ok(OutputFormat::Json)));
    assert!(OutputFormat::parse("table").is_err());
}

#[test]
fn test_cli_unknown_command() {
    assert!(Cli::try_parse_from(&["datadelta", "merge"]).is_err());
}
