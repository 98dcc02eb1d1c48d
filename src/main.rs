//! Main entry point for the datadelta CLI

use clap::Parser;
use datadelta::cli::Cli;
use datadelta::commands::execute_command;

fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = execute_command(cli.command, cli.config.as_deref()) {
        if !e.is_precondition() {
            log::debug!("{:?}", e);
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
