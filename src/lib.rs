//! # datadelta
//!
//! Compares two tabular datasets that share a primary key and reports column,
//! record count, datatype and per-record value changes, with HTML export and
//! binary report snapshots for regression testing.

pub mod change_detection;
pub mod cli;
pub mod commands;
pub mod comparison;
pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod progress;
pub mod report;
pub mod shared;
pub mod snapshot;
pub mod summary;
pub mod table;

pub use change_detection::ChangeDetector;
pub use comparison::ReportAssembler;
pub use config::DataDeltaConfig;
pub use error::{DataDeltaError, Result};
pub use report::{ConsolidatedReport, ReportSection};
pub use table::{Table, Value};

/// Current format version for snapshot files
pub const FORMAT_VERSION: &str = "1.0.0";

