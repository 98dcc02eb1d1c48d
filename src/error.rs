//! Error types for datadelta operations

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataDeltaError>;

#[derive(Error, Debug)]
pub enum DataDeltaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("Dataframe is empty: {rows} record(s) and {columns} column(s)")]
    EmptyTable { rows: usize, columns: usize },

    #[error("Primary key '{primary_key}' is not a column of the table")]
    MissingPrimaryKey { primary_key: String },

    #[error("{columns:?} columns are not contained in both tables")]
    MissingColumns { columns: Vec<String> },

    #[error("Invalid table: {message}")]
    InvalidTable { message: String },

    #[error("Invalid snapshot: {path}: {message}")]
    InvalidSnapshot { path: PathBuf, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Data processing error: {message}")]
    DataProcessing { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("String conversion error: {0}")]
    StringConversion(#[from] std::string::FromUtf8Error),

    #[error("{0:#}")]
    Generic(#[from] anyhow::Error),
}

impl DataDeltaError {
    pub fn empty_table(rows: usize, columns: usize) -> Self {
        Self::EmptyTable { rows, columns }
    }

    pub fn missing_primary_key(primary_key: impl Into<String>) -> Self {
        Self::MissingPrimaryKey {
            primary_key: primary_key.into(),
        }
    }

    pub fn invalid_table(msg: impl Into<String>) -> Self {
        Self::InvalidTable {
            message: msg.into(),
        }
    }

    pub fn invalid_snapshot(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn data_processing(msg: impl Into<String>) -> Self {
        Self::DataProcessing {
            message: msg.into(),
        }
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: msg.into(),
        }
    }

    /// True for errors caused by the caller's inputs rather than I/O or internal faults
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::EmptyTable { .. }
                | Self::MissingPrimaryKey { .. }
                | Self::MissingColumns { .. }
                | Self::InvalidTable { .. }
                | Self::InvalidInput { .. }
        )
    }
}
