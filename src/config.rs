//! Runtime configuration loaded from an optional JSON file

use crate::error::{DataDeltaError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration; every field falls back to its default when absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataDeltaConfig {
    pub loader: LoaderConfig,
    pub export: ExportConfig,
}

/// Settings for the DuckDB-backed input loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// DuckDB `memory_limit` setting, e.g. `"4GB"`
    pub memory_limit: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            memory_limit: "4GB".to_string(),
        }
    }
}

/// Settings for the HTML report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Identifiers shown per value category
    pub max_detail_values: usize,
    /// Rows shown from the per-column value change table
    pub max_value_change_rows: usize,
    /// Rows shown from the side-by-side comparison table
    pub max_comparison_rows: usize,
    /// Overrides the report's own title when set
    pub title: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            max_detail_values: 20,
            max_value_change_rows: 25,
            max_comparison_rows: 50,
            title: None,
        }
    }
}

impl DataDeltaConfig {
    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            DataDeltaError::config(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| {
            DataDeltaError::config(format!("Invalid config file {}: {}", path.display(), e))
        })?;
        config.validate()?;

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from `path` when given, otherwise use the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.loader.memory_limit.trim().is_empty() {
            return Err(DataDeltaError::config("loader.memory_limit must not be empty"));
        }
        if self.loader.memory_limit.contains('\'') {
            return Err(DataDeltaError::config(
                "loader.memory_limit must not contain quotes",
            ));
        }

        let limits = [
            ("export.max_detail_values", self.export.max_detail_values),
            ("export.max_value_change_rows", self.export.max_value_change_rows),
            ("export.max_comparison_rows", self.export.max_comparison_rows),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(DataDeltaError::config(format!("{} must be positive", name)));
            }
        }
        Ok(())
    }
}
