//! Input loading using DuckDB

use crate::config::LoaderConfig;
use crate::error::{DataDeltaError, Result};
use crate::table::{Table, Value};
use duckdb::types::ValueRef;
use duckdb::Connection;
use std::path::Path;

/// File extensions the loader understands
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "tsv", "parquet", "json", "jsonl", "ndjson"];

/// Column types read as-is; anything else is cast on the way out
const NATIVE_TYPES: &[&str] = &[
    "BOOLEAN", "TINYINT", "SMALLINT", "INTEGER", "BIGINT", "HUGEINT", "UTINYINT", "USMALLINT",
    "UINTEGER", "UBIGINT", "FLOAT", "DOUBLE", "VARCHAR",
];

/// A column as reported by `DESCRIBE`
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
}

/// Loads tabular files into [`Table`]s through an in-memory DuckDB connection
pub struct DataLoader {
    connection: Connection,
}

impl DataLoader {
    /// Create a loader with default settings
    pub fn new() -> Result<Self> {
        Self::new_with_config(&LoaderConfig::default())
    }

    pub fn new_with_config(config: &LoaderConfig) -> Result<Self> {
        let connection = Connection::open_in_memory()?;

        connection.execute(&format!("SET memory_limit='{}'", config.memory_limit), [])?;
        connection.execute("SET enable_progress_bar=false", [])?;
        // Row order must survive the load; whole-table equality depends on it
        connection.execute("SET preserve_insertion_order=true", [])?;

        Ok(Self { connection })
    }

    /// True when the file extension is one the loader can read
    pub fn is_supported_format(path: &Path) -> bool {
        extension(path)
            .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    /// Read a file into a table, keeping its row order and declared column types
    pub fn load_table(&self, path: &Path) -> Result<Table> {
        if !path.exists() {
            return Err(DataDeltaError::invalid_input(format!(
                "File not found: {}",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(DataDeltaError::invalid_input(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let reader = reader_expression(path)?;
        self.connection
            .execute(
                &format!("CREATE OR REPLACE VIEW data_view AS SELECT * FROM {}", reader),
                [],
            )
            .map_err(|e| convert_duckdb_error(e, path))?;

        let columns = self.column_info()?;
        let mut values: Vec<Vec<Value>> = vec![Vec::new(); columns.len()];

        if !columns.is_empty() {
            let select = columns
                .iter()
                .map(select_expression)
                .collect::<Vec<_>>()
                .join(", ");
            let mut stmt = self
                .connection
                .prepare(&format!("SELECT {} FROM data_view", select))
                .map_err(|e| convert_duckdb_error(e, path))?;

            let column_count = columns.len();
            let rows = stmt
                .query_map([], |row| {
                    let mut cells = Vec::with_capacity(column_count);
                    for i in 0..column_count {
                        cells.push(to_value(row.get_ref(i)?));
                    }
                    Ok(cells)
                })
                .map_err(|e| convert_duckdb_error(e, path))?;

            for row in rows {
                let cells = row.map_err(|e| convert_duckdb_error(e, path))?;
                for (column, cell) in values.iter_mut().zip(cells) {
                    column.push(cell);
                }
            }
        }

        let mut table = Table::new();
        for (info, column_values) in columns.into_iter().zip(values) {
            table.push_column(info.name, info.data_type, column_values)?;
        }

        log::debug!(
            "Loaded {}: {} rows, {} columns",
            path.display(),
            table.row_count(),
            table.column_count()
        );

        Ok(table)
    }

    fn column_info(&self) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self.connection.prepare("DESCRIBE data_view").map_err(|e| {
            DataDeltaError::data_processing(format!("Failed to prepare describe query: {}", e))
        })?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get::<_, String>(0)?,
                    data_type: row.get::<_, String>(1)?,
                })
            })
            .map_err(|e| {
                DataDeltaError::data_processing(format!("Failed to query column info: {}", e))
            })?;

        let mut columns = Vec::new();
        for row in rows {
            columns.push(row.map_err(|e| {
                DataDeltaError::data_processing(format!(
                    "Failed to process column info row: {}",
                    e
                ))
            })?);
        }
        Ok(columns)
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// DuckDB table function reading `path`
fn reader_expression(path: &Path) -> Result<String> {
    let quoted = path.to_string_lossy().replace('\'', "''");
    match extension(path).as_deref() {
        Some("csv") => Ok(format!("read_csv('{}', header=true, auto_detect=true)", quoted)),
        Some("tsv") => Ok(format!(
            "read_csv('{}', header=true, auto_detect=true, delim='\\t')",
            quoted
        )),
        Some("parquet") => Ok(format!("read_parquet('{}')", quoted)),
        Some("json") | Some("jsonl") | Some("ndjson") => Ok(format!("read_json_auto('{}')", quoted)),
        _ => Err(DataDeltaError::invalid_input(format!(
            "Unsupported file format: {} (expected one of: {})",
            path.display(),
            SUPPORTED_EXTENSIONS.join(", ")
        ))),
    }
}

fn select_expression(column: &ColumnInfo) -> String {
    let quoted = format!("\"{}\"", column.name.replace('"', "\"\""));
    if NATIVE_TYPES.contains(&column.data_type.as_str()) {
        quoted
    } else if column.data_type.starts_with("DECIMAL") {
        format!("CAST({} AS DOUBLE)", quoted)
    } else {
        format!("CAST({} AS VARCHAR)", quoted)
    }
}

fn to_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(i) => Value::Int(i.into()),
        ValueRef::SmallInt(i) => Value::Int(i.into()),
        ValueRef::Int(i) => Value::Int(i.into()),
        ValueRef::BigInt(i) => Value::Int(i),
        ValueRef::HugeInt(i) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        ValueRef::UTinyInt(i) => Value::Int(i.into()),
        ValueRef::USmallInt(i) => Value::Int(i.into()),
        ValueRef::UInt(i) => Value::Int(i.into()),
        ValueRef::UBigInt(i) => i64::try_from(i)
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Text(i.to_string())),
        ValueRef::Float(f) => Value::Float(f.into()),
        ValueRef::Double(f) => Value::Float(f),
        ValueRef::Text(s) => Value::Text(String::from_utf8_lossy(s).into_owned()),
        _ => Value::Text("<unknown>".to_string()),
    }
}

/// Map DuckDB failures on a user file to input errors where the cause is recognisable
pub fn convert_duckdb_error(error: duckdb::Error, file_path: &Path) -> DataDeltaError {
    let error_msg = error.to_string();

    if error_msg.contains("CSV Error")
        || error_msg.contains("Could not convert")
        || error_msg.contains("Invalid CSV")
        || error_msg.contains("Unterminated quoted field")
    {
        DataDeltaError::invalid_input(format!(
            "Malformed CSV file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("JSON") {
        DataDeltaError::invalid_input(format!(
            "Malformed JSON file '{}': {}",
            file_path.display(),
            error_msg
        ))
    } else if error_msg.contains("No files found") || error_msg.contains("does not exist") {
        DataDeltaError::invalid_input(format!("File not found: {}", file_path.display()))
    } else if error_msg.contains("Permission denied") {
        DataDeltaError::invalid_input(format!(
            "Permission denied accessing file: {}",
            file_path.display()
        ))
    } else {
        DataDeltaError::DuckDb(error)
    }
}
