//! Descriptive statistics for a single table

use crate::error::{DataDeltaError, Result};
use crate::report::{ColumnSummary, TableSummary};
use crate::table::{Table, Value};
use std::collections::HashMap;

/// Summarize a table: record and column counts, primary key uniqueness and
/// per-column null rates and declared types.
///
/// The summary table is ordered by non-null count descending, then column name,
/// restricted to the primary key plus `column_subset` when one is given, and
/// truncated to `max_rows` entries.
pub fn summarize_table(
    table: &Table,
    primary_key: &str,
    column_subset: Option<&[String]>,
    max_rows: usize,
) -> Result<TableSummary> {
    if table.is_empty() {
        return Err(DataDeltaError::empty_table(
            table.row_count(),
            table.column_count(),
        ));
    }

    let key_column = table
        .column(primary_key)
        .ok_or_else(|| DataDeltaError::missing_primary_key(primary_key))?;

    let number_of_records = table.row_count();
    let is_primary_key_unique = is_unique(&key_column.values);

    let mut summary_table: Vec<ColumnSummary> = table
        .columns()
        .map(|(name, column)| {
            let n_valid_records = column.non_null_count();
            ColumnSummary {
                column_name: name.to_string(),
                n_valid_records,
                prop_valid_records: round_one_decimal(
                    n_valid_records as f64 / number_of_records as f64 * 100.0,
                ),
                datatype: column.data_type.clone(),
            }
        })
        .collect();

    summary_table.sort_by(|a, b| {
        b.n_valid_records
            .cmp(&a.n_valid_records)
            .then_with(|| a.column_name.cmp(&b.column_name))
    });

    if let Some(subset) = column_subset {
        summary_table.retain(|row| {
            row.column_name == primary_key || subset.iter().any(|c| *c == row.column_name)
        });
    }

    summary_table.truncate(max_rows);

    log::debug!(
        "Summarized table: {} records, {} columns, primary key unique: {}",
        number_of_records,
        table.column_count(),
        is_primary_key_unique
    );

    Ok(TableSummary {
        number_of_records,
        number_of_columns: table.column_count(),
        primary_key: primary_key.to_string(),
        is_primary_key_unique,
        summary_table,
    })
}

/// True when no non-missing key repeats and at least one key is present
fn is_unique(keys: &[Value]) -> bool {
    let mut counts: HashMap<&Value, usize> = HashMap::new();
    for key in keys.iter().filter(|k| !k.is_missing()) {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts.values().max() == Some(&1)
}

/// Half-way cases go to the even digit
fn round_one_decimal(x: f64) -> f64 {
    (x * 10.0).round_ties_even() / 10.0
}
