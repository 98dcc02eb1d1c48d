//! Assembly of the consolidated report and the side-by-side comparison table

use crate::change_detection::ChangeDetector;
use crate::error::{DataDeltaError, Result};
use crate::report::{ConsolidatedReport, ReportMeta};
use crate::summary::summarize_table;
use crate::table::{Table, Value};
use chrono::{Local, Utc};
use std::collections::{HashMap, HashSet};

pub const REPORT_TITLE: &str = "DataDelta: Dataset Comparison Report";

/// Suffix appended to old-table columns in the comparison table
pub const OLD_SUFFIX: &str = "_OLD";
/// Suffix appended to new-table columns in the comparison table
pub const NEW_SUFFIX: &str = "_NEW";

const REPORT_DATE_FORMAT: &str = "%d-%B-%Y (%I:%M %p)";

/// Runs every check and merges the results
pub struct ReportAssembler;

impl ReportAssembler {
    /// Compare `old` against `new`, returning the consolidated report and the
    /// comparison table of changed records, or `None` when no shared record changed.
    pub fn assemble(
        old: &Table,
        new: &Table,
        primary_key: &str,
        column_subset: Option<&[String]>,
    ) -> Result<(ConsolidatedReport, Option<Table>)> {
        log::debug!(
            "Assembling report: {} old records, {} new records, primary key '{}'",
            old.row_count(),
            new.row_count(),
            primary_key
        );

        let old_df_table_summary = summarize_table(old, primary_key, column_subset, usize::MAX)?;
        let new_df_table_summary = summarize_table(new, primary_key, column_subset, usize::MAX)?;

        let column_name_changes = ChangeDetector::check_column_names(old, new);
        let record_count_changes = ChangeDetector::check_record_count(old, new, primary_key)?;
        let datatype_changes = ChangeDetector::check_datatypes(old, new, primary_key, column_subset);
        let record_value_changes =
            ChangeDetector::check_value_changes(old, new, primary_key, column_subset)?;

        let comparison = if record_value_changes.is_equal {
            None
        } else {
            Some(build_comparison_table(
                old,
                new,
                primary_key,
                column_subset,
                record_value_changes.changed_records(),
            )?)
        };

        let meta = ReportMeta {
            title_text: REPORT_TITLE.to_string(),
            report_date: Local::now().format(REPORT_DATE_FORMAT).to_string(),
            generated_at: Utc::now(),
            column_subset: column_subset.map(|s| s.to_vec()),
            is_all_equal: old.equals(new),
        };

        let report = ConsolidatedReport {
            meta,
            old_df_table_summary,
            new_df_table_summary,
            column_name_changes,
            record_count_changes,
            datatype_changes,
            record_value_changes,
        };

        log::debug!(
            "Report assembled: all equal {}, all sections equal {}",
            report.meta.is_all_equal,
            report.all_sections_equal()
        );

        Ok((report, comparison))
    }

    /// Side-by-side old/new values of the records whose values changed
    pub fn comparison_table(
        old: &Table,
        new: &Table,
        primary_key: &str,
        column_subset: Option<&[String]>,
    ) -> Result<Option<Table>> {
        let changes = ChangeDetector::check_value_changes(old, new, primary_key, column_subset)?;
        if changes.is_equal {
            return Ok(None);
        }
        build_comparison_table(old, new, primary_key, column_subset, changes.changed_records())
            .map(Some)
    }
}

/// Join the changed records of both tables on the primary key.
///
/// Columns are the primary key followed by every suffixed old and new column
/// in name order. With a subset, only columns whose name starts with
/// `<subset column>_` are kept.
fn build_comparison_table(
    old: &Table,
    new: &Table,
    primary_key: &str,
    column_subset: Option<&[String]>,
    changed_records: &[Value],
) -> Result<Table> {
    let old_rows = rows_for_keys(old, primary_key, changed_records)?;
    let new_rows = rows_for_keys(new, primary_key, changed_records)?;

    // Inner join: keep keys found on both sides
    let (keys, (old_rows, new_rows)): (Vec<&Value>, (Vec<usize>, Vec<usize>)) = changed_records
        .iter()
        .filter_map(|key| {
            let normalized = key.key();
            match (old_rows.get(&normalized), new_rows.get(&normalized)) {
                (Some(o), Some(n)) => Some((key, (*o, *n))),
                _ => None,
            }
        })
        .unzip();

    let mut suffixed: Vec<(String, &str, Vec<Value>)> = Vec::new();
    for (table, rows, suffix) in [(old, &old_rows, OLD_SUFFIX), (new, &new_rows, NEW_SUFFIX)] {
        for (name, column) in table.columns() {
            if name == primary_key {
                continue;
            }
            let values = rows.iter().map(|&i| column.values[i].clone()).collect();
            suffixed.push((format!("{}{}", name, suffix), column.data_type.as_str(), values));
        }
    }
    suffixed.sort_by(|a, b| a.0.cmp(&b.0));

    if let Some(subset) = column_subset {
        let prefixes: Vec<String> = subset.iter().map(|c| format!("{}_", c)).collect();
        suffixed.retain(|(name, _, _)| prefixes.iter().any(|p| name.starts_with(p.as_str())));
    }

    // Changed-record keys come from the new table
    let key_type = new
        .data_type(primary_key)
        .or_else(|| old.data_type(primary_key))
        .unwrap_or("VARCHAR");
    let mut table = Table::new().with_column(
        primary_key,
        key_type,
        keys.into_iter().cloned().collect(),
    )?;
    for (name, data_type, values) in suffixed {
        table.push_column(name, data_type, values)?;
    }

    log::debug!(
        "Comparison table: {} records, {} columns",
        table.row_count(),
        table.column_count()
    );

    Ok(table)
}

/// First row index of each wanted key, keyed by normalized key
fn rows_for_keys(table: &Table, primary_key: &str, keys: &[Value]) -> Result<HashMap<Value, usize>> {
    let column = table
        .column(primary_key)
        .ok_or_else(|| DataDeltaError::missing_primary_key(primary_key))?;
    let wanted: HashSet<Value> = keys.iter().map(Value::key).collect();

    let mut rows = HashMap::with_capacity(wanted.len());
    for (row, value) in column.values.iter().enumerate() {
        let key = value.key();
        if wanted.contains(&key) {
            rows.entry(key).or_insert(row);
        }
    }
    Ok(rows)
}
