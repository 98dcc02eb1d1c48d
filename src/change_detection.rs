//! Diff checks between an old and a new table

use crate::error::{DataDeltaError, Result};
use crate::report::{
    format_count, format_percent, ColumnChangeDetails, ColumnChangeRate, ColumnChangeReport,
    DatatypeChange, DatatypeDetails, DatatypeReport, RecordCountDetails, RecordCountReport,
    ValueChangeDetails, ValueChangeReport,
};
use crate::shared::SharedRecords;
use crate::table::{Table, Value};
use std::collections::{HashMap, HashSet};

/// Change detector for the column, record, datatype and value checks
pub struct ChangeDetector;

impl ChangeDetector {
    /// Compare the sets of column names.
    ///
    /// When both tables have columns the other lacks, only the old table's
    /// unique columns are reported.
    pub fn check_column_names(old: &Table, new: &Table) -> ColumnChangeReport {
        let old_columns: HashSet<&str> = old.column_names().into_iter().collect();
        let new_columns: HashSet<&str> = new.column_names().into_iter().collect();

        if old_columns == new_columns {
            log::debug!("Column names are equal");
            return ColumnChangeReport::equal();
        }

        let only_in_old = sorted_difference(&old_columns, &new_columns);
        let only_in_new = sorted_difference(&new_columns, &old_columns);

        let details = if !only_in_old.is_empty() {
            ColumnChangeDetails {
                summary: vec![format!(
                    "{} Unique column(s) in the old table",
                    only_in_old.len()
                )],
                removed_columns: Some(only_in_old),
                added_columns: None,
            }
        } else {
            ColumnChangeDetails {
                summary: vec![format!(
                    "{} Unique column(s) in the new table",
                    only_in_new.len()
                )],
                removed_columns: None,
                added_columns: Some(only_in_new),
            }
        };

        log::debug!("Column names differ: {:?}", details.summary);
        ColumnChangeReport::changed(details)
    }

    /// Compare the sets of primary key values
    pub fn check_record_count(
        old: &Table,
        new: &Table,
        primary_key: &str,
    ) -> Result<RecordCountReport> {
        let old_keys = key_set(old, primary_key)?;
        let new_keys = key_set(new, primary_key)?;

        let mut removed = keys_missing_from(&old_keys, &new_keys);
        let mut added = keys_missing_from(&new_keys, &old_keys);

        if removed.is_empty() && added.is_empty() {
            log::debug!("Primary key sets are equal");
            return Ok(RecordCountReport::equal());
        }

        removed.sort();
        added.sort();

        let old_record_count = old.row_count();
        let new_record_count = new.row_count();
        let net_change = new_record_count as i64 - old_record_count as i64;

        let mut summary = vec![
            format!("The old table has {} records", format_count(old_record_count as i64)),
            format!("The new table has {} records", format_count(new_record_count as i64)),
            format!(
                "Change in the total number of records: {}",
                format_count(net_change)
            ),
        ];

        let removed_records = if removed.is_empty() {
            None
        } else {
            summary.push(format!(
                "{} record(s) removed",
                format_count(removed.len() as i64)
            ));
            Some(removed)
        };

        let added_records = if added.is_empty() {
            None
        } else {
            summary.push(format!("{} record(s) added", format_count(added.len() as i64)));
            Some(added)
        };

        log::debug!("Record sets differ: {:?}", summary);

        Ok(RecordCountReport::changed(RecordCountDetails {
            summary,
            old_record_count,
            new_record_count,
            net_change,
            removed_records,
            added_records,
        }))
    }

    /// Compare the declared types of columns present in both tables.
    ///
    /// The percentage is taken over every shared column, even when a subset
    /// narrows which columns may be reported.
    pub fn check_datatypes(
        old: &Table,
        new: &Table,
        primary_key: &str,
        column_subset: Option<&[String]>,
    ) -> DatatypeReport {
        let shared: Vec<(&str, &str, &str)> = old
            .columns()
            .filter_map(|(name, column)| {
                new.data_type(name)
                    .map(|new_type| (name, column.data_type.as_str(), new_type))
            })
            .collect();

        let in_scope = |name: &str| match column_subset {
            Some(subset) => name == primary_key || subset.iter().any(|c| c == name),
            None => true,
        };

        let summary_table: Vec<DatatypeChange> = shared
            .iter()
            .filter(|(name, old_type, new_type)| old_type != new_type && in_scope(*name))
            .map(|(name, old_type, new_type)| DatatypeChange {
                column_name: name.to_string(),
                old_df_dtype: old_type.to_string(),
                new_df_dtype: new_type.to_string(),
            })
            .collect();

        if summary_table.is_empty() {
            log::debug!("Declared datatypes are equal");
            return DatatypeReport::equal();
        }

        let summary = vec![format!(
            "{} column(s) have different types ({} of shared columns)",
            format_count(summary_table.len() as i64),
            format_percent(summary_table.len() as f64 / shared.len() as f64)
        )];
        let changed_columns = summary_table.iter().map(|c| c.column_name.clone()).collect();

        log::debug!("Datatypes differ: {:?}", summary);

        DatatypeReport::changed(DatatypeDetails {
            summary,
            summary_table,
            changed_columns,
        })
    }

    /// Find shared records whose values differ in at least one shared column
    pub fn check_value_changes(
        old: &Table,
        new: &Table,
        primary_key: &str,
        column_subset: Option<&[String]>,
    ) -> Result<ValueChangeReport> {
        let shared = SharedRecords::extract(old, new, primary_key, column_subset)?;
        let row_counts = row_change_counts(&shared);

        let key_column = shared
            .new
            .column(primary_key)
            .ok_or_else(|| DataDeltaError::missing_primary_key(primary_key))?;

        let changed_records: Vec<Value> = row_counts
            .iter()
            .zip(&key_column.values)
            .filter(|(count, _)| **count > 0)
            .map(|(_, key)| key.clone())
            .collect();

        if changed_records.is_empty() {
            log::debug!("No value changes across {} shared records", shared.len());
            return Ok(ValueChangeReport::equal());
        }

        let shared_count = shared.len() as f64;
        let mut summary_table: Vec<ColumnChangeRate> = column_change_counts(&shared)
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(column_name, count)| ColumnChangeRate {
                column_name,
                changed_records_pct: count as f64 / shared_count * 100.0,
            })
            .collect();

        summary_table.sort_by(|a, b| {
            b.changed_records_pct
                .total_cmp(&a.changed_records_pct)
                .then_with(|| a.column_name.cmp(&b.column_name))
        });

        let summary = vec![format!(
            "{} records have changed ({} of shared records)",
            format_count(changed_records.len() as i64),
            format_percent(changed_records.len() as f64 / shared_count)
        )];
        let changed_columns = summary_table.iter().map(|c| c.column_name.clone()).collect();

        log::debug!("Value changes: {:?}", summary);

        Ok(ValueChangeReport::changed(ValueChangeDetails {
            summary,
            summary_table,
            changed_records,
            changed_columns,
        }))
    }
}

/// Number of differing columns for each aligned row of the shared views
pub fn row_change_counts(shared: &SharedRecords) -> Vec<usize> {
    let mut counts = vec![0; shared.len()];
    for (name, old_column) in shared.old.columns() {
        if let Some(new_column) = shared.new.column(name) {
            for (count, (a, b)) in counts
                .iter_mut()
                .zip(old_column.values.iter().zip(&new_column.values))
            {
                if !a.matches(b) {
                    *count += 1;
                }
            }
        }
    }
    counts
}

/// Number of differing rows for each column of the shared views
fn column_change_counts(shared: &SharedRecords) -> Vec<(String, usize)> {
    shared
        .old
        .columns()
        .filter_map(|(name, old_column)| {
            shared.new.column(name).map(|new_column| {
                let count = old_column
                    .values
                    .iter()
                    .zip(&new_column.values)
                    .filter(|(a, b)| !a.matches(b))
                    .count();
                (name.to_string(), count)
            })
        })
        .collect()
}

/// Normalized key of every record mapped to the value as it appears in the table
fn key_set<'a>(table: &'a Table, primary_key: &str) -> Result<HashMap<Value, &'a Value>> {
    let column = table
        .column(primary_key)
        .ok_or_else(|| DataDeltaError::missing_primary_key(primary_key))?;

    let mut keys = HashMap::with_capacity(column.values.len());
    for value in &column.values {
        keys.entry(value.key()).or_insert(value);
    }
    Ok(keys)
}

fn keys_missing_from(keys: &HashMap<Value, &Value>, other: &HashMap<Value, &Value>) -> Vec<Value> {
    keys.iter()
        .filter(|(key, _)| !other.contains_key(*key))
        .map(|(_, value)| (*value).clone())
        .collect()
}

fn sorted_difference(a: &HashSet<&str>, b: &HashSet<&str>) -> Vec<String> {
    let mut diff: Vec<String> = a.difference(b).map(|s| s.to_string()).collect();
    diff.sort();
    diff
}
