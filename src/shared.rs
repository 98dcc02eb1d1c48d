//! Row- and column-aligned views of the records two tables have in common

use crate::error::{DataDeltaError, Result};
use crate::table::{Table, Value};
use std::collections::{HashMap, HashSet};

/// Old and new views restricted to shared primary keys and shared columns.
///
/// Both views have the same columns in the same order and one row per shared
/// key, sorted by primary key ascending, so row `i` of `old` and row `i` of
/// `new` describe the same record.
#[derive(Debug, Clone)]
pub struct SharedRecords {
    pub primary_key: String,
    pub old: Table,
    pub new: Table,
}

impl SharedRecords {
    /// Extract the shared records of `old` and `new`.
    ///
    /// When `column_subset` is given every listed column must exist in both
    /// tables; the primary key is added to it when absent. A primary key that
    /// repeats within a table contributes only its first row.
    pub fn extract(
        old: &Table,
        new: &Table,
        primary_key: &str,
        column_subset: Option<&[String]>,
    ) -> Result<Self> {
        let old_keys = old
            .column(primary_key)
            .ok_or_else(|| DataDeltaError::missing_primary_key(primary_key))?;
        let new_keys = new
            .column(primary_key)
            .ok_or_else(|| DataDeltaError::missing_primary_key(primary_key))?;

        let shared_columns: Vec<&str> = old
            .column_names()
            .into_iter()
            .filter(|name| new.has_column(name))
            .collect();

        let columns = effective_columns(&shared_columns, primary_key, column_subset)?;

        let old_index = first_occurrences(&old_keys.values, "old");
        let new_index = first_occurrences(&new_keys.values, "new");

        let mut shared_keys: Vec<&Value> = old_index
            .keys()
            .filter(|key| new_index.contains_key(*key))
            .collect();
        shared_keys.sort();

        let old_rows: Vec<usize> = shared_keys.iter().map(|key| old_index[*key]).collect();
        let new_rows: Vec<usize> = shared_keys.iter().map(|key| new_index[*key]).collect();

        let old_view = old.select_columns(&columns)?.take_rows(&old_rows)?;
        let new_view = new.select_columns(&columns)?.take_rows(&new_rows)?;

        log::debug!(
            "Extracted {} shared records across {} shared columns",
            shared_keys.len(),
            columns.len()
        );

        Ok(Self {
            primary_key: primary_key.to_string(),
            old: old_view,
            new: new_view,
        })
    }

    /// Number of shared records
    pub fn len(&self) -> usize {
        self.old.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.old.column_names()
    }
}

fn effective_columns(
    shared_columns: &[&str],
    primary_key: &str,
    column_subset: Option<&[String]>,
) -> Result<Vec<String>> {
    let subset = match column_subset {
        None => return Ok(shared_columns.iter().map(|c| c.to_string()).collect()),
        Some(subset) => subset,
    };

    let missing: Vec<String> = subset
        .iter()
        .filter(|c| !shared_columns.contains(&c.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(DataDeltaError::MissingColumns { columns: missing });
    }

    let mut seen = HashSet::new();
    let mut columns: Vec<String> = subset
        .iter()
        .filter(|c| seen.insert(c.as_str()))
        .cloned()
        .collect();
    if !columns.iter().any(|c| c == primary_key) {
        columns.push(primary_key.to_string());
    }
    Ok(columns)
}

/// Row index of the first occurrence of each normalized key
fn first_occurrences(keys: &[Value], side: &str) -> HashMap<Value, usize> {
    let mut index = HashMap::with_capacity(keys.len());
    let mut duplicates = 0usize;
    for (row, key) in keys.iter().enumerate() {
        let key = key.key();
        if index.contains_key(&key) {
            duplicates += 1;
        } else {
            index.insert(key, row);
        }
    }
    if duplicates > 0 {
        log::warn!(
            "{} duplicate primary key row(s) in the {} table; only the first occurrence of each key is compared",
            duplicates,
            side
        );
    }
    index
}
