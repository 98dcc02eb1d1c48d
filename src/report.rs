//! Typed change report sections and the consolidated report

use crate::table::Value;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named identifier lists carried by report sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueCategory {
    AddedColumns,
    RemovedColumns,
    ChangedColumns,
    AddedRecords,
    RemovedRecords,
    ChangedRecords,
}

impl ValueCategory {
    pub fn key(&self) -> &'static str {
        match self {
            ValueCategory::AddedColumns => "added_columns",
            ValueCategory::RemovedColumns => "removed_columns",
            ValueCategory::ChangedColumns => "changed_columns",
            ValueCategory::AddedRecords => "added_records",
            ValueCategory::RemovedRecords => "removed_records",
            ValueCategory::ChangedRecords => "changed_records",
        }
    }

    /// Heading used when a sample of the identifiers is displayed
    pub fn header(&self) -> &'static str {
        match self {
            ValueCategory::AddedColumns => "Sample Added Columns",
            ValueCategory::RemovedColumns => "Sample Removed Columns",
            ValueCategory::ChangedColumns => "Sample Changed Columns",
            ValueCategory::AddedRecords => "Sample Added Records",
            ValueCategory::RemovedRecords => "Sample Removed Records",
            ValueCategory::ChangedRecords => "Sample Changed Records",
        }
    }
}

/// A row of a section's summary table
pub trait SummaryRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

/// Uniform read-only view over the per-check report sections
pub trait ReportSection {
    fn title(&self) -> &'static str;
    /// Sentence shown when the section reports no change
    fn equal_message(&self) -> &'static str;
    fn is_equal(&self) -> bool;
    fn summary(&self) -> &[String];
    fn values(&self) -> Vec<(ValueCategory, Vec<String>)>;
}

/// Per-column statistics of one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub column_name: String,
    pub n_valid_records: usize,
    /// Percentage of non-null records, rounded to one decimal
    pub prop_valid_records: f64,
    pub datatype: String,
}

impl SummaryRow for ColumnSummary {
    fn headers() -> &'static [&'static str] {
        &["column_names", "n_valid_records", "prop_valid_records", "datatype"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.column_name.clone(),
            self.n_valid_records.to_string(),
            format!("{:.1}", self.prop_valid_records),
            self.datatype.clone(),
        ]
    }
}

/// Descriptive statistics for one table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSummary {
    pub number_of_records: usize,
    pub number_of_columns: usize,
    pub primary_key: String,
    pub is_primary_key_unique: bool,
    pub summary_table: Vec<ColumnSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChangeDetails {
    pub summary: Vec<String>,
    pub removed_columns: Option<Vec<String>>,
    pub added_columns: Option<Vec<String>>,
}

/// Changes to the set of column names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChangeReport {
    pub is_equal: bool,
    pub details: Option<ColumnChangeDetails>,
}

impl ColumnChangeReport {
    pub fn equal() -> Self {
        Self {
            is_equal: true,
            details: None,
        }
    }

    pub fn changed(details: ColumnChangeDetails) -> Self {
        Self {
            is_equal: false,
            details: Some(details),
        }
    }
}

impl ReportSection for ColumnChangeReport {
    fn title(&self) -> &'static str {
        "Column Changes"
    }

    fn equal_message(&self) -> &'static str {
        "The columns are equal"
    }

    fn is_equal(&self) -> bool {
        self.is_equal
    }

    fn summary(&self) -> &[String] {
        self.details.as_ref().map(|d| d.summary.as_slice()).unwrap_or(&[])
    }

    fn values(&self) -> Vec<(ValueCategory, Vec<String>)> {
        let mut values = Vec::new();
        if let Some(details) = &self.details {
            if let Some(removed) = &details.removed_columns {
                values.push((ValueCategory::RemovedColumns, removed.clone()));
            }
            if let Some(added) = &details.added_columns {
                values.push((ValueCategory::AddedColumns, added.clone()));
            }
        }
        values
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordCountDetails {
    pub summary: Vec<String>,
    pub old_record_count: usize,
    pub new_record_count: usize,
    pub net_change: i64,
    pub removed_records: Option<Vec<Value>>,
    pub added_records: Option<Vec<Value>>,
}

/// Changes to the set of primary-key values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordCountReport {
    pub is_equal: bool,
    pub details: Option<RecordCountDetails>,
}

impl RecordCountReport {
    pub fn equal() -> Self {
        Self {
            is_equal: true,
            details: None,
        }
    }

    pub fn changed(details: RecordCountDetails) -> Self {
        Self {
            is_equal: false,
            details: Some(details),
        }
    }
}

impl ReportSection for RecordCountReport {
    fn title(&self) -> &'static str {
        "Record Count Changes"
    }

    fn equal_message(&self) -> &'static str {
        "The number of records is equal"
    }

    fn is_equal(&self) -> bool {
        self.is_equal
    }

    fn summary(&self) -> &[String] {
        self.details.as_ref().map(|d| d.summary.as_slice()).unwrap_or(&[])
    }

    fn values(&self) -> Vec<(ValueCategory, Vec<String>)> {
        let mut values = Vec::new();
        if let Some(details) = &self.details {
            if let Some(removed) = &details.removed_records {
                values.push((ValueCategory::RemovedRecords, display_all(removed)));
            }
            if let Some(added) = &details.added_records {
                values.push((ValueCategory::AddedRecords, display_all(added)));
            }
        }
        values
    }
}

/// Declared types of a column whose type differs between the tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatatypeChange {
    pub column_name: String,
    pub old_df_dtype: String,
    pub new_df_dtype: String,
}

impl SummaryRow for DatatypeChange {
    fn headers() -> &'static [&'static str] {
        &["column_name", "old_df_dtype", "new_df_dtype"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.column_name.clone(),
            self.old_df_dtype.clone(),
            self.new_df_dtype.clone(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatatypeDetails {
    pub summary: Vec<String>,
    pub summary_table: Vec<DatatypeChange>,
    pub changed_columns: Vec<String>,
}

/// Changes to declared column types.
///
/// Only the declared type of each whole column is compared. A column holding
/// mixed element types under one declared type is not flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatatypeReport {
    pub is_equal: bool,
    pub details: Option<DatatypeDetails>,
}

impl DatatypeReport {
    pub fn equal() -> Self {
        Self {
            is_equal: true,
            details: None,
        }
    }

    pub fn changed(details: DatatypeDetails) -> Self {
        Self {
            is_equal: false,
            details: Some(details),
        }
    }
}

impl ReportSection for DatatypeReport {
    fn title(&self) -> &'static str {
        "Datatype Changes"
    }

    fn equal_message(&self) -> &'static str {
        "The datatypes are equal"
    }

    fn is_equal(&self) -> bool {
        self.is_equal
    }

    fn summary(&self) -> &[String] {
        self.details.as_ref().map(|d| d.summary.as_slice()).unwrap_or(&[])
    }

    fn values(&self) -> Vec<(ValueCategory, Vec<String>)> {
        self.details
            .iter()
            .map(|d| (ValueCategory::ChangedColumns, d.changed_columns.clone()))
            .collect()
    }
}

/// Share of shared records whose value changed in one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnChangeRate {
    pub column_name: String,
    /// Percentage of shared records, 0-100
    pub changed_records_pct: f64,
}

impl SummaryRow for ColumnChangeRate {
    fn headers() -> &'static [&'static str] {
        &["column_names", "changed_records_%"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.column_name.clone(),
            format!("{:.1}", self.changed_records_pct),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChangeDetails {
    pub summary: Vec<String>,
    pub summary_table: Vec<ColumnChangeRate>,
    pub changed_records: Vec<Value>,
    pub changed_columns: Vec<String>,
}

/// Value changes within records present in both tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueChangeReport {
    pub is_equal: bool,
    pub details: Option<ValueChangeDetails>,
}

impl ValueChangeReport {
    pub fn equal() -> Self {
        Self {
            is_equal: true,
            details: None,
        }
    }

    pub fn changed(details: ValueChangeDetails) -> Self {
        Self {
            is_equal: false,
            details: Some(details),
        }
    }

    /// Primary keys of changed records, empty when nothing changed
    pub fn changed_records(&self) -> &[Value] {
        self.details
            .as_ref()
            .map(|d| d.changed_records.as_slice())
            .unwrap_or(&[])
    }
}

impl ReportSection for ValueChangeReport {
    fn title(&self) -> &'static str {
        "Record Value Changes"
    }

    fn equal_message(&self) -> &'static str {
        "There are no record changes"
    }

    fn is_equal(&self) -> bool {
        self.is_equal
    }

    fn summary(&self) -> &[String] {
        self.details.as_ref().map(|d| d.summary.as_slice()).unwrap_or(&[])
    }

    fn values(&self) -> Vec<(ValueCategory, Vec<String>)> {
        match &self.details {
            Some(details) => vec![
                (ValueCategory::ChangedRecords, display_all(&details.changed_records)),
                (ValueCategory::ChangedColumns, details.changed_columns.clone()),
            ],
            None => Vec::new(),
        }
    }
}

/// Report metadata stamped by the assembler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub title_text: String,
    pub report_date: String,
    pub generated_at: DateTime<Utc>,
    pub column_subset: Option<Vec<String>>,
    pub is_all_equal: bool,
}

/// Every section of a table comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    pub meta: ReportMeta,
    pub old_df_table_summary: TableSummary,
    pub new_df_table_summary: TableSummary,
    pub column_name_changes: ColumnChangeReport,
    pub record_count_changes: RecordCountReport,
    pub datatype_changes: DatatypeReport,
    pub record_value_changes: ValueChangeReport,
}

impl ConsolidatedReport {
    /// The diff sections in display order
    pub fn sections(&self) -> [&dyn ReportSection; 4] {
        [
            &self.column_name_changes,
            &self.record_count_changes,
            &self.datatype_changes,
            &self.record_value_changes,
        ]
    }

    /// True when every diff section reports no change
    pub fn all_sections_equal(&self) -> bool {
        self.sections().iter().all(|s| s.is_equal())
    }
}

fn display_all(values: &[Value]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Integer with thousands separators, e.g. `-1,234`
pub(crate) fn format_count(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if n < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Fraction rendered as a one-decimal percentage, e.g. `0.3333` -> `33.3%`
pub(crate) fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
