//! In-memory tabular data model shared by every diff check

use crate::error::{DataDeltaError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single cell value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Null or a floating point NaN
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Value comparison used by change detection.
    ///
    /// Two missing values match, a missing value never matches a present one,
    /// and integers match floats holding the same number.
    pub fn matches(&self, other: &Value) -> bool {
        match (self.is_missing(), other.is_missing()) {
            (true, true) => return true,
            (true, false) | (false, true) => return false,
            (false, false) => {}
        }

        match (self, other) {
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => *a as f64 == *b,
            (Value::Float(a), Value::Float(b)) => a == b,
            _ => self == other,
        }
    }

    /// Primary key identity: an integral float names the same record as the
    /// integer it holds, so a key column read as DOUBLE still lines up with BIGINT.
    pub fn key(&self) -> Value {
        match self {
            Value::Float(f)
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
            {
                Value::Int(*f as i64)
            }
            other => other.clone(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) | Value::Float(_) => 2,
            Value::Text(_) => 3,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int(a), Value::Int(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            // Numeric order first; an Int sorts before an equal Float so Eq stays structural
            (Value::Int(a), Value::Float(b)) => (*a as f64).total_cmp(b).then(Ordering::Less),
            (Value::Float(a), Value::Int(b)) => a.total_cmp(&(*b as f64)).then(Ordering::Greater),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => {}
            Value::Bool(b) => b.hash(state),
            Value::Int(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Text(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

/// A named column's declared type and values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub data_type: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(data_type: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            data_type: data_type.into(),
            values,
        }
    }

    /// Number of values that are not missing
    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_missing()).count()
    }
}

/// Ordered collection of equal-length named columns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    columns: IndexMap<String, Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column append
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        data_type: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<Self> {
        self.push_column(name, data_type, values)?;
        Ok(self)
    }

    /// Append a column, validating its name and length against the table
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        data_type: impl Into<String>,
        values: Vec<Value>,
    ) -> Result<()> {
        let name = name.into();

        if self.columns.contains_key(&name) {
            return Err(DataDeltaError::invalid_table(format!(
                "Duplicate column name '{}'",
                name
            )));
        }

        if !self.columns.is_empty() && values.len() != self.row_count() {
            return Err(DataDeltaError::invalid_table(format!(
                "Column '{}' has {} values but the table has {} rows",
                name,
                values.len(),
                self.row_count()
            )));
        }

        self.columns.insert(name, Column::new(data_type, values));
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.columns
            .values()
            .next()
            .map(|c| c.values.len())
            .unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// True when the table has no rows or no columns
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0 || self.column_count() == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(|k| k.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, column)| (name.as_str(), column))
    }

    pub fn data_type(&self, name: &str) -> Option<&str> {
        self.columns.get(name).map(|c| c.data_type.as_str())
    }

    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        self.columns.get(column).and_then(|c| c.values.get(row))
    }

    /// Values of one row, in column order
    pub fn row(&self, index: usize) -> Option<Vec<&Value>> {
        if index >= self.row_count() {
            return None;
        }
        Some(self.columns.values().map(|c| &c.values[index]).collect())
    }

    /// New table holding the given rows, in the given order
    pub fn take_rows(&self, indices: &[usize]) -> Result<Table> {
        let row_count = self.row_count();
        if let Some(bad) = indices.iter().find(|&&i| i >= row_count) {
            return Err(DataDeltaError::invalid_table(format!(
                "Row index {} out of bounds for table with {} rows",
                bad, row_count
            )));
        }

        let columns = self
            .columns
            .iter()
            .map(|(name, column)| {
                let values = indices.iter().map(|&i| column.values[i].clone()).collect();
                (name.clone(), Column::new(column.data_type.clone(), values))
            })
            .collect();

        Ok(Table { columns })
    }

    /// New table holding the named columns, in the given order
    pub fn select_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let mut selected = Table::new();
        for name in names {
            let name = name.as_ref();
            let column = self.columns.get(name).ok_or_else(|| {
                DataDeltaError::invalid_table(format!("Column '{}' not found", name))
            })?;
            selected.push_column(name, column.data_type.clone(), column.values.clone())?;
        }
        Ok(selected)
    }

    /// Whole-table equality: same column names in the same order, same declared
    /// types and the same values, with missing values in the same place treated as equal
    pub fn equals(&self, other: &Table) -> bool {
        if self.row_count() != other.row_count() || self.column_count() != other.column_count() {
            return false;
        }

        self.columns
            .iter()
            .zip(other.columns.iter())
            .all(|((name_a, col_a), (name_b, col_b))| {
                name_a == name_b
                    && col_a.data_type == col_b.data_type
                    && col_a
                        .values
                        .iter()
                        .zip(col_b.values.iter())
                        .all(|(a, b)| a == b || (a.is_missing() && b.is_missing()))
            })
    }
}
