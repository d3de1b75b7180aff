// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Minimal column-oriented data frame
//!
//! The action core only needs a narrow slice of dataframe functionality:
//! boolean-mask filtering, `between`/`isin` predicates on single columns,
//! unique values and min/max for selector bounds, and CSV/XLSX
//! serialization for the export action. This module provides exactly that
//! slice over typed columns rather than pulling in a full dataframe engine.
//!
//! # Example
//!
//! ```rust
//! use dashwire::dataframe::{DataFrame, Value};
//!
//! let frame = DataFrame::new()
//!     .with_column("species", vec!["setosa", "virginica"].into_iter().map(Value::from).collect())
//!     .unwrap()
//!     .with_column("petal_width", vec![0.2, 2.1].into_iter().map(Value::from).collect())
//!     .unwrap();
//!
//! let mask = frame.isin("species", &[Value::from("setosa")]).unwrap();
//! assert_eq!(frame.filter(&mask).unwrap().row_count(), 1);
//! ```

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::io::Write;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ============================================================================
// Scalar values
// ============================================================================

/// A scalar cell or control value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Floating-point number. Integers are stored as their exact float form.
    Number(f64),
    /// Text.
    Text(String),
    /// Calendar date (no time component).
    Date(NaiveDate),
}

impl Value {
    /// Total ordering across values of the same variant. Mismatched variants
    /// and NaN compare as unordered.
    #[must_use]
    pub fn partial_cmp_same_type(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// The column type this value belongs to, `None` for nulls.
    #[must_use]
    pub fn dtype(&self) -> Option<DType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DType::Bool),
            Value::Number(_) => Some(DType::Number),
            Value::Text(_) => Some(DType::Text),
            Value::Date(_) => Some(DType::Date),
        }
    }

    /// Render the value the way the CSV/XLSX writers do.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => {
                // Integral floats print without a trailing ".0" so exported
                // files match the usual tabular representation.
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::Text(s) => s.clone(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v as f64)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DType {
    /// Floating-point numbers.
    Number,
    /// Text.
    Text,
    /// Booleans.
    Bool,
    /// Calendar dates.
    Date,
}

// ============================================================================
// Columns
// ============================================================================

/// A named, typed column of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name, unique within its frame.
    pub name: String,
    /// Cell values, row-aligned with sibling columns.
    pub values: Vec<Value>,
}

impl Column {
    /// Create a column from a name and values.
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// The column's type, inferred from the first non-null value.
    #[must_use]
    pub fn dtype(&self) -> Option<DType> {
        self.values.iter().find_map(Value::dtype)
    }

    /// Distinct non-null values in ascending order.
    #[must_use]
    pub fn unique_sorted(&self) -> Vec<Value> {
        // BTreeSet over the rendered form keeps dedup simple across floats.
        let mut seen = BTreeSet::new();
        let mut out = Vec::new();
        for value in &self.values {
            if matches!(value, Value::Null) {
                continue;
            }
            if seen.insert(value.render()) {
                out.push(value.clone());
            }
        }
        out.sort_by(|a, b| a.partial_cmp_same_type(b).unwrap_or(Ordering::Equal));
        out
    }

    /// Smallest non-null value, if the column has one.
    #[must_use]
    pub fn min(&self) -> Option<Value> {
        self.values
            .iter()
            .filter(|v| !matches!(v, Value::Null))
            .cloned()
            .min_by(|a, b| a.partial_cmp_same_type(b).unwrap_or(Ordering::Equal))
    }

    /// Largest non-null value, if the column has one.
    #[must_use]
    pub fn max(&self) -> Option<Value> {
        self.values
            .iter()
            .filter(|v| !matches!(v, Value::Null))
            .cloned()
            .max_by(|a, b| a.partial_cmp_same_type(b).unwrap_or(Ordering::Equal))
    }
}

// ============================================================================
// DataFrame
// ============================================================================

/// A column-oriented table with row-aligned columns in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataFrame {
    columns: Vec<Column>,
}

impl DataFrame {
    /// Create an empty frame.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. Fails if the name is taken or the length disagrees
    /// with existing columns.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        if self.column(&name).is_some() {
            return Err(Error::Validation(format!(
                "Column '{name}' already exists in the data frame."
            )));
        }
        if let Some(first) = self.columns.first() {
            if first.values.len() != values.len() {
                return Err(Error::Validation(format!(
                    "Column '{name}' has {} rows but the frame has {}.",
                    values.len(),
                    first.values.len()
                )));
            }
        }
        self.columns.push(Column::new(name, values));
        Ok(self)
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Column names in declaration order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Look up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// True if the frame has a column with this name.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Keep only the rows where `mask` is true. The mask must be row-aligned.
    pub fn filter(&self, mask: &[bool]) -> Result<DataFrame> {
        if mask.len() != self.row_count() {
            return Err(Error::Validation(format!(
                "Filter mask has {} entries but the frame has {} rows.",
                mask.len(),
                self.row_count()
            )));
        }
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let values = c
                    .values
                    .iter()
                    .zip(mask)
                    .filter(|(_, keep)| **keep)
                    .map(|(v, _)| v.clone())
                    .collect();
                Column::new(c.name.clone(), values)
            })
            .collect();
        Ok(DataFrame { columns })
    }

    /// Row-aligned mask selecting rows whose `column` value lies in
    /// `[low, high]`, inclusive on both ends. Nulls never match.
    pub fn between(&self, column: &str, low: &Value, high: &Value) -> Result<Vec<bool>> {
        let col = self.require_column(column)?;
        Ok(col
            .values
            .iter()
            .map(|v| {
                matches!(v.partial_cmp_same_type(low), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(v.partial_cmp_same_type(high), Some(Ordering::Less | Ordering::Equal))
            })
            .collect())
    }

    /// Row-aligned mask selecting rows whose `column` value equals any of
    /// `values`. Nulls never match.
    pub fn isin(&self, column: &str, values: &[Value]) -> Result<Vec<bool>> {
        let col = self.require_column(column)?;
        Ok(col
            .values
            .iter()
            .map(|v| values.iter().any(|candidate| candidate == v))
            .collect())
    }

    fn require_column(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| Error::ColumnNotFound {
            column: name.to_string(),
            target: "<data frame>".to_string(),
        })
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Write the frame as CSV: header row, one row per record, UTF-8, no
    /// index column.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer
            .write_record(self.column_names())
            .map_err(|e| Error::ExportSerialization(e.to_string()))?;
        for row in 0..self.row_count() {
            let record: Vec<String> = self.columns.iter().map(|c| c.values[row].render()).collect();
            csv_writer
                .write_record(&record)
                .map_err(|e| Error::ExportSerialization(e.to_string()))?;
        }
        csv_writer
            .flush()
            .map_err(|e| Error::ExportSerialization(e.to_string()))?;
        Ok(())
    }

    /// The frame as an in-memory CSV byte buffer.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }

    /// Parse a CSV byte buffer produced by [`DataFrame::write_csv`],
    /// sniffing numbers, dates and booleans back out of the text form.
    pub fn read_csv(bytes: &[u8]) -> Result<DataFrame> {
        let mut reader = csv::Reader::from_reader(bytes);
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| Error::ExportSerialization(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        let mut columns: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];
        for record in reader.records() {
            let record = record.map_err(|e| Error::ExportSerialization(e.to_string()))?;
            for (idx, field) in record.iter().enumerate() {
                columns[idx].push(sniff_value(field));
            }
        }
        let mut frame = DataFrame::new();
        for (name, values) in headers.into_iter().zip(columns) {
            frame = frame.with_column(name, values)?;
        }
        Ok(frame)
    }

    /// Write the frame as a single-sheet XLSX workbook: header row followed
    /// by one row per record.
    #[cfg(feature = "xlsx")]
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        use rust_xlsxwriter::Workbook;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        for (col_idx, name) in self.column_names().iter().enumerate() {
            worksheet
                .write_string(0, col_idx as u16, *name)
                .map_err(|e| Error::ExportSerialization(e.to_string()))?;
        }
        for row in 0..self.row_count() {
            for (col_idx, column) in self.columns.iter().enumerate() {
                let cell = (row + 1) as u32;
                let col = col_idx as u16;
                match &column.values[row] {
                    Value::Number(n) => worksheet.write_number(cell, col, *n),
                    Value::Bool(b) => worksheet.write_boolean(cell, col, *b),
                    Value::Null => worksheet.write_string(cell, col, ""),
                    other => worksheet.write_string(cell, col, other.render()),
                }
                .map_err(|e| Error::ExportSerialization(e.to_string()))?;
            }
        }
        workbook
            .save_to_buffer()
            .map_err(|e| Error::ExportSerialization(e.to_string()))
    }
}

/// Best-effort reconstruction of a typed value from its rendered CSV form.
fn sniff_value(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if field == "true" {
        return Value::Bool(true);
    }
    if field == "false" {
        return Value::Bool(false);
    }
    if let Ok(date) = NaiveDate::parse_from_str(field, "%Y-%m-%d") {
        return Value::Date(date);
    }
    if let Ok(number) = field.parse::<f64>() {
        return Value::Number(number);
    }
    Value::Text(field.to_string())
}
