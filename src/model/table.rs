//! Result tables and native values

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

use super::schema::Column;

/// A value as the store returned it, before any display decision
#[derive(Debug, Clone)]
pub enum NativeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
}

impl PartialEq for NativeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (NativeValue::Null, NativeValue::Null) => true,
            (NativeValue::Bool(a), NativeValue::Bool(b)) => a == b,
            (NativeValue::Int(a), NativeValue::Int(b)) => a == b,
            (NativeValue::Float(a), NativeValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (NativeValue::String(a), NativeValue::String(b)) => a == b,
            (NativeValue::Bytes(a), NativeValue::Bytes(b)) => a == b,
            (NativeValue::Date(a), NativeValue::Date(b)) => a == b,
            (NativeValue::DateTime(a), NativeValue::DateTime(b)) => a == b,
            (NativeValue::Time(a), NativeValue::Time(b)) => a == b,
            _ => false,
        }
    }
}

/// A row whose width does not match the column set
#[derive(Debug, Error, PartialEq, Eq)]
#[error("table '{table}': row {row} has {actual} values, expected {expected}")]
pub struct TableError {
    pub table: String,
    pub row: usize,
    pub expected: usize,
    pub actual: usize,
}

/// An in-memory query result: named, ordered columns and row-major values
#[derive(Debug, Clone)]
pub struct ResultTable {
    /// Label used as the sheet title
    pub name: String,
    /// Column definitions
    pub columns: Vec<Column>,
    rows: Vec<Vec<NativeValue>>,
}

impl ResultTable {
    /// Create a new empty table with column definitions
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, rejecting one that is not aligned with the columns
    pub fn add_row(&mut self, values: Vec<NativeValue>) -> Result<(), TableError> {
        if values.len() != self.columns.len() {
            return Err(TableError {
                table: self.name.clone(),
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        self.rows.push(values);
        Ok(())
    }

    /// All rows in insertion order
    pub fn rows(&self) -> &[Vec<NativeValue>] {
        &self.rows
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
