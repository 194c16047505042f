//! FILENAME: relation/src/table.rs
//! PURPOSE: In-memory tabular data model with named, typed columns.
//! CONTEXT: Both pivot inputs and pivot outputs are Tables. Rows are plain
//! Vec<Value> and the column metadata lives alongside them.

use crate::value::{Value, ValueType};
use serde::{Deserialize, Serialize};

/// Metadata for one table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Free-text description, shown by UIs. Pivot result columns carry the
    /// originating field label here.
    pub description: String,
    pub value_type: ValueType,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        let name = name.into();
        ColumnInfo {
            description: name.clone(),
            name,
            value_type,
        }
    }
}

/// A materialized table: column metadata plus row data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Appends a row. The row must match the column arity; this is
    /// asserted in debug builds, while release builds pad short rows with
    /// Null and truncate long ones.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        debug_assert_eq!(
            row.len(),
            self.columns.len(),
            "row arity does not match column count"
        );
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// Looks up a column by name. The match is case-insensitive; when
    /// several columns differ only by case the first declared one wins.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn describe_column(&self, index: usize) -> Option<&ColumnInfo> {
        self.columns.get(index)
    }

    pub fn value_at(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(|r| r.as_slice())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Value]> {
        self.rows.iter().map(|r| r.as_slice())
    }
}
