use serde::{Deserialize, Serialize};

use crate::data::{ColumnType, Value};

/// Management columns injected by normalization; always present afterwards.
pub const PRIORITY_COL: &str = "priority";
pub const FOLLOW_UP_DATE_COL: &str = "follow_up_date";
pub const LAST_CONTACT_COL: &str = "last_contact";
pub const FOLLOW_UP_COMPLETED_COL: &str = "follow_up_completed";

pub const DEFAULT_PRIORITY: &str = "Medium";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    pub data_type: ColumnType,
}

/// The normalized lead table: ordered columns plus rows of nullable cells.
/// Row position doubles as the stable lead id for the lifetime of a dataset;
/// rows are never removed, only replaced wholesale by a fresh import.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadTable {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Vec<Option<Value>>>,
}

impl LeadTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Reads one cell; `None` for a null cell, a missing column, or an
    /// out-of-range row. Reads over the normalized schema are total.
    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)?.as_ref()
    }

    pub fn set_cell(&mut self, row: usize, column: &str, value: Option<Value>) {
        let idx = self.ensure_column(column, ColumnType::String);
        if let Some(cells) = self.rows.get_mut(row) {
            cells[idx] = value;
        }
    }

    /// Returns the index of `name`, appending a new all-null column of the
    /// given type when it does not exist yet.
    pub fn ensure_column(&mut self, name: &str, data_type: ColumnType) -> usize {
        if let Some(idx) = self.column_index(name) {
            return idx;
        }
        self.columns.push(ColumnMeta {
            name: name.to_string(),
            data_type,
        });
        for cells in &mut self.rows {
            cells.push(None);
        }
        self.columns.len() - 1
    }

    /// Appends a column with pre-built cells; panics in debug builds when
    /// the cell count disagrees with the row count.
    pub fn push_column(&mut self, name: &str, data_type: ColumnType, cells: Vec<Option<Value>>) {
        debug_assert!(self.rows.is_empty() || cells.len() == self.rows.len());
        if self.rows.is_empty() {
            self.rows = cells.iter().map(|_| Vec::new()).collect();
        }
        self.columns.push(ColumnMeta {
            name: name.to_string(),
            data_type,
        });
        for (row, cell) in self.rows.iter_mut().zip(cells) {
            row.push(cell);
        }
    }

    pub fn has_row(&self, row: usize) -> bool {
        row < self.rows.len()
    }
}
