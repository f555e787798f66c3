//! Host table access
//!
//! Rows are addressed 1..=row_count() and cells by column header, the same
//! way a spreadsheet list object exposes its data body.

use crate::error::{Result, Rule1Error};
use crate::models::CellValue;

pub mod csv_table;
pub mod memory;

pub use csv_table::CsvTable;
pub use memory::MemoryTable;

/// Capabilities the reconciliation logic needs from a host table
pub trait HostTable {
    /// Column headers in table order
    fn columns(&self) -> &[String];

    fn row_count(&self) -> usize;

    fn get_cell(&self, column: &str, row: usize) -> Result<CellValue>;

    fn set_cell(&mut self, column: &str, row: usize, value: CellValue) -> Result<()>;

    /// Append an empty row and return its index
    fn append_row(&mut self) -> Result<usize>;

    fn delete_row(&mut self, row: usize) -> Result<()>;

    /// Drop any active row filter so every row is addressable
    fn reset_filter(&mut self) -> Result<()> {
        Ok(())
    }

    fn has_column(&self, column: &str) -> bool {
        self.columns().iter().any(|c| c == column)
    }
}

/// Shared grid storage for the table backends
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Grid {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Grid {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Rule1Error::UnknownColumn(column.to_string()))
    }

    pub fn row_index(&self, row: usize) -> Result<usize> {
        if row == 0 || row > self.rows.len() {
            return Err(Rule1Error::RowOutOfRange {
                row,
                count: self.rows.len(),
            });
        }
        Ok(row - 1)
    }

    pub fn get(&self, column: &str, row: usize) -> Result<CellValue> {
        let col = self.column_index(column)?;
        let row = self.row_index(row)?;
        Ok(self.rows[row].get(col).cloned().unwrap_or_default())
    }

    pub fn set(&mut self, column: &str, row: usize, value: CellValue) -> Result<()> {
        let col = self.column_index(column)?;
        let row = self.row_index(row)?;
        let width = self.columns.len();
        let cells = &mut self.rows[row];
        if cells.len() < width {
            cells.resize(width, CellValue::Empty);
        }
        cells[col] = value;
        Ok(())
    }

    pub fn append(&mut self) -> usize {
        self.rows.push(vec![CellValue::Empty; self.columns.len()]);
        self.rows.len()
    }

    pub fn delete(&mut self, row: usize) -> Result<()> {
        let row = self.row_index(row)?;
        self.rows.remove(row);
        Ok(())
    }
}
