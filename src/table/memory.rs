use super::{Grid, HostTable};
use crate::error::Result;
use crate::models::CellValue;

/// In-memory host table, used for embedding and tests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryTable {
    grid: Grid,
    filter: Option<(String, CellValue)>,
}

impl MemoryTable {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            grid: Grid::new(columns.into_iter().map(Into::into).collect()),
            filter: None,
        }
    }

    /// Build a table from literal rows, one value per column
    pub fn with_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        let mut table = Self::new(columns);
        table.grid.rows = rows;
        table
    }

    /// Mark the table as filtered on `column == value`
    pub fn set_filter(&mut self, column: &str, value: CellValue) {
        self.filter = Some((column.to_string(), value));
    }

    pub fn is_filtered(&self) -> bool {
        self.filter.is_some()
    }
}

impl HostTable for MemoryTable {
    fn columns(&self) -> &[String] {
        &self.grid.columns
    }

    fn row_count(&self) -> usize {
        self.grid.rows.len()
    }

    fn get_cell(&self, column: &str, row: usize) -> Result<CellValue> {
        self.grid.get(column, row)
    }

    fn set_cell(&mut self, column: &str, row: usize, value: CellValue) -> Result<()> {
        self.grid.set(column, row, value)
    }

    fn append_row(&mut self) -> Result<usize> {
        Ok(self.grid.append())
    }

    fn delete_row(&mut self, row: usize) -> Result<()> {
        self.grid.delete(row)
    }

    fn reset_filter(&mut self) -> Result<()> {
        self.filter = None;
        Ok(())
    }
}
