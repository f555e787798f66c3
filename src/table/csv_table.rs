use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{Grid, HostTable};
use crate::error::{Result, Rule1Error};
use crate::models::{CellValue, QUALITATIVE_COLUMNS, STATUS_COLUMN, TICKER_COLUMN};

/// Host table persisted as a CSV file whose header row holds the column names
#[derive(Debug)]
pub struct CsvTable {
    path: PathBuf,
    grid: Grid,
}

impl CsvTable {
    /// Load an existing table file
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let text_columns: Vec<bool> = columns.iter().map(|c| is_text_column(c)).collect();
        let mut grid = Grid::new(columns);

        for record in reader.records() {
            let record = record?;
            let row = record
                .iter()
                .enumerate()
                .map(|(i, raw)| {
                    if text_columns.get(i).copied().unwrap_or(false) {
                        CellValue::text(raw)
                    } else {
                        CellValue::parse(raw)
                    }
                })
                .collect();
            grid.rows.push(row);
        }

        debug!("Opened {} with {} rows", path.display(), grid.rows.len());
        Ok(Self {
            path: path.to_path_buf(),
            grid,
        })
    }

    /// Create a new, empty table file with the given columns
    pub fn create(path: &Path, columns: Vec<String>) -> Result<Self> {
        if path.exists() {
            return Err(Rule1Error::Config(format!(
                "table {} already exists",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let table = Self {
            path: path.to_path_buf(),
            grid: Grid::new(columns),
        };
        table.save()?;
        info!("✅ Created table {}", path.display());
        Ok(table)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the table back to disk through a temporary file
    pub fn save(&self) -> Result<()> {
        let tmp_path = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp_path)?;
            writer.write_record(&self.grid.columns)?;
            for row in &self.grid.rows {
                let mut cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
                cells.resize(self.grid.columns.len(), String::new());
                writer.write_record(&cells)?;
            }
            writer.flush()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;

        debug!("Saved {} rows to {}", self.grid.rows.len(), self.path.display());
        Ok(())
    }
}

/// Columns whose cells keep their raw text; `0700` stays a ticker, not 700
fn is_text_column(column: &str) -> bool {
    column == TICKER_COLUMN || column == STATUS_COLUMN || QUALITATIVE_COLUMNS.contains(&column)
}

impl HostTable for CsvTable {
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
}
