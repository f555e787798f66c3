//! Ticker add/remove/list operations on a category's host table

use tracing::{debug, info, warn};

use crate::error::{Result, Rule1Error};
use crate::models::{
    CellValue, Category, RowStatus, Ticker, QUALITATIVE_COLUMNS, STATUS_COLUMN,
    SUGGESTION_SENTINEL, TICKER_COLUMN,
};
use crate::table::HostTable;

/// A category together with the host table it owns
pub struct CategorySheet<T: HostTable> {
    category: Category,
    table: T,
}

impl<T: HostTable> CategorySheet<T> {
    pub fn new(category: Category, table: T) -> Self {
        Self { category, table }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut T {
        &mut self.table
    }

    /// Ticker in `row`, or None when the cell is blank or not a valid ticker
    pub fn ticker_at(&self, row: usize) -> Result<Option<Ticker>> {
        match self.table.get_cell(TICKER_COLUMN, row)? {
            CellValue::Empty => Ok(None),
            cell => match Ticker::parse(&cell.to_string()) {
                Ok(ticker) => Ok(Some(ticker)),
                Err(_) => {
                    warn!("Skipping row {} of {}: '{}' is not a ticker", row, self.category, cell);
                    Ok(None)
                }
            },
        }
    }

    pub fn status_at(&self, row: usize) -> Result<RowStatus> {
        Ok(RowStatus::from_cell(&self.table.get_cell(STATUS_COLUMN, row)?))
    }

    pub fn set_status(&mut self, row: usize, status: RowStatus) -> Result<()> {
        self.table.set_cell(STATUS_COLUMN, row, status.to_cell())
    }

    /// Tickers in table row order, optionally only pending rows
    pub fn list_tickers(&self, pending_only: bool) -> Result<Vec<Ticker>> {
        let mut tickers = Vec::new();
        for row in 1..=self.table.row_count() {
            let Some(ticker) = self.ticker_at(row)? else {
                continue;
            };
            if !pending_only || self.status_at(row)?.is_pending() {
                tickers.push(ticker);
            }
        }
        Ok(tickers)
    }

    pub fn contains(&self, ticker: &Ticker) -> Result<bool> {
        Ok(self.find_row(ticker)?.is_some())
    }

    /// First row holding `ticker`
    pub fn find_row(&self, ticker: &Ticker) -> Result<Option<usize>> {
        for row in 1..=self.table.row_count() {
            if self.ticker_at(row)?.as_ref() == Some(ticker) {
                return Ok(Some(row));
            }
        }
        Ok(None)
    }

    /// Append a row for a ticker not yet in the table and mark it New
    pub fn add_ticker(&mut self, ticker: &Ticker) -> Result<usize> {
        if self.contains(ticker)? {
            return Err(Rule1Error::DuplicateTicker {
                ticker: ticker.to_string(),
                category: self.category.to_string(),
            });
        }

        let row = self.table.append_row()?;
        self.table
            .set_cell(TICKER_COLUMN, row, CellValue::Text(ticker.to_string()))?;
        self.fill_suggestions(row)?;
        self.set_status(row, RowStatus::New)?;

        info!("➕ Added {} to {} (row {})", ticker, self.category, row);
        Ok(row)
    }

    /// Remove the first row holding `ticker`
    pub fn delete_ticker(&mut self, ticker: &Ticker) -> Result<usize> {
        let row = self
            .find_row(ticker)?
            .ok_or_else(|| Rule1Error::TickerNotFound {
                ticker: ticker.to_string(),
                category: self.category.to_string(),
            })?;

        self.table.reset_filter()?;
        self.table.delete_row(row)?;

        info!("➖ Removed {} from {} (row {})", ticker, self.category, row);
        Ok(row)
    }

    /// Put the CHECK sentinel into unfilled qualitative cells of `row`.
    /// Returns how many cells were filled.
    pub fn fill_suggestions(&mut self, row: usize) -> Result<usize> {
        let mut filled = 0;
        for column in QUALITATIVE_COLUMNS {
            if self.table.get_cell(column, row)?.is_empty() {
                self.table
                    .set_cell(column, row, CellValue::from(SUGGESTION_SENTINEL))?;
                filled += 1;
            }
        }
        debug!("Filled {} suggestion cells in row {}", filled, row);
        Ok(filled)
    }
}
