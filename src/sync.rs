//! Row-by-row synchronization of pending tickers with their sources

use std::collections::HashSet;
use tracing::{debug, info};

use crate::editor::CategorySheet;
use crate::error::{Result, Rule1Error};
use crate::extractor::MetricExtractor;
use crate::models::{RowStatus, Ticker};
use crate::source::SourceGenerator;
use crate::table::HostTable;

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Update every row regardless of status
    pub include_all: bool,
}

/// What a synchronization run changed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub updated: Vec<Ticker>,
    pub regenerated: Vec<Ticker>,
    pub cells_written: usize,
}

/// Batch-updates the pending rows of a category sheet
pub struct RowSynchronizer<'a, G: SourceGenerator> {
    extractor: MetricExtractor<'a, G>,
}

impl<'a, G: SourceGenerator> RowSynchronizer<'a, G> {
    pub fn new(extractor: MetricExtractor<'a, G>) -> Self {
        Self { extractor }
    }

    /// Fill metric columns of pending rows and mark them Updated.
    ///
    /// Rows are processed in table order. The first failure aborts the run;
    /// rows updated before it keep their new values.
    pub fn sync<T: HostTable>(
        &self,
        sheet: &mut CategorySheet<T>,
        options: SyncOptions,
    ) -> Result<SyncReport> {
        let pending: HashSet<Ticker> = sheet
            .list_tickers(!options.include_all)?
            .into_iter()
            .collect();

        if pending.is_empty() {
            return Err(Rule1Error::NothingToUpdate);
        }

        let category = sheet.category().clone();
        info!("📊 Updating {} tickers in {}", pending.len(), category);

        let mut report = SyncReport::default();
        for row in 1..=sheet.table().row_count() {
            let Some(ticker) = sheet.ticker_at(row)? else {
                continue;
            };
            if !pending.contains(&ticker) {
                continue;
            }

            let extraction = self.extractor.extract(&category, &ticker)?;
            for (column, value) in extraction.values {
                debug!("{} row {}: {} = {}", ticker, row, column, value);
                sheet.table_mut().set_cell(&column, row, value)?;
                report.cells_written += 1;
            }

            sheet.set_status(row, RowStatus::Updated)?;
            if category.has_suggestions() {
                sheet.fill_suggestions(row)?;
            }

            if extraction.regenerated {
                report.regenerated.push(ticker.clone());
            }
            info!("✅ {} updated", ticker);
            report.updated.push(ticker);
        }

        info!(
            "🎉 {}: {} rows updated, {} sources regenerated",
            category,
            report.updated.len(),
            report.regenerated.len()
        );
        Ok(report)
    }
}
