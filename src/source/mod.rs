//! Per-ticker financial source workbooks
//!
//! One `.xlsx` per ticker lives under the source directory. A source is
//! reused while it is valid and handed to the generator otherwise.

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, Rule1Error};
use crate::models::{CellValue, Ticker};
use crate::translation::MetricMap;

pub mod generator;

pub use generator::{CommandGenerator, SourceGenerator};

/// Header of the metric-name column in the results sheet
pub const METRIC_COLUMN: &str = "Rule #1 Metric";

/// Header of the value column in the results sheet
pub const VALUE_COLUMN: &str = "Value";

const SOURCE_EXTENSION: &str = "xlsx";

/// Outcome of a validity check
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValidity {
    Valid,
    Missing,
    Unreadable(String),
    MissingSheet(String),
    Stale { modified: DateTime<Utc> },
}

impl SourceValidity {
    pub fn is_valid(&self) -> bool {
        matches!(self, SourceValidity::Valid)
    }
}

/// Locates, validates and reads source workbooks
#[derive(Debug, Clone)]
pub struct SourceStore {
    dir: PathBuf,
    results_sheet: String,
    max_age: Option<Duration>,
}

impl SourceStore {
    pub fn new(dir: impl Into<PathBuf>, results_sheet: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            results_sheet: results_sheet.into(),
            max_age: None,
        }
    }

    /// Treat sources older than `days` as invalid. A value too large for
    /// a `Duration` sets no limit.
    pub fn with_max_age_days(mut self, days: Option<i64>) -> Self {
        self.max_age = days.and_then(Duration::try_days);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn results_sheet(&self) -> &str {
        &self.results_sheet
    }

    /// Deterministic location of a ticker's source
    pub fn path_for(&self, ticker: &Ticker) -> PathBuf {
        self.dir.join(format!("{}.{}", ticker.as_str(), SOURCE_EXTENSION))
    }

    /// Check that the source exists, opens, has the results sheet and the
    /// section sheet, and is recent enough.
    pub fn validity(&self, ticker: &Ticker, section: &str) -> SourceValidity {
        let path = self.path_for(ticker);
        if !path.is_file() {
            return SourceValidity::Missing;
        }

        if let Some(max_age) = self.max_age {
            if let Some(modified) = modified_at(&path) {
                if Utc::now() - modified > max_age {
                    return SourceValidity::Stale { modified };
                }
            }
        }

        let workbook = match open_workbook_auto(&path) {
            Ok(workbook) => workbook,
            Err(e) => return SourceValidity::Unreadable(e.to_string()),
        };

        let sheets = workbook.sheet_names();
        for required in [self.results_sheet.as_str(), section] {
            if !sheets.iter().any(|s| s == required) {
                return SourceValidity::MissingSheet(required.to_string());
            }
        }

        SourceValidity::Valid
    }

    /// Read the results sheet as metric identifier -> value
    pub fn load_metrics(&self, ticker: &Ticker) -> Result<MetricMap> {
        let path = self.path_for(ticker);
        let mut workbook = open_workbook_auto(&path)?;

        let range = workbook
            .worksheet_range(&self.results_sheet)
            .map_err(|e| Rule1Error::MalformedSource {
                path: path.clone(),
                reason: format!("cannot read sheet '{}': {}", self.results_sheet, e),
            })?;

        let mut rows = range.rows();
        let header = rows.next().ok_or_else(|| Rule1Error::MalformedSource {
            path: path.clone(),
            reason: format!("sheet '{}' is empty", self.results_sheet),
        })?;

        let column = |name: &str| {
            header
                .iter()
                .position(|cell| matches!(cell, Data::String(s) if s.trim() == name))
                .ok_or_else(|| Rule1Error::MalformedSource {
                    path: path.clone(),
                    reason: format!("missing column '{}'", name),
                })
        };
        let metric_col = column(METRIC_COLUMN)?;
        let value_col = column(VALUE_COLUMN)?;

        let mut metrics = MetricMap::new();
        for row in rows {
            let key = match row.get(metric_col) {
                Some(Data::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
                Some(Data::Empty) | None => continue,
                Some(Data::String(_)) => continue,
                Some(other) => other.to_string(),
            };
            let value = row.get(value_col).map(cell_from_data).unwrap_or_default();
            if metrics.insert(key.clone(), value).is_some() {
                warn!("Duplicate metric '{}' in {}, keeping last value", key, path.display());
            }
        }

        debug!("Read {} metrics from {}", metrics.len(), path.display());
        Ok(metrics)
    }
}

fn modified_at(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}
