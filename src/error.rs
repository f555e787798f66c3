//! Error types shared by every rule1-sheets operation

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a table operation.
///
/// Library code always returns these; deciding whether to exit, retry or
/// prompt again is left to the front end.
#[derive(Debug, Error)]
pub enum Rule1Error {
    #[error("Unknown category '{category}'{}", suggestion_hint(.suggestion))]
    UnknownCategory {
        category: String,
        suggestion: Option<String>,
    },

    #[error("Translation data error: {0}")]
    Translation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("The ticker {ticker} is already present in the {category} table.")]
    DuplicateTicker { ticker: String, category: String },

    #[error("The ticker {ticker} is not present in the {category} table.")]
    TickerNotFound { ticker: String, category: String },

    #[error("All tickers are already updated. Please change status if you want to update again.")]
    NothingToUpdate,

    #[error("Invalid ticker '{0}'")]
    InvalidTicker(String),

    #[error("Input cancelled")]
    Cancelled,

    #[error("Excel file for {ticker} doesn't exist ({})", .path.display())]
    SourceMissing { ticker: String, path: PathBuf },

    #[error("Excel file for {ticker} is being used by another process ({})", .path.display())]
    SourceLocked { ticker: String, path: PathBuf },

    #[error("Source generation failed for {ticker}: {reason}")]
    Generation { ticker: String, reason: String },

    #[error("Malformed source {}: {reason}", .path.display())]
    MalformedSource { path: PathBuf, reason: String },

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Row {row} out of range (table has {count} rows)")]
    RowOutOfRange { row: usize, count: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{}'?)", name),
        None => String::new(),
    }
}

impl Rule1Error {
    /// Title used when the error is shown through an alert dialog.
    pub fn title(&self) -> &'static str {
        match self {
            Rule1Error::NothingToUpdate => "All tickers already updated",
            Rule1Error::DuplicateTicker { .. } | Rule1Error::TickerNotFound { .. } => "Ticker",
            Rule1Error::SourceMissing { .. } | Rule1Error::SourceLocked { .. } => "Error opening file",
            Rule1Error::InvalidTicker(_) | Rule1Error::Cancelled => "Input",
            Rule1Error::UnknownCategory { .. }
            | Rule1Error::Translation(_)
            | Rule1Error::Config(_) => "Configuration error",
            _ => "Error",
        }
    }

    /// Notices end the current action without being a failure.
    pub fn is_notice(&self) -> bool {
        matches!(self, Rule1Error::NothingToUpdate | Rule1Error::Cancelled)
    }
}

pub type Result<T> = std::result::Result<T, Rule1Error>;
