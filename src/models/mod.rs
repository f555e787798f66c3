use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::{Result, Rule1Error};

/// Header of the ticker column in every host table
pub const TICKER_COLUMN: &str = "Ticker";

/// Header of the status column in every host table
pub const STATUS_COLUMN: &str = "Status";

/// Qualitative evaluation columns the user fills by hand
pub const QUALITATIVE_COLUMNS: [&str; 3] = [
    "Personal Approval",
    "Meaning Approved",
    "Management Approved",
];

/// Placeholder written into unfilled qualitative cells
pub const SUGGESTION_SENTINEL: &str = "CHECK";

/// Category whose rows get qualitative suggestions
pub const WATCHLIST: &str = "Watchlist";

/// Stock ticker, normalized to uppercase
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Parse user or table input into a ticker
    pub fn parse(raw: &str) -> Result<Self> {
        let symbol = raw.trim().to_uppercase();
        let valid = !symbol.is_empty()
            && symbol.len() <= 12
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');

        if !valid {
            return Err(Rule1Error::InvalidTicker(raw.to_string()));
        }
        Ok(Ticker(symbol))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sheet/table grouping of tickers (Watchlist, a portfolio, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    /// Normalize a sheet name: first letter upper, rest lower
    pub fn new(name: &str) -> Self {
        let name = name.trim();
        let mut chars = name.chars();
        let normalized = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
            None => String::new(),
        };
        Category(normalized)
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Whether synchronized rows also receive qualitative suggestions
    pub fn has_suggestions(&self) -> bool {
        self.0 == WATCHLIST
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Row status flag
#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    New,
    Updated,
    Hold,
    Unset,
    Other(String),
}

impl RowStatus {
    pub fn from_cell(cell: &CellValue) -> Self {
        match cell {
            CellValue::Empty => RowStatus::Unset,
            CellValue::Text(s) => match s.as_str() {
                "New" => RowStatus::New,
                "Updated" => RowStatus::Updated,
                "Hold" => RowStatus::Hold,
                _ => RowStatus::Other(s.clone()),
            },
            other => RowStatus::Other(other.to_string()),
        }
    }

    /// Pending rows are everything not Updated and not on Hold
    pub fn is_pending(&self) -> bool {
        !matches!(self, RowStatus::Updated | RowStatus::Hold)
    }

    pub fn to_cell(&self) -> CellValue {
        match self {
            RowStatus::New => CellValue::Text("New".to_string()),
            RowStatus::Updated => CellValue::Text("Updated".to_string()),
            RowStatus::Hold => CellValue::Text("Hold".to_string()),
            RowStatus::Unset => CellValue::Empty,
            RowStatus::Other(s) => CellValue::Text(s.clone()),
        }
    }
}

/// Value of a single table cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Raw text cell with no type guessing; blank stays Empty
    pub fn text(raw: &str) -> Self {
        if raw.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(raw.to_string())
        }
    }

    /// Parse a raw text cell as read from a CSV file
    pub fn parse(raw: &str) -> Self {
        if raw.is_empty() {
            return CellValue::Empty;
        }
        match raw {
            "TRUE" => return CellValue::Bool(true),
            "FALSE" => return CellValue::Bool(false),
            _ => {}
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::Text(raw.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub table_dir: PathBuf,
    pub source_dir: PathBuf,
    pub translation_path: Option<PathBuf>,
    pub generator_command: String,
    pub results_sheet: String,
    pub source_max_age_days: Option<i64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let source_max_age_days = match std::env::var("RULE1_SOURCE_MAX_AGE_DAYS") {
            Ok(raw) => Some(parse_max_age_days(&raw)?),
            Err(_) => None,
        };

        Ok(Config {
            table_dir: std::env::var("RULE1_TABLE_DIR")
                .unwrap_or_else(|_| "tables".to_string())
                .into(),
            source_dir: std::env::var("RULE1_SOURCE_DIR")
                .unwrap_or_else(|_| "financial_files/excel".to_string())
                .into(),
            translation_path: std::env::var("RULE1_TRANSLATION_PATH").ok().map(PathBuf::from),
            generator_command: std::env::var("RULE1_GENERATOR_CMD")
                .unwrap_or_else(|_| "quickfs".to_string()),
            results_sheet: std::env::var("RULE1_RESULTS_SHEET")
                .unwrap_or_else(|_| "rule1_results".to_string()),
            source_max_age_days,
        })
    }
}

/// Validate a `RULE1_SOURCE_MAX_AGE_DAYS` value
pub fn parse_max_age_days(raw: &str) -> Result<i64> {
    let days = raw.trim().parse::<i64>().map_err(|_| {
        Rule1Error::Config(format!(
            "RULE1_SOURCE_MAX_AGE_DAYS must be a whole number of days, got '{}'",
            raw
        ))
    })?;

    if days < 0 || chrono::Duration::try_days(days).is_none() {
        return Err(Rule1Error::Config(format!(
            "RULE1_SOURCE_MAX_AGE_DAYS out of range: {}",
            days
        )));
    }
    Ok(days)
}
