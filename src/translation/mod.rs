//! Metric identifier to table header translation
//!
//! Each category carries two parallel lists: the Rule #1 metric identifiers
//! produced by the source generator and the host table headers they land in.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, Rule1Error};
use crate::models::{CellValue, Category};

/// Raw metrics read from a source: identifier -> value
pub type MetricMap = HashMap<String, CellValue>;

/// Translated metrics: table header -> value
pub type HeaderValues = BTreeMap<String, CellValue>;

const DEFAULT_TRANSLATION: &str = include_str!("../../data/translation.json");

/// Translation rules for one category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRules {
    pub rule1_metrics: Vec<String>,
    pub table_headers: Vec<String>,
    /// Sheet a source must contain to be valid for this category.
    /// Defaults to the category name.
    #[serde(default)]
    pub source_section: Option<String>,
}

impl CategoryRules {
    /// Iterate (metric identifier, table header) pairs in table order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.rule1_metrics
            .iter()
            .zip(self.table_headers.iter())
            .map(|(m, h)| (m.as_str(), h.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct TranslationTable {
    categories: HashMap<String, CategoryRules>,
}

impl TranslationTable {
    /// Parse translation data from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let categories: HashMap<String, CategoryRules> = serde_json::from_str(json)?;

        for (name, rules) in &categories {
            if rules.rule1_metrics.len() != rules.table_headers.len() {
                return Err(Rule1Error::Translation(format!(
                    "category '{}' has {} metrics but {} table headers",
                    name,
                    rules.rule1_metrics.len(),
                    rules.table_headers.len()
                )));
            }
        }

        debug!("Loaded translation rules for {} categories", categories.len());
        Ok(Self { categories })
    }

    /// Load translation data from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        info!("📋 Loading translation data from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Translation data shipped with the crate
    pub fn embedded() -> Result<Self> {
        Self::from_json(DEFAULT_TRANSLATION)
    }

    /// Load from `path` if given, otherwise use the embedded data
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }

    /// Category names known to the translation data, sorted
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.categories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Rules for a category, or a configuration error naming the closest match
    pub fn rules(&self, category: &Category) -> Result<&CategoryRules> {
        self.categories
            .get(category.name())
            .ok_or_else(|| Rule1Error::UnknownCategory {
                category: category.name().to_string(),
                suggestion: self.closest_category(category.name()),
            })
    }

    /// Sheet a source must contain to serve this category
    pub fn source_section(&self, category: &Category) -> Result<String> {
        let rules = self.rules(category)?;
        Ok(rules
            .source_section
            .clone()
            .unwrap_or_else(|| category.name().to_string()))
    }

    /// Rename metric identifiers to table headers.
    ///
    /// Identifiers the category does not know and identifiers missing from
    /// `metrics` are dropped; values are copied verbatim.
    pub fn translate(&self, category: &Category, metrics: &MetricMap) -> Result<HeaderValues> {
        let rules = self.rules(category)?;

        let translated: HeaderValues = rules
            .pairs()
            .filter_map(|(metric, header)| {
                metrics
                    .get(metric)
                    .map(|value| (header.to_string(), value.clone()))
            })
            .collect();

        debug!(
            "Translated {} of {} metrics for {}",
            translated.len(),
            metrics.len(),
            category
        );
        Ok(translated)
    }

    fn closest_category(&self, name: &str) -> Option<String> {
        let matcher = SkimMatcherV2::default().ignore_case();
        self.categories
            .keys()
            .filter_map(|known| matcher.fuzzy_match(known, name).map(|score| (score, known)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, known)| known.clone())
    }
}
