//! Per-ticker metric extraction from source workbooks

use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{Category, Ticker};
use crate::source::{SourceGenerator, SourceStore};
use crate::translation::{HeaderValues, TranslationTable};

/// Translated metrics for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub values: HeaderValues,
    /// Whether the source had to be generated first
    pub regenerated: bool,
}

/// Produces column-header keyed Rule #1 metrics for a ticker
pub struct MetricExtractor<'a, G: SourceGenerator> {
    store: &'a SourceStore,
    generator: &'a G,
    translations: &'a TranslationTable,
}

impl<'a, G: SourceGenerator> MetricExtractor<'a, G> {
    pub fn new(store: &'a SourceStore, generator: &'a G, translations: &'a TranslationTable) -> Self {
        Self {
            store,
            generator,
            translations,
        }
    }

    /// Validate the source, regenerate it when needed, read and translate.
    ///
    /// The source is not re-validated after generation; a generator that
    /// exits cleanly without producing a usable file surfaces as a read error.
    pub fn extract(&self, category: &Category, ticker: &Ticker) -> Result<Extraction> {
        let section = self.translations.source_section(category)?;

        let validity = self.store.validity(ticker, &section);
        let regenerated = !validity.is_valid();
        if regenerated {
            warn!("Source for {} not usable ({:?}), regenerating", ticker, validity);
            self.generator.generate(ticker, true)?;
        }

        let metrics = self.store.load_metrics(ticker)?;
        let values = self.translations.translate(category, &metrics)?;
        debug!("{}: {} values for {}", ticker, values.len(), category);

        Ok(Extraction { values, regenerated })
    }
}
