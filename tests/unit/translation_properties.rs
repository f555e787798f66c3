//! Translation lookup properties

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use test_log::test;

use rule1_sheets::models::{CellValue, Category};
use rule1_sheets::translation::{MetricMap, TranslationTable};
use rule1_sheets::Rule1Error;

fn sample_metrics() -> Vec<MetricMap> {
    let names = [
        "ROIC (10y avg)",
        "Sticker Price",
        "MOS Price",
        "Current Price",
        "Debt Payoff Time",
        "Unrelated Metric",
        "Free Cash Flow",
    ];

    // Every prefix of the name list, plus the empty map
    (0..=names.len())
        .map(|n| {
            names[..n]
                .iter()
                .enumerate()
                .map(|(i, name)| (name.to_string(), CellValue::Number(i as f64 * 1.5)))
                .collect()
        })
        .collect()
}

#[test]
fn test_translation_keys_subset_and_size() {
    let table = TranslationTable::embedded().unwrap();

    for name in table.categories() {
        let category = Category::new(name);
        let rules = table.rules(&category).unwrap().clone();

        for metrics in sample_metrics() {
            let out = table.translate(&category, &metrics).unwrap();

            for key in out.keys() {
                assert!(rules.table_headers.contains(key), "{key} not a {name} header");
            }

            let expected = metrics
                .keys()
                .filter(|k| rules.rule1_metrics.contains(*k))
                .count();
            assert_eq!(out.len(), expected, "category {name}, input {metrics:?}");
        }
    }
}

#[test]
fn test_translation_values_verbatim() {
    let table = TranslationTable::embedded().unwrap();
    let mut metrics = MetricMap::new();
    metrics.insert("Payback Time".into(), CellValue::Text("n/a".into()));
    metrics.insert("Sticker Price".into(), CellValue::Number(101.75));

    let out = table.translate(&Category::new("Watchlist"), &metrics).unwrap();

    assert_eq!(out.get("Payback Time"), Some(&CellValue::Text("n/a".into())));
    assert_eq!(out.get("Sticker Price"), Some(&CellValue::Number(101.75)));
}

#[test]
fn test_unknown_category_never_silently_empty() {
    let table = TranslationTable::embedded().unwrap();

    for name in ["Bonds", "", "watch list"] {
        assert_matches!(
            table.translate(&Category::new(name), &MetricMap::new()),
            Err(Rule1Error::UnknownCategory { .. })
        );
    }
}

#[test]
fn test_translation_file_roundtrip_from_disk() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("translation.json");
    std::fs::write(
        &path,
        r#"{"Ideas": {"rule1_metrics": ["Sticker Price"], "table_headers": ["Sticker"]}}"#,
    )
    .unwrap();

    let table = TranslationTable::load(Some(&path)).unwrap();
    let mut metrics = MetricMap::new();
    metrics.insert("Sticker Price".into(), CellValue::Number(10.0));

    let out = table.translate(&Category::new("ideas"), &metrics).unwrap();
    assert_eq!(out.get("Sticker"), Some(&CellValue::Number(10.0)));
}
