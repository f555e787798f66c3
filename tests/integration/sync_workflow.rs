//! Integration tests for the row synchronization workflow

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use test_log::test;

use crate::common::logging::{init_test_logging, log_test_data, log_test_step};
use crate::common::{tables, write_source, FixtureGenerator};
use rule1_sheets::models::{CellValue, RowStatus, Ticker};
use rule1_sheets::source::SourceStore;
use rule1_sheets::table::HostTable;
use rule1_sheets::translation::TranslationTable;
use rule1_sheets::{MetricExtractor, RowSynchronizer, Rule1Error, SyncOptions};

const RESULTS: &str = "rule1_results";

fn ticker(s: &str) -> Ticker {
    Ticker::parse(s).unwrap()
}

#[test]
fn test_sync_updates_pending_rows_only() {
    init_test_logging();
    log_test_step("Sync a watchlist with mixed statuses");

    let temp_dir = tempfile::tempdir().unwrap();
    let store = SourceStore::new(temp_dir.path(), RESULTS);
    let translations = TranslationTable::embedded().unwrap();

    // AAPL has a valid source already, KO needs generation
    write_source(
        temp_dir.path(),
        "AAPL",
        RESULTS,
        &["Watchlist"],
        &[("Sticker Price", 200.0), ("MOS Price", 100.0), ("Not Translated", 1.0)],
    );
    let generator = FixtureGenerator::new(&store, &["Watchlist"])
        .with_metrics("KO", &[("Current Price", 61.5), ("ROIC (10y avg)", 0.12)]);

    let mut sheet = tables::sheet_with(
        "Watchlist",
        &[("AAPL", "New"), ("MSFT", "Updated"), ("KO", ""), ("V", "Hold")],
    );
    sheet
        .table_mut()
        .set_cell("Personal Approval", 1, "Approved".into())
        .unwrap();
    let untouched_before: Vec<_> = [2, 4]
        .iter()
        .map(|row| sheet.table().columns().iter().map(|c| sheet.table().get_cell(c, *row).unwrap()).collect::<Vec<_>>())
        .collect();

    let synchronizer = RowSynchronizer::new(MetricExtractor::new(&store, &generator, &translations));
    let report = synchronizer.sync(&mut sheet, SyncOptions::default()).unwrap();
    log_test_data("Sync report", &report);

    assert_eq!(report.updated, vec![ticker("AAPL"), ticker("KO")]);
    assert_eq!(report.regenerated, vec![ticker("KO")]);
    assert_eq!(report.cells_written, 4);
    assert_eq!(generator.calls.borrow().clone(), vec![("KO".to_string(), true)]);

    let table = sheet.table();
    assert_eq!(table.get_cell("Sticker Price", 1).unwrap(), CellValue::Number(200.0));
    assert_eq!(table.get_cell("MOS Price", 1).unwrap(), CellValue::Number(100.0));
    assert_eq!(table.get_cell("Price", 3).unwrap(), CellValue::Number(61.5));
    assert_eq!(table.get_cell("ROIC", 3).unwrap(), CellValue::Number(0.12));
    assert_eq!(sheet.status_at(1).unwrap(), RowStatus::Updated);
    assert_eq!(sheet.status_at(3).unwrap(), RowStatus::Updated);

    // Watchlist rows get suggestions; filled cells survive
    assert_eq!(table.get_cell("Personal Approval", 1).unwrap(), CellValue::from("Approved"));
    assert_eq!(table.get_cell("Meaning Approved", 1).unwrap(), CellValue::from("CHECK"));
    assert_eq!(table.get_cell("Management Approved", 3).unwrap(), CellValue::from("CHECK"));

    let untouched_after: Vec<_> = [2, 4]
        .iter()
        .map(|row| table.columns().iter().map(|c| table.get_cell(c, *row).unwrap()).collect::<Vec<_>>())
        .collect();
    assert_eq!(untouched_after, untouched_before);
}

#[test]
fn test_second_sync_is_a_no_op() {
    init_test_logging();
    log_test_step("Running sync twice performs no further writes");

    let temp_dir = tempfile::tempdir().unwrap();
    let store = SourceStore::new(temp_dir.path(), RESULTS);
    let translations = TranslationTable::embedded().unwrap();
    let generator = FixtureGenerator::new(&store, &["Portfolio"])
        .with_metrics("AAPL", &[("Sticker Price", 150.0)]);

    let mut sheet = tables::sheet_with("portfolio", &[("AAPL", "New")]);
    let synchronizer = RowSynchronizer::new(MetricExtractor::new(&store, &generator, &translations));

    synchronizer.sync(&mut sheet, SyncOptions::default()).unwrap();
    let after_first = sheet.table().clone();

    assert_matches!(
        synchronizer.sync(&mut sheet, SyncOptions::default()),
        Err(Rule1Error::NothingToUpdate)
    );
    assert_eq!(sheet.table(), &after_first);
    assert_eq!(generator.generated(), vec!["AAPL".to_string()]);
}

#[test]
fn test_include_all_reprocesses_updated_rows_and_reuses_sources() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = SourceStore::new(temp_dir.path(), RESULTS);
    let translations = TranslationTable::embedded().unwrap();
    write_source(temp_dir.path(), "MSFT", RESULTS, &["Portfolio"], &[("MOS Price", 210.0)]);
    let generator = FixtureGenerator::new(&store, &["Portfolio"]);

    let mut sheet = tables::sheet_with("Portfolio", &[("MSFT", "Hold")]);
    let synchronizer = RowSynchronizer::new(MetricExtractor::new(&store, &generator, &translations));

    let report = synchronizer
        .sync(&mut sheet, SyncOptions { include_all: true })
        .unwrap();

    assert_eq!(report.updated, vec![ticker("MSFT")]);
    assert!(generator.generated().is_empty());
    assert_eq!(sheet.table().get_cell("MOS Price", 1).unwrap(), CellValue::Number(210.0));
    // Portfolio rows get no suggestions
    assert_eq!(sheet.table().get_cell("Meaning Approved", 1).unwrap(), CellValue::Empty);
}

#[test]
fn test_source_without_category_section_is_regenerated() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = SourceStore::new(temp_dir.path(), RESULTS);
    let translations = TranslationTable::embedded().unwrap();
    write_source(temp_dir.path(), "KO", RESULTS, &["Watchlist"], &[("MOS Price", 1.0)]);
    let generator = FixtureGenerator::new(&store, &["Watchlist", "Portfolio"])
        .with_metrics("KO", &[("MOS Price", 30.0)]);

    let mut sheet = tables::sheet_with("Portfolio", &[("KO", "New")]);
    let synchronizer = RowSynchronizer::new(MetricExtractor::new(&store, &generator, &translations));
    synchronizer.sync(&mut sheet, SyncOptions::default()).unwrap();

    assert_eq!(generator.generated(), vec!["KO".to_string()]);
    assert_eq!(sheet.table().get_cell("MOS Price", 1).unwrap(), CellValue::Number(30.0));
}

#[test]
fn test_failure_aborts_but_keeps_earlier_rows() {
    init_test_logging();
    log_test_step("A generator failure stops the batch");

    let temp_dir = tempfile::tempdir().unwrap();
    let store = SourceStore::new(temp_dir.path(), RESULTS);
    let translations = TranslationTable::embedded().unwrap();
    let generator = FixtureGenerator::new(&store, &["Watchlist"])
        .with_metrics("AAPL", &[("Sticker Price", 200.0)])
        .failing_for("BAD")
        .with_metrics("KO", &[("Sticker Price", 70.0)]);

    let mut sheet = tables::sheet_with("Watchlist", &[("AAPL", "New"), ("BAD", "New"), ("KO", "New")]);
    let synchronizer = RowSynchronizer::new(MetricExtractor::new(&store, &generator, &translations));

    assert_matches!(
        synchronizer.sync(&mut sheet, SyncOptions::default()),
        Err(Rule1Error::Generation { ticker, .. }) if ticker == "BAD"
    );

    assert_eq!(sheet.status_at(1).unwrap(), RowStatus::Updated);
    assert_eq!(sheet.table().get_cell("Sticker Price", 1).unwrap(), CellValue::Number(200.0));
    assert_eq!(sheet.status_at(2).unwrap(), RowStatus::New);
    assert_eq!(sheet.status_at(3).unwrap(), RowStatus::New);
    assert_eq!(generator.generated(), vec!["AAPL".to_string(), "BAD".to_string()]);
}

#[test]
fn test_translated_header_missing_from_table_aborts() {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = SourceStore::new(temp_dir.path(), RESULTS);
    let translations = TranslationTable::embedded().unwrap();
    write_source(temp_dir.path(), "AAPL", RESULTS, &["Portfolio"], &[("Sticker Price", 1.0)]);
    let generator = FixtureGenerator::new(&store, &["Portfolio"]);

    let mut sheet = rule1_sheets::CategorySheet::new(
        rule1_sheets::models::Category::new("Portfolio"),
        rule1_sheets::table::MemoryTable::with_rows(
            ["Ticker", "Status"],
            vec![vec!["AAPL".into(), "New".into()]],
        ),
    );
    let synchronizer = RowSynchronizer::new(MetricExtractor::new(&store, &generator, &translations));

    assert_matches!(
        synchronizer.sync(&mut sheet, SyncOptions::default()),
        Err(Rule1Error::UnknownColumn(column)) if column == "Sticker Price"
    );
    assert_eq!(sheet.status_at(1).unwrap(), RowStatus::New);
}
