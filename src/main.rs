use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rule1_sheets::interaction::{ask_ticker, open_source, ConsoleInteraction, SystemOpener, UserInteraction};
use rule1_sheets::models::{Category, Config, Ticker, QUALITATIVE_COLUMNS, STATUS_COLUMN, TICKER_COLUMN};
use rule1_sheets::source::{CommandGenerator, SourceStore};
use rule1_sheets::table::{CsvTable, HostTable};
use rule1_sheets::translation::TranslationTable;
use rule1_sheets::{CategorySheet, MetricExtractor, RowSynchronizer, Rule1Error, SyncOptions};

/// Keep Rule #1 watchlist tables in sync with per-ticker financial statements
#[derive(Parser)]
#[command(name = "rule1-sheets")]
#[command(version)]
#[command(about = "Fill Rule #1 valuation metrics into watchlist and portfolio tables")]
struct Cli {
    /// Directory holding one <Category>.csv table per category
    #[arg(long, global = true)]
    table_dir: Option<PathBuf>,

    /// Directory holding the per-ticker financial statement workbooks
    #[arg(long, global = true)]
    source_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty table for a category with all known columns
    Init { category: String },
    /// Add a ticker row (prompts when no ticker is given)
    Add { category: String, ticker: Option<String> },
    /// Delete a ticker row (prompts when no ticker is given)
    Delete { category: String, ticker: Option<String> },
    /// List tickers in table order
    List {
        category: String,
        /// Only rows not yet Updated and not on Hold
        #[arg(long)]
        pending: bool,
    },
    /// Fill Rule #1 metrics into pending rows
    Sync {
        category: String,
        /// Update every row regardless of status
        #[arg(long)]
        all: bool,
    },
    /// Open a ticker's financial statement workbook
    Open { ticker: Option<String> },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rule1_sheets=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env()?;
    if let Some(dir) = cli.table_dir {
        config.table_dir = dir;
    }
    if let Some(dir) = cli.source_dir {
        config.source_dir = dir;
    }

    let mut ui = ConsoleInteraction::stdio();
    match run(cli.command, &config, &mut ui) {
        Ok(()) => Ok(()),
        Err(e) if e.is_notice() => {
            ui.alert(&e.to_string(), e.title());
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            ui.alert(&e.to_string(), e.title());
            std::process::exit(1);
        }
    }
}

fn run<U: UserInteraction>(command: Commands, config: &Config, ui: &mut U) -> rule1_sheets::Result<()> {
    let translations = TranslationTable::load(config.translation_path.as_deref())?;

    match command {
        Commands::Init { category } => {
            let category = Category::new(&category);
            let rules = translations.rules(&category)?;

            let mut columns: Vec<String> = vec![TICKER_COLUMN.to_string(), STATUS_COLUMN.to_string()];
            columns.extend(QUALITATIVE_COLUMNS.iter().map(|c| c.to_string()));
            for header in &rules.table_headers {
                if !columns.contains(header) {
                    columns.push(header.clone());
                }
            }
            CsvTable::create(&table_path(config, &category), columns)?;
        }
        Commands::Add { category, ticker } => {
            let mut sheet = open_sheet(config, &category)?;
            let ticker = resolve_ticker(ticker, ui)?;
            sheet.add_ticker(&ticker)?;
            sheet.table().save()?;
        }
        Commands::Delete { category, ticker } => {
            let mut sheet = open_sheet(config, &category)?;
            let ticker = resolve_ticker(ticker, ui)?;
            sheet.delete_ticker(&ticker)?;
            sheet.table().save()?;
        }
        Commands::List { category, pending } => {
            let sheet = open_sheet(config, &category)?;
            for ticker in sheet.list_tickers(pending)? {
                println!("{}", ticker);
            }
        }
        Commands::Sync { category, all } => {
            let mut sheet = open_sheet(config, &category)?;
            // Fail on an unknown category before touching any source
            translations.rules(sheet.category())?;

            let store = source_store(config);
            let generator = CommandGenerator::from_command_line(&config.generator_command)?;
            let synchronizer = RowSynchronizer::new(MetricExtractor::new(&store, &generator, &translations));

            let result = synchronizer.sync(&mut sheet, SyncOptions { include_all: all });
            // Rows updated before a failure are kept, as in a live sheet.
            sheet.table().save()?;
            let report = result?;

            println!(
                "Updated {} tickers ({} sources regenerated, {} cells written)",
                report.updated.len(),
                report.regenerated.len(),
                report.cells_written
            );
        }
        Commands::Open { ticker } => {
            let ticker = resolve_ticker(ticker, ui)?;
            open_source(&source_store(config), &SystemOpener, &ticker)?;
        }
    }

    Ok(())
}

fn table_path(config: &Config, category: &Category) -> PathBuf {
    config.table_dir.join(format!("{}.csv", category))
}

fn open_sheet(config: &Config, category: &str) -> rule1_sheets::Result<CategorySheet<CsvTable>> {
    let category = Category::new(category);
    let path = table_path(config, &category);
    if !path.is_file() {
        return Err(Rule1Error::Config(format!(
            "no table for {} at {} (run `rule1-sheets init {}` first)",
            category,
            path.display(),
            category
        )));
    }

    let table = CsvTable::open(&path)?;
    for required in [TICKER_COLUMN, STATUS_COLUMN] {
        if !table.has_column(required) {
            return Err(Rule1Error::UnknownColumn(required.to_string()));
        }
    }

    info!("📋 {} table: {} rows", category, table.row_count());
    Ok(CategorySheet::new(category, table))
}

fn source_store(config: &Config) -> SourceStore {
    SourceStore::new(&config.source_dir, config.results_sheet.as_str())
        .with_max_age_days(config.source_max_age_days)
}

fn resolve_ticker<U: UserInteraction>(ticker: Option<String>, ui: &mut U) -> rule1_sheets::Result<Ticker> {
    match ticker {
        Some(raw) => Ticker::parse(&raw),
        None => ask_ticker(ui),
    }
}
