//! MixDB Scraper main entry point
//!
//! This is the command-line interface for harvesting mixes and tracklists
//! from the MixesDB Explorer listing.

use anyhow::{bail, Context};
use clap::{ArgGroup, Parser};
use mixdb_scraper::catalog::{CategoryTable, TimeFilter};
use mixdb_scraper::config::{load_config_with_hash, Config};
use mixdb_scraper::crawler::{CategoryScrape, ExplorerQuery, Harvester, StopReason};
use mixdb_scraper::model::Item;
use mixdb_scraper::output::{
    default_report_path, print_statistics, save_report, RunStatistics, ScrapeReport,
    ScrapeSession, SessionStatus,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// MixDB Scraper: a paginated, best-effort catalog harvester
///
/// Walks the MixesDB Explorer listing for one or more genres, extracts
/// mixes with their tracklists, and writes them to a JSON report.
#[derive(Parser, Debug)]
#[command(name = "mixdb-scraper")]
#[command(version = "1.0.0")]
#[command(about = "Harvests mixes and tracklists from the MixesDB Explorer", long_about = None)]
#[command(group(
    ArgGroup::new("action")
        .required(true)
        .args(["list_categories", "category", "categories", "dry_run"]),
))]
struct Cli {
    /// Path to TOML configuration file (built-in defaults otherwise)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// List the known categories and exit
    #[arg(long)]
    list_categories: bool,

    /// Scrape a single category by display name
    #[arg(long, value_name = "NAME")]
    category: Option<String>,

    /// Scrape several categories: `all` or a comma-separated list
    #[arg(long, value_name = "all|A,B,...")]
    categories: Option<String>,

    /// Validate the configuration and show the first request per category
    #[arg(long)]
    dry_run: bool,

    /// Maximum number of items for --category
    #[arg(long, default_value_t = 50)]
    limit: usize,

    /// Items per category for --categories, clamped to the expected count
    #[arg(long, value_name = "N")]
    target: Option<usize>,

    /// Fresh, a year (2024) or a decade (2010s)
    #[arg(long, default_value = "Fresh")]
    time_filter: TimeFilter,

    /// Keep mixes that have no parsable tracklist
    #[arg(long)]
    no_require_subentries: bool,

    /// Report file (defaults to a timestamped file in the output directory)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    let table = CategoryTable::from_config(&config);

    if cli.list_categories {
        handle_list_categories(&table);
        return Ok(());
    }

    let names = category_names(&cli, &table)?;

    if cli.dry_run {
        return handle_dry_run(&config, &table, &names, &cli.time_filter);
    }

    handle_scrape(cli, config, config_hash, names).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("mixdb_scraper=info,warn"),
            1 => EnvFilter::new("mixdb_scraper=debug,info"),
            2 => EnvFilter::new("mixdb_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Categories selected on the command line
///
/// `--dry-run` alone covers every table category.
fn category_names(cli: &Cli, table: &CategoryTable) -> anyhow::Result<Vec<String>> {
    if let Some(name) = &cli.category {
        return Ok(vec![name.trim().to_string()]);
    }

    match cli.categories.as_deref().map(str::trim) {
        None | Some("all") => Ok(table.categories().iter().map(|c| c.name.clone()).collect()),
        Some(list) => {
            let names: Vec<String> = list
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
            if names.is_empty() {
                bail!("--categories needs `all` or at least one category name");
            }
            Ok(names)
        }
    }
}

/// Handles --list-categories: prints the category table
fn handle_list_categories(table: &CategoryTable) {
    println!("=== Categories ===\n");
    for category in table.categories() {
        let code = category.code.as_deref().unwrap_or("-");
        let expected = category
            .expected_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        println!("  {:<4} {:<24} ~{} mixes", code, category.name, expected);
        if !category.aliases.is_empty() {
            println!("       aliases: {}", category.aliases.join(", "));
        }
    }
    println!("\nNames outside this table are searched as free-text categories.");
}

/// Handles --dry-run: validates config and shows what would be requested
fn handle_dry_run(
    config: &Config,
    table: &CategoryTable,
    names: &[String],
    time_filter: &TimeFilter,
) -> anyhow::Result<()> {
    println!("=== MixDB Scraper Dry Run ===\n");

    println!("Scraper Configuration:");
    println!("  Base URL: {}", config.scraper.base_url);
    println!("  Page size: {}", config.scraper.page_size);
    println!("  Request delay: {}ms", config.scraper.request_delay_ms);
    println!("  Max pages per category: {}", config.scraper.max_pages);
    println!("  Text window: {} chars", config.scraper.window_chars);
    println!(
        "  Concurrent categories: {}",
        config.scraper.max_concurrent_categories
    );
    println!("  Time filter: {}", time_filter);
    println!("\nOutput directory: {}", config.output.directory);

    println!("\nFirst request per category ({}):", names.len());
    for name in names {
        let category = table.category(name);
        let url = ExplorerQuery::for_category(&category, config.scraper.page_size)
            .with_time_filter(time_filter)
            .url(&config.scraper.base_url)?;
        println!("  - {}: {}", name, url);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the scrape itself and writes the report
async fn handle_scrape(
    cli: Cli,
    config: Config,
    config_hash: Option<String>,
    names: Vec<String>,
) -> anyhow::Result<()> {
    let output_dir = PathBuf::from(&config.output.directory);
    let harvester = Harvester::new(config)?;
    let require_subentries = !cli.no_require_subentries;

    let cancel = harvester.cancel_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping after the current page");
            cancel.cancel();
        }
    });

    let mut session = ScrapeSession::start(config_hash);

    let results: Vec<(String, mixdb_scraper::Result<CategoryScrape>)> = match &cli.category {
        Some(name) => {
            let result = harvester
                .scrape_category(name, Some(cli.limit), &cli.time_filter, require_subentries)
                .await;
            vec![(name.clone(), result)]
        }
        None => {
            let target = cli.target.unwrap_or(cli.limit);
            harvester
                .scrape_categories(&names, Some(target), &cli.time_filter, require_subentries)
                .await
        }
    };

    let mut items: Vec<Item> = Vec::new();
    let mut by_id: HashMap<String, usize> = HashMap::new();
    let mut stats: Vec<RunStatistics> = Vec::new();
    let mut failures = 0;

    for (name, result) in results {
        match result {
            Ok(scrape) => {
                session.record_category(&name, scrape.items.len());
                if let StopReason::Transport(error) = &scrape.stop_reason {
                    tracing::warn!("{} ended early: {}", name, error);
                }
                merge_items(&mut items, &mut by_id, scrape.items);
                stats.push(scrape.stats);
            }
            Err(e) => {
                tracing::error!("Scrape of {} failed: {}", name, e);
                failures += 1;
            }
        }
    }

    let status = if harvester.cancel_flag().is_cancelled() {
        SessionStatus::Interrupted
    } else if failures > 0 && items.is_empty() {
        SessionStatus::Failed
    } else {
        SessionStatus::Completed
    };
    session.finish(status);

    let prefix = report_prefix(cli.category.as_deref(), names.len());
    let path = cli
        .output
        .unwrap_or_else(|| default_report_path(Path::new(&output_dir), &prefix));
    let report = ScrapeReport::new(&prefix, session, items);
    save_report(&report, &path)
        .with_context(|| format!("Failed to write report {}", path.display()))?;

    print_statistics(&stats);
    println!("\nReport: {}", path.display());

    if status == SessionStatus::Failed {
        bail!("All category scrapes failed");
    }
    Ok(())
}

/// Adds items, folding the categories of items already seen into the first copy
fn merge_items(items: &mut Vec<Item>, by_id: &mut HashMap<String, usize>, incoming: Vec<Item>) {
    for item in incoming {
        match by_id.get(item.id()) {
            Some(&index) => {
                for category in item.categories() {
                    items[index].add_category(category);
                }
            }
            None => {
                by_id.insert(item.id().to_string(), items.len());
                items.push(item);
            }
        }
    }
}

fn report_prefix(category: Option<&str>, count: usize) -> String {
    match category {
        Some(name) => {
            let slug: String = name
                .to_lowercase()
                .chars()
                .map(|c| if c.is_alphanumeric() { c } else { '_' })
                .collect();
            let slug = slug
                .split('_')
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("_");
            format!("mixesdb_{}", slug)
        }
        None => format!("mixesdb_{}_categories", count),
    }
}
