//! a3s-bing CLI - query Bing and manage its market-code table.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use a3s_bing::{
    engines::Bing,
    locale::{LocaleTraitTable, TraitStore},
    BingConfig, Engine, SearchQuery, TimeRange,
};

/// a3s-bing - Bing web search adapter CLI
#[derive(Parser)]
#[command(name = "a3s-bing")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Adapter configuration file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search Bing
    Search(SearchArgs),

    /// Rebuild the market-code table from Bing's reference page
    Traits(TraitsArgs),
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Page number (1-indexed)
    #[arg(short = 'n', long, default_value = "1")]
    page: u32,

    /// Locale tag (e.g., de-DE, fr, all)
    #[arg(short, long)]
    locale: Option<String>,

    /// Restrict results to a time range
    #[arg(short, long)]
    time_range: Option<TimeRangeArg>,

    /// Market-code table saved by `a3s-bing traits`; fetched live if omitted
    #[arg(long)]
    traits: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Parser)]
struct TraitsArgs {
    /// Write the table to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum TimeRangeArg {
    Day,
    Week,
    Month,
    Year,
}

impl From<TimeRangeArg> for TimeRange {
    fn from(arg: TimeRangeArg) -> Self {
        match arg {
            TimeRangeArg::Day => TimeRange::Day,
            TimeRangeArg::Week => TimeRange::Week,
            TimeRangeArg::Month => TimeRange::Month,
            TimeRangeArg::Year => TimeRange::Year,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Search(args) => run_search(settings, args).await,
        Commands::Traits(args) => run_traits(settings, args).await,
    }
}

fn load_settings(path: Option<&std::path::Path>) -> Result<BingConfig> {
    let Some(path) = path else {
        return Ok(BingConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    Ok(BingConfig::from_json(&json)?)
}

async fn run_traits(settings: BingConfig, args: TraitsArgs) -> Result<()> {
    let bing = Bing::http(settings)?;
    bing.refresh_traits()
        .await
        .context("Failed to refresh market codes")?;

    let table = bing.traits().snapshot();
    let json = table.to_json()?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "Wrote {} languages and {} regions to {}",
                table.languages.len(),
                table.regions.len(),
                path.display()
            );
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn run_search(settings: BingConfig, args: SearchArgs) -> Result<()> {
    let mut bing = Bing::http(settings)?;

    match &args.traits {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let table = LocaleTraitTable::from_json(&json)?;
            bing = bing.with_traits(Arc::new(TraitStore::new(table)));
        }
        None if args.locale.is_some() => {
            if let Err(e) = bing.refresh_traits().await {
                eprintln!("Warning: market codes unavailable ({}), using defaults", e);
            }
        }
        None => {}
    }

    let mut query = SearchQuery::new(&args.query).with_page(args.page);
    if let Some(locale) = args.locale {
        query = query.with_locale(locale);
    }
    if let Some(range) = args.time_range {
        query = query.with_time_range(range.into());
    }

    let page = bing.search(&query).await?;
    for failure in page.failures() {
        eprintln!("Warning: {}", failure);
    }

    match args.format {
        OutputFormat::Text => {
            let count = page
                .number_of_results
                .map(|n| format!("about {} results", n))
                .unwrap_or_else(|| "result count unknown".to_string());
            println!(
                "\nBing results for \"{}\" (page {}, {}):\n",
                args.query, args.page, count
            );

            for (i, result) in page.results().enumerate() {
                println!("{}. {}", i + 1, result.title);
                println!("   URL: {}", result.url);
                if !result.content.is_empty() {
                    let content = if result.content.chars().count() > 150 {
                        format!("{}...", result.content.chars().take(150).collect::<String>())
                    } else {
                        result.content.clone()
                    };
                    println!("   {}", content);
                }
                println!();
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&page.into_items())?);
        }
        OutputFormat::Compact => {
            for result in page.results() {
                println!("{}\t{}", result.title, result.url);
            }
        }
    }

    Ok(())
}
