//! stockdoc CLI binary.
//!
//! Renders a company's fundamentals, compares several companies side by side
//! and charts daily valuation ratios.

mod integration;

use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use integration::cache_manager;
use integration::data_source::{CacheMode, Source, SourceConfig, build_source};
use std::path::PathBuf;
use std::process;
use std::time::Duration as StdDuration;
use stockdoc::data::{CachePolicy, Granularity, StoreConfig};
use stockdoc::metrics::{DateRange, PeriodKey, PeriodRange, ValuationMetric};
use stockdoc::output::{ExportFormat, Exporter};
use stockdoc::{ComparisonView, FundamentalsView, ValuationView};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stockdoc")]
#[command(about = "stockdoc: fundamentals and valuation ratios for listed companies", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Document store root URL
    #[arg(long, global = true, env = "STOCKDOC_STORE_URL", default_value = "http://localhost:9000")]
    store_url: String,

    /// Document store auth token
    #[arg(long, global = true, env = "STOCKDOC_STORE_AUTH", hide_env_values = true)]
    store_auth: Option<String>,

    /// Disable caching (always fetch fresh data)
    #[arg(long, global = true)]
    no_cache: bool,

    /// Force refresh cached data
    #[arg(long, global = true)]
    refresh: bool,

    /// Keep the cache in memory for this run only
    #[arg(long, global = true)]
    memory_cache: bool,

    /// Cache database path
    #[arg(long, global = true, env = "STOCKDOC_CACHE_PATH")]
    cache_path: Option<PathBuf>,

    /// Lifetime of cached fundamentals, in hours
    #[arg(long, global = true, default_value = "24")]
    fundamentals_ttl_hours: i64,

    /// Lifetime of cached price histories, in hours
    #[arg(long, global = true, default_value = "8")]
    prices_ttl_hours: i64,
}

impl GlobalArgs {
    fn cache_mode(&self) -> CacheMode {
        CacheMode::from_flags(self.no_cache, self.memory_cache, self.cache_path.clone())
    }

    fn policy(&self) -> CachePolicy {
        let fundamentals = chrono::Duration::hours(self.fundamentals_ttl_hours);
        CachePolicy {
            fundamentals,
            dividends: fundamentals,
            prices: chrono::Duration::hours(self.prices_ttl_hours),
            ..CachePolicy::default()
        }
    }

    fn source_config(&self) -> SourceConfig {
        let mut store = StoreConfig::new(self.store_url.clone());
        if let Some(token) = &self.store_auth {
            store = store.with_auth(token.clone());
        }
        SourceConfig {
            store,
            cache: self.cache_mode(),
            policy: self.policy(),
            force_refresh: self.refresh,
        }
    }
}

#[derive(Args)]
struct PeriodArgs {
    /// Use quarterly reports instead of annual ones
    #[arg(long)]
    quarterly: bool,

    /// First period shown, e.g. 2019 or Q3 2019
    #[arg(long)]
    from: Option<PeriodKey>,

    /// Last period shown
    #[arg(long)]
    to: Option<PeriodKey>,
}

impl PeriodArgs {
    const fn granularity(&self) -> Granularity {
        if self.quarterly {
            Granularity::Quarterly
        } else {
            Granularity::Annual
        }
    }

    const fn range(&self) -> PeriodRange {
        PeriodRange::between(self.from, self.to)
    }
}

#[derive(Args)]
struct ExportArgs {
    /// Write the tables to this file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Export format: csv, json or pretty-json
    #[arg(long, default_value = "csv")]
    format: ExportFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// List the tickers in the store
    Tickers,

    /// Fundamentals, dividends and key statistics of one company
    View {
        /// Stock ticker
        ticker: String,

        #[command(flatten)]
        periods: PeriodArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Compare fundamentals of several companies
    Compare {
        /// Stock tickers, the first one sets the period window
        #[arg(required = true, num_args = 1..)]
        tickers: Vec<String>,

        #[command(flatten)]
        periods: PeriodArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Daily valuation ratio of several companies
    Valuation {
        /// Stock tickers
        #[arg(required = true, num_args = 1..)]
        tickers: Vec<String>,

        /// Ratio: pe, pfcf, pocf, pebitda, pebt or ps
        #[arg(long, default_value = "pe")]
        metric: ValuationMetric,

        /// First day shown (YYYY-MM-DD)
        #[arg(long)]
        from: Option<chrono::NaiveDate>,

        /// Last day shown (YYYY-MM-DD)
        #[arg(long)]
        to: Option<chrono::NaiveDate>,

        /// Print every day instead of the latest values
        #[arg(long)]
        full: bool,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show cache location and size
    Cache {
        /// Delete expired entries
        #[arg(long)]
        purge: bool,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stockdoc=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        if e.is_unavailable() {
            warn!(error = %e, "Stock is not in the database");
        } else {
            error!(error = %e, "command failed");
        }
        process::exit(1);
    }
}

async fn run(cli: Cli) -> stockdoc::Result<()> {
    if let Commands::Cache { purge } = cli.command {
        return cache_status(&cli.global, purge);
    }

    let source = build_source(cli.global.source_config())?;
    match cli.command {
        Commands::Tickers => list_tickers(&source).await,
        Commands::View {
            ticker,
            periods,
            export,
        } => view(&source, &ticker.to_uppercase(), &periods, &export).await,
        Commands::Compare {
            tickers,
            periods,
            export,
        } => compare(&source, &normalize(tickers), &periods, &export).await,
        Commands::Valuation {
            tickers,
            metric,
            from,
            to,
            full,
            export,
        } => {
            let range = DateRange::between(from, to)?;
            valuation(&source, &normalize(tickers), metric, &range, full, &export).await
        }
        Commands::Cache { .. } => Ok(()),
    }
}

fn normalize(tickers: Vec<String>) -> Vec<String> {
    tickers.into_iter().map(|t| t.to_uppercase()).collect()
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(StdDuration::from_millis(100));
    pb.set_message(message);
    pb
}

async fn list_tickers(source: &Source) -> stockdoc::Result<()> {
    let pb = spinner("Fetching ticker catalog...".to_string());
    let tickers = source.ticker_list().await;
    pb.finish_and_clear();

    let tickers = tickers?;
    println!("{} tickers\n", tickers.len());
    for ticker in tickers {
        println!("  {}", ticker);
    }
    Ok(())
}

async fn view(
    source: &Source,
    ticker: &str,
    periods: &PeriodArgs,
    export: &ExportArgs,
) -> stockdoc::Result<()> {
    let pb = spinner(format!("Loading {}...", ticker));
    let loaded =
        FundamentalsView::load(source, ticker, periods.granularity(), &periods.range()).await;
    pb.finish_and_clear();

    let view = loaded?;
    print!("{}", view.render());

    if let Some(path) = &export.export {
        match export.format {
            ExportFormat::Csv => view.exports()?.export_to_file(path, export.format)?,
            _ => view.report()?.export_to_file(path, export.format)?,
        }
        info!(path = %path.display(), "exported");
    }
    Ok(())
}

async fn compare(
    source: &Source,
    tickers: &[String],
    periods: &PeriodArgs,
    export: &ExportArgs,
) -> stockdoc::Result<()> {
    let pb = spinner(format!("Loading {}...", tickers.join(", ")));
    let loaded =
        ComparisonView::load(source, tickers, periods.granularity(), &periods.range()).await;
    pb.finish_and_clear();

    let view = loaded?;
    print!("{}", view.render());

    if let Some(path) = &export.export {
        match export.format {
            ExportFormat::Csv => view.exports().export_to_file(path, export.format)?,
            _ => view.report()?.export_to_file(path, export.format)?,
        }
        info!(path = %path.display(), "exported");
    }
    Ok(())
}

async fn valuation(
    source: &Source,
    tickers: &[String],
    metric: ValuationMetric,
    range: &DateRange,
    full: bool,
    export: &ExportArgs,
) -> stockdoc::Result<()> {
    let as_of = Utc::now().date_naive();
    let pb = spinner(format!("Computing {} for {}...", metric.code(), tickers.join(", ")));
    let loaded = ValuationView::load(source, tickers, metric, range, as_of).await;
    pb.finish_and_clear();

    let view = loaded?;
    if full {
        print!("{}", view.render_table());
    }
    print!("{}", view.render());

    if let Some(path) = &export.export {
        match export.format {
            ExportFormat::Csv => view.exports().export_to_file(path, export.format)?,
            _ => view.report()?.export_to_file(path, export.format)?,
        }
        info!(path = %path.display(), "exported");
    }
    Ok(())
}

fn cache_status(global: &GlobalArgs, purge: bool) -> stockdoc::Result<()> {
    let CacheMode::Disk(path) = global.cache_mode() else {
        println!("  Cache: not persisted");
        return Ok(());
    };

    if purge {
        let cache = cache_manager::open_cache(&path)?;
        let removed = cache.purge_expired(&global.policy(), Utc::now())?;
        println!("  Purged {} expired entries", removed);
    }
    cache_manager::print_cache_info(&path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_arguments() {
        let cli = Cli::try_parse_from([
            "stockdoc", "view", "aapl", "--quarterly", "--from", "Q1 2020", "--to", "2023",
        ])
        .unwrap();
        let Commands::View { ticker, periods, export } = cli.command else {
            panic!("expected view");
        };
        assert_eq!(ticker, "aapl");
        assert_eq!(periods.granularity(), Granularity::Quarterly);
        assert_eq!(periods.from, Some(PeriodKey::Quarter { year: 2020, quarter: 1 }));
        assert_eq!(periods.to, Some(PeriodKey::Year(2023)));
        assert!(export.export.is_none());
        assert_eq!(export.format, ExportFormat::Csv);
    }

    #[test]
    fn test_valuation_arguments() {
        let cli = Cli::try_parse_from([
            "stockdoc", "valuation", "MSFT", "GOOG", "--metric", "ps", "--from", "2020-01-01",
        ])
        .unwrap();
        let Commands::Valuation { tickers, metric, from, to, .. } = cli.command else {
            panic!("expected valuation");
        };
        assert_eq!(tickers, vec!["MSFT", "GOOG"]);
        assert_eq!(metric, ValuationMetric::PS);
        assert_eq!(from, chrono::NaiveDate::from_ymd_opt(2020, 1, 1));
        assert!(to.is_none());
    }

    #[test]
    fn test_rejects_unknown_metric() {
        assert!(Cli::try_parse_from(["stockdoc", "valuation", "MSFT", "--metric", "beta"]).is_err());
    }

    #[test]
    fn test_compare_needs_a_ticker() {
        assert!(Cli::try_parse_from(["stockdoc", "compare"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "stockdoc", "tickers", "--no-cache", "--prices-ttl-hours", "1",
        ])
        .unwrap();
        assert_eq!(cli.global.cache_mode(), CacheMode::Disabled);
        assert_eq!(cli.global.policy().prices, chrono::Duration::hours(1));
        assert_eq!(cli.global.policy().ticker_list, chrono::Duration::hours(24));
    }

    #[test]
    fn test_period_range() {
        let periods = PeriodArgs {
            quarterly: false,
            from: Some(PeriodKey::Year(2019)),
            to: None,
        };
        assert_eq!(periods.range(), PeriodRange::between(Some(PeriodKey::Year(2019)), None));
        assert_eq!(stockdoc::key_label(periods.granularity()), "Year");
    }
}
