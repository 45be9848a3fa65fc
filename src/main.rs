use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use kickscout_core::{write_listings_csv, PriceDetails, SearchReport};
use kickscout_scrapers::config::{DEFAULT_RESALE_INDEX_URL, DEFAULT_SEARCH_URL};
use kickscout_scrapers::{
    Aggregator, BridgeConfig, Category, CrawlConfig, EbayScraper, ItemCondition, ResaleIndexConfig, RetryPolicy,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise (-v, --verbose)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search every source for one style code
    #[command(about = "Search every source for one style code")]
    #[command(long_about = "Search StockX, eBay sold listings and GOAT for a style code and print the reconciled price summary.")]
    Search(SearchCommand),

    /// Search several style codes one after another
    #[command(about = "Search several style codes one after another")]
    #[command(long_about = "Search several style codes from arguments and/or a file (one per line, # comments allowed). Ctrl-C stops after the current page.")]
    Batch(BatchCommand),

    /// Export eBay sold listings to CSV
    #[command(about = "Export eBay sold listings to CSV")]
    #[command(long_about = "Crawl eBay sold listings for a style code and write them to a CSV file for external analysis.")]
    Export(ExportCommand),
}

#[derive(Args)]
struct CrawlArgs {
    /// Maximum number of result pages per crawl (-c, --max-pages)
    #[arg(short = 'c', long)]
    max_pages: Option<u32>,

    /// eBay category to search in
    #[arg(long, value_enum, default_value_t = Category::ClothingShoesAccessories)]
    category: Category,

    /// Restrict to one item condition
    #[arg(long, value_enum)]
    condition: Option<ItemCondition>,

    /// eBay search endpoint
    #[arg(long, env = "KICKSCOUT_SEARCH_URL", default_value = DEFAULT_SEARCH_URL)]
    search_url: String,

    /// Per-request timeout in seconds (-t, --timeout)
    #[arg(short = 't', long, default_value_t = 30)]
    timeout: u64,

    /// Retries for transient request failures (-r, --retries)
    #[arg(short = 'r', long, default_value_t = 3)]
    retries: u32,
}

impl CrawlArgs {
    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.retries,
            ..RetryPolicy::default()
        }
    }

    fn to_config(&self) -> CrawlConfig {
        CrawlConfig::default()
            .with_search_url(self.search_url.clone())
            .with_category(self.category)
            .with_condition(self.condition)
            .with_timeout(Duration::from_secs(self.timeout))
            .with_retry(self.retry_policy())
            .with_max_pages(self.max_pages)
    }
}

#[derive(Args)]
struct SourceArgs {
    /// StockX API key; without it StockX is skipped
    #[arg(long, env = "KICKSCOUT_RESALE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// StockX API base URL
    #[arg(long, env = "KICKSCOUT_RESALE_URL", default_value = DEFAULT_RESALE_INDEX_URL)]
    resale_url: String,

    /// Program that answers GOAT price requests
    #[arg(long, env = "KICKSCOUT_BRIDGE_PROGRAM", default_value = "node")]
    bridge_program: PathBuf,

    /// Arguments passed to the GOAT bridge program
    #[arg(long, env = "KICKSCOUT_BRIDGE_ARGS", value_delimiter = ' ', default_value = "goat_bridge.js")]
    bridge_args: Vec<String>,

    /// GOAT bridge timeout in seconds
    #[arg(long, default_value_t = 20)]
    bridge_timeout: u64,

    #[command(flatten)]
    crawl: CrawlArgs,
}

impl SourceArgs {
    fn build_aggregator(&self, cancel: CancellationToken) -> kickscout_core::Result<Aggregator> {
        let resale_index = ResaleIndexConfig {
            timeout: Duration::from_secs(self.crawl.timeout),
            retry: self.crawl.retry_policy(),
            ..ResaleIndexConfig::default()
        }
        .with_base_url(self.resale_url.clone())
        .with_api_key(self.api_key.clone());

        let bridge = BridgeConfig::new(self.bridge_program.clone(), self.bridge_args.clone())
            .with_timeout(Duration::from_secs(self.bridge_timeout));

        Aggregator::from_config(resale_index, self.crawl.to_config(), bridge, cancel)
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Print the full report as JSON (-j, --json)
    #[arg(short = 'j', long, conflicts_with = "details")]
    json: bool,

    /// Print the flat price record used by the inventory tool as JSON
    #[arg(long)]
    details: bool,

    /// Height of the sold price trend graph in lines (-g, --graph-height)
    #[arg(short = 'g', long, default_value_t = 5, value_parser = clap::value_parser!(u8).range(1..=10))]
    graph_height: u8,
}

impl OutputArgs {
    fn print(&self, report: &SearchReport) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(report)?);
        } else if self.details {
            println!("{}", serde_json::to_string_pretty(&PriceDetails::from_report(report))?);
        } else {
            println!("{}", report.format(self.graph_height));
        }
        Ok(())
    }
}

#[derive(Parser)]
struct SearchCommand {
    /// Style code to search for, e.g. DD1391-100
    identifier: String,

    #[command(flatten)]
    sources: SourceArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser)]
struct BatchCommand {
    /// Style codes to search for
    identifiers: Vec<String>,

    /// File with one style code per line (-f, --file)
    #[arg(short = 'f', long)]
    file: Option<PathBuf>,

    #[command(flatten)]
    sources: SourceArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Parser)]
struct ExportCommand {
    /// Style code to search for
    identifier: String,

    /// Output file path (-o, --output)
    #[arg(short = 'o', long, default_value = "listings.csv")]
    output: PathBuf,

    #[command(flatten)]
    crawl: CrawlArgs,
}

fn read_identifiers(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading identifiers from {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current page");
            token.cancel();
        }
    });
    cancel
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let cancel = cancel_on_ctrl_c();

    match cli.command {
        Commands::Search(cmd) => {
            let aggregator = cmd.sources.build_aggregator(cancel)?;
            let report = aggregator.search(&cmd.identifier).await;
            cmd.output.print(&report)?;
        }
        Commands::Batch(cmd) => {
            let mut identifiers = cmd.identifiers.clone();
            if let Some(path) = &cmd.file {
                identifiers.extend(read_identifiers(path)?);
            }
            if identifiers.is_empty() {
                bail!("no style codes given; pass them as arguments or with --file");
            }

            let aggregator = cmd.sources.build_aggregator(cancel.clone())?;
            let reports = aggregator.search_many(&identifiers, &cancel).await;
            info!("Searched {} of {} style codes", reports.len(), identifiers.len());

            if cmd.output.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else if cmd.output.details {
                let details: Vec<PriceDetails> = reports.iter().map(PriceDetails::from_report).collect();
                println!("{}", serde_json::to_string_pretty(&details)?);
            } else {
                for report in &reports {
                    cmd.output.print(report)?;
                }
            }
        }
        Commands::Export(cmd) => {
            let scraper = EbayScraper::cancellable(cmd.crawl.to_config(), cancel)?;
            let crawl = scraper.search_listings(&cmd.identifier).await;
            info!(
                "Crawled {} pages, {} listings ({:?})",
                crawl.pages_fetched,
                crawl.listings.len(),
                crawl.stop
            );

            let file = fs::File::create(&cmd.output)
                .with_context(|| format!("creating {}", cmd.output.display()))?;
            write_listings_csv(&crawl.listings, file)?;
            println!("Wrote {} listings to {}", crawl.listings.len(), cmd.output.display());
        }
    }

    Ok(())
}
