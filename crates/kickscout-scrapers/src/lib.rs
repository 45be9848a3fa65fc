pub mod aggregator;
pub mod config;
pub mod crawler;
pub mod ebay;
pub mod goat;
pub mod parser;
pub mod parsing;
pub mod retry;
pub mod stockx;

use async_trait::async_trait;
use kickscout_core::{Result, SourceKind, SourceResult};

pub use aggregator::Aggregator;
pub use config::{BridgeConfig, Category, CrawlConfig, ItemCondition, ResaleIndexConfig, RetryPolicy};
pub use crawler::{crawl, CrawlReport, StopReason};
pub use ebay::{EbayScraper, HttpPageFetcher};
pub use goat::GoatBridge;
pub use parser::{ListingParser, ParsedPage};
pub use stockx::StockXClient;

/// One page request against the auction search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub identifier: String,
    pub page: u32,
}

impl SearchQuery {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            page: 1,
        }
    }

    pub fn next_page(&mut self) {
        self.page += 1;
    }
}

/// Fetches the raw markup of one result page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<String>;
}

/// A provider of price evidence for an identifier.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Query the provider. "Nothing found" is an `Unavailable` snapshot;
    /// `Err` is reserved for the provider itself failing.
    async fn fetch(&self, identifier: &str) -> Result<SourceResult>;
}
