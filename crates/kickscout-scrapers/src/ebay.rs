use async_trait::async_trait;
use chrono::Utc;
use kickscout_core::{calculate_metrics, KicksError, Result, SourceKind, SourceResult, SourceSnapshot};
use reqwest::Client;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::crawler::{crawl, CrawlReport, StopReason};
use crate::{retry, CrawlConfig, ListingParser, PageFetcher, PriceSource, SearchQuery};

/// Fetches sold-listing search pages over HTTP with a bounded timeout and
/// retry on transient failures.
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: Client,
    config: CrawlConfig,
    cancel: CancellationToken,
}

impl HttpPageFetcher {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Abandon retry backoff once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<String> {
        let url = self.config.page_url(query)?;
        debug!("GET {}", url);
        retry::send_text(|| self.client.get(url.clone()), &self.config.retry, &self.cancel).await
    }
}

/// Sold-listing evidence from the auction marketplace.
#[derive(Debug)]
pub struct EbayScraper<F = HttpPageFetcher> {
    fetcher: F,
    parser: ListingParser,
    max_pages: Option<u32>,
    cancel: CancellationToken,
}

impl EbayScraper<HttpPageFetcher> {
    pub fn new(config: CrawlConfig) -> Result<Self> {
        let max_pages = config.max_pages;
        let fetcher = HttpPageFetcher::new(config)?;
        Self::with_fetcher(fetcher, max_pages)
    }

    /// Cancels both the crawl loop and any retry backoff in the fetcher.
    pub fn cancellable(config: CrawlConfig, cancel: CancellationToken) -> Result<Self> {
        let max_pages = config.max_pages;
        let fetcher = HttpPageFetcher::new(config)?.with_cancellation(cancel.clone());
        Ok(Self::with_fetcher(fetcher, max_pages)?.with_cancellation(cancel))
    }
}

impl<F: PageFetcher> EbayScraper<F> {
    pub fn with_fetcher(fetcher: F, max_pages: Option<u32>) -> Result<Self> {
        Ok(Self {
            fetcher,
            parser: ListingParser::new()?,
            max_pages,
            cancel: CancellationToken::new(),
        })
    }

    /// Crawls stop at the next page boundary once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn search_listings(&self, identifier: &str) -> CrawlReport {
        crawl(&self.fetcher, &self.parser, identifier, self.max_pages, &self.cancel).await
    }
}

#[async_trait]
impl<F: PageFetcher> PriceSource for EbayScraper<F> {
    fn kind(&self) -> SourceKind {
        SourceKind::Auction
    }

    async fn fetch(&self, identifier: &str) -> Result<SourceResult> {
        let report = self.search_listings(identifier).await;

        if report.listings.is_empty() {
            if let StopReason::Transport(reason) = &report.stop {
                return Err(KicksError::SourceUnavailable {
                    source_kind: SourceKind::Auction,
                    reason: reason.clone(),
                });
            }
            info!("No eBay listings matched {}", identifier);
            return Ok(SourceResult::unavailable("No eBay data found for this SKU").with_listings(report.listings));
        }

        if let StopReason::Transport(reason) = &report.stop {
            warn!(
                "Using {} partial eBay listings for {} after failure: {}",
                report.listings.len(),
                identifier,
                reason
            );
        }

        let metrics = calculate_metrics(&report.listings, Utc::now())?;
        Ok(SourceResult::snapshot(SourceSnapshot::Available(metrics.into())).with_listings(report.listings))
    }
}
