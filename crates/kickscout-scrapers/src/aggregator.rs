use std::sync::Arc;

use chrono::Utc;
use kickscout_core::{reconcile, Result, SearchReport, SourceResult};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{BridgeConfig, CrawlConfig, EbayScraper, GoatBridge, PriceSource, ResaleIndexConfig, StockXClient};

/// Queries every price source for an identifier and reconciles the results.
pub struct Aggregator {
    resale_index: Arc<dyn PriceSource>,
    auction: Arc<dyn PriceSource>,
    marketplace: Arc<dyn PriceSource>,
}

impl Aggregator {
    pub fn new(
        resale_index: Arc<dyn PriceSource>,
        auction: Arc<dyn PriceSource>,
        marketplace: Arc<dyn PriceSource>,
    ) -> Self {
        Self {
            resale_index,
            auction,
            marketplace,
        }
    }

    /// Build the live sources from configuration. `cancel` stops in-flight
    /// auction crawls at the next page and cuts retry backoff short.
    pub fn from_config(
        resale_index: ResaleIndexConfig,
        crawl: CrawlConfig,
        bridge: BridgeConfig,
        cancel: CancellationToken,
    ) -> Result<Self> {
        Ok(Self::new(
            Arc::new(StockXClient::new(resale_index)?.with_cancellation(cancel.clone())),
            Arc::new(EbayScraper::cancellable(crawl, cancel)?),
            Arc::new(GoatBridge::new(bridge)),
        ))
    }

    /// Search all sources concurrently. Never fails: a failing source shows
    /// up as an unavailable snapshot carrying the error message. The
    /// identifier reaches every source exactly as given.
    pub async fn search(&self, identifier: &str) -> SearchReport {
        info!("Searching all sources for {}", identifier);

        let (resale_index, auction, marketplace) = futures::join!(
            fetch_isolated(self.resale_index.as_ref(), identifier),
            fetch_isolated(self.auction.as_ref(), identifier),
            fetch_isolated(self.marketplace.as_ref(), identifier),
        );

        let summary = reconcile(&resale_index.snapshot, &auction.snapshot, &marketplace.snapshot);
        if summary.is_empty() {
            warn!("No usable price data for {}", identifier);
        }

        SearchReport {
            identifier: identifier.to_string(),
            searched_at: Utc::now(),
            resale_index: resale_index.snapshot,
            auction: auction.snapshot,
            marketplace: marketplace.snapshot,
            summary,
            listings: auction.listings,
        }
    }

    /// Search identifiers one after another, stopping early once `cancel`
    /// fires. Blank identifiers are skipped.
    pub async fn search_many(&self, identifiers: &[String], cancel: &CancellationToken) -> Vec<SearchReport> {
        let mut reports = Vec::new();
        for (i, identifier) in identifiers.iter().enumerate() {
            if cancel.is_cancelled() {
                info!("Batch cancelled after {} of {} identifiers", i, identifiers.len());
                break;
            }
            if identifier.trim().is_empty() {
                continue;
            }
            info!("Batch item {} of {}: {}", i + 1, identifiers.len(), identifier);
            reports.push(self.search(identifier).await);
        }
        reports
    }
}

async fn fetch_isolated(source: &dyn PriceSource, identifier: &str) -> SourceResult {
    match source.fetch(identifier).await {
        Ok(result) => result,
        Err(e) => {
            warn!("{} search failed for {}: {}", source.kind(), identifier, e);
            SourceResult::unavailable(format!("Error searching {}: {}", source.kind(), e))
        }
    }
}
