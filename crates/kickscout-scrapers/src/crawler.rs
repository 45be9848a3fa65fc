use chrono::Utc;
use kickscout_core::{KicksError, ListingSet};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{ListingParser, PageFetcher, SearchQuery};

/// Why a crawl stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The last fetched page had no enabled next-page control.
    LastPage,
    /// A page came back with no result entries at all.
    NoResults,
    /// A page request failed; earlier pages are kept.
    Transport(String),
    /// The configured page bound was reached.
    PageLimit,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub listings: ListingSet,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// Walk the result pages for `identifier` strictly in order, collecting every
/// matching listing until pagination ends, a request fails, the page bound is
/// hit or `cancel` fires. Never fails: errors end the crawl with what was
/// gathered so far.
pub async fn crawl<F>(
    fetcher: &F,
    parser: &ListingParser,
    identifier: &str,
    max_pages: Option<u32>,
    cancel: &CancellationToken,
) -> CrawlReport
where
    F: PageFetcher + ?Sized,
{
    let now = Utc::now();
    let mut listings = ListingSet::new(identifier);
    let mut query = SearchQuery::new(identifier);
    let mut pages_fetched = 0;

    let stop = loop {
        if cancel.is_cancelled() {
            break StopReason::Cancelled;
        }
        if max_pages.is_some_and(|max| pages_fetched >= max) {
            break StopReason::PageLimit;
        }

        info!("Fetching page {} for {}", query.page, identifier);
        let html = tokio::select! {
            _ = cancel.cancelled() => break StopReason::Cancelled,
            result = fetcher.fetch_page(&query) => match result {
                Ok(html) => html,
                Err(KicksError::Cancelled) => break StopReason::Cancelled,
                Err(e) => {
                    warn!("Page {} for {} failed: {}", query.page, identifier, e);
                    break StopReason::Transport(e.to_string());
                }
            },
        };
        pages_fetched += 1;

        let page = parser.parse_page(&html, identifier, now);
        info!(
            "Page {}: {} entries, {} matching listings",
            query.page,
            page.entries_seen,
            page.records.len()
        );
        listings.extend(page.records);

        if page.entries_seen == 0 {
            break StopReason::NoResults;
        }
        if !page.has_next {
            break StopReason::LastPage;
        }
        query.next_page();
    };

    info!(
        "Crawl for {} finished after {} pages with {} listings ({:?})",
        identifier,
        pages_fetched,
        listings.len(),
        stop
    );

    CrawlReport {
        listings,
        pages_fetched,
        stop,
    }
}
