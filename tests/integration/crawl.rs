use async_trait::async_trait;
use kickscout_core::Result;
use kickscout_scrapers::{crawl, EbayScraper, ListingParser, PageFetcher, PriceSource, SearchQuery, StopReason};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::{FixtureFetcher, FIRST_PAGE, LAST_PAGE, NO_RESULTS, SINGLE_RESULT};

/// A full page of matching entries whose next control is disabled.
fn full_last_page(entries: usize) -> String {
    let item = r#"<li class="s-item"><a class="s-item__link" href="https://www.ebay.com/itm/9"><div class="s-item__title">Nike Dunk Low Panda DD1391-100</div></a><span class="s-item__price">$110.00</span></li>"#;
    format!(
        r#"<html><body><ul class="srp-results">{}</ul><nav class="pagination"><button class="pagination__next" aria-disabled="true" disabled></button></nav></body></html>"#,
        item.repeat(entries)
    )
}

#[tokio::test]
async fn test_crawl_follows_pagination_to_last_page() {
    let fetcher = FixtureFetcher::new(&[FIRST_PAGE, LAST_PAGE]);
    let parser = ListingParser::new().unwrap();

    let report = crawl(&fetcher, &parser, "DD1391-100", None, &CancellationToken::new()).await;

    assert_eq!(report.stop, StopReason::LastPage);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(fetcher.requested(), vec![1, 2]);

    let prices: Vec<f64> = report.listings.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![105.0, 95.0, 1020.0, 0.0]);
    assert_eq!(report.listings.identifier, "DD1391-100");
}

#[tokio::test]
async fn test_crawl_stops_after_first_page_when_next_disabled_even_with_full_page() {
    let page = full_last_page(100);
    let fetcher = FixtureFetcher::new(&[page.as_str(), FIRST_PAGE]);
    let parser = ListingParser::new().unwrap();

    let report = crawl(&fetcher, &parser, "DD1391-100", None, &CancellationToken::new()).await;

    assert_eq!(report.stop, StopReason::LastPage);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.listings.len(), 100);
    assert_eq!(fetcher.requested(), vec![1]);
}

#[tokio::test]
async fn test_crawl_no_results() {
    let fetcher = FixtureFetcher::new(&[NO_RESULTS]);
    let parser = ListingParser::new().unwrap();

    let report = crawl(&fetcher, &parser, "ZZ0000-000", None, &CancellationToken::new()).await;

    assert_eq!(report.stop, StopReason::NoResults);
    assert_eq!(report.pages_fetched, 1);
    assert!(report.listings.is_empty());
}

#[tokio::test]
async fn test_crawl_keeps_pages_before_failure() {
    let fetcher = FixtureFetcher::new(&[FIRST_PAGE]);
    let parser = ListingParser::new().unwrap();

    let report = crawl(&fetcher, &parser, "DD1391-100", None, &CancellationToken::new()).await;

    assert!(matches!(report.stop, StopReason::Transport(_)));
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.listings.len(), 2);
}

#[tokio::test]
async fn test_crawl_page_limit() {
    let fetcher = FixtureFetcher::new(&[FIRST_PAGE, LAST_PAGE]);
    let parser = ListingParser::new().unwrap();

    let report = crawl(&fetcher, &parser, "DD1391-100", Some(1), &CancellationToken::new()).await;

    assert_eq!(report.stop, StopReason::PageLimit);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(report.listings.len(), 2);
}

#[tokio::test]
async fn test_crawl_cancelled_before_start() {
    let fetcher = FixtureFetcher::new(&[FIRST_PAGE, LAST_PAGE]);
    let parser = ListingParser::new().unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = crawl(&fetcher, &parser, "DD1391-100", None, &cancel).await;

    assert_eq!(report.stop, StopReason::Cancelled);
    assert_eq!(report.pages_fetched, 0);
    assert!(fetcher.requested().is_empty());
}

/// Serves the first page, then hangs on every later request.
struct StallAfterFirstPage;

#[async_trait]
impl PageFetcher for StallAfterFirstPage {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<String> {
        if query.page == 1 {
            return Ok(FIRST_PAGE.to_string());
        }
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_crawl_cancelled_while_waiting_for_second_page() {
    let parser = ListingParser::new().unwrap();
    let cancel = CancellationToken::new();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let report = tokio::time::timeout(
        Duration::from_secs(5),
        crawl(&StallAfterFirstPage, &parser, "DD1391-100", None, &cancel),
    )
    .await
    .expect("crawl should stop once cancelled");

    assert_eq!(report.stop, StopReason::Cancelled);
    assert_eq!(report.pages_fetched, 1);
    let prices: Vec<f64> = report.listings.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![105.0, 95.0]);
}

#[tokio::test]
async fn test_scraper_metrics_over_two_pages() {
    let scraper = EbayScraper::with_fetcher(FixtureFetcher::new(&[FIRST_PAGE, LAST_PAGE]), None).unwrap();

    let result = scraper.fetch("DD1391-100").await.unwrap();
    let data = result.snapshot.data().unwrap();

    // the unpriced box-only listing counts as a sale but not as a price
    assert_eq!(data.total_sales, Some(4));
    assert_eq!(data.lowest_price, Some(95.0));
    assert_eq!(data.highest_price, Some(1020.0));
    assert_eq!(data.avg_price, Some(406.67));
    assert_eq!(data.last_sale_price, Some(105.0));
    assert_eq!(result.listings.unwrap().len(), 4);
}

#[tokio::test]
async fn test_scraper_recent_sales_window() {
    let scraper = EbayScraper::with_fetcher(FixtureFetcher::new(&[SINGLE_RESULT]), None).unwrap();

    let result = scraper.fetch("FQ8080-133").await.unwrap();
    let data = result.snapshot.data().unwrap();

    assert_eq!(data.total_sales, Some(1));
    assert_eq!(data.last_90_days_sales, Some(1));
}

#[tokio::test]
async fn test_scraper_no_results_is_unavailable() {
    let scraper = EbayScraper::with_fetcher(FixtureFetcher::new(&[NO_RESULTS]), None).unwrap();

    let result = scraper.fetch("ZZ0000-000").await.unwrap();

    assert_eq!(result.snapshot.reason(), Some("No eBay data found for this SKU"));
}
