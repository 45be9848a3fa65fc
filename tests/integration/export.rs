use kickscout_core::write_listings_csv;
use kickscout_scrapers::EbayScraper;
use std::fs;
use tempfile::tempdir;

use crate::{FixtureFetcher, FIRST_PAGE, LAST_PAGE};

#[tokio::test]
async fn test_export_crawled_listings() {
    let temp_dir = tempdir().unwrap();
    let export_path = temp_dir.path().join("listings.csv");

    let scraper = EbayScraper::with_fetcher(FixtureFetcher::new(&[FIRST_PAGE, LAST_PAGE]), None).unwrap();
    let report = scraper.search_listings("DD1391-100").await;

    let file = fs::File::create(&export_path).unwrap();
    write_listings_csv(&report.listings, file).unwrap();

    let content = fs::read_to_string(&export_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], "SKU,Title,Price (USD),Sold,Link");
    assert_eq!(
        lines[1],
        "DD1391-100,Nike Dunk Low Retro White Black Panda DD1391-100 Men's Size 10,105.00,2024-10-14,https://www.ebay.com/itm/256601234567"
    );
    assert_eq!(
        lines[4],
        "DD1391-100,Nike Dunk Low Panda DD1391-100 box only,0.00,,https://www.ebay.com/itm/256601230002"
    );
}
