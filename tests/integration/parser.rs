use chrono::{TimeZone, Utc};
use kickscout_scrapers::ListingParser;

use crate::{FIRST_PAGE, LAST_PAGE, NO_RESULTS, SINGLE_RESULT};

#[test]
fn test_no_results_page() {
    let parser = ListingParser::new().unwrap();
    let page = parser.parse_page(NO_RESULTS, "ZZ0000-000", Utc::now());

    assert_eq!(page.entries_seen, 0);
    assert!(page.records.is_empty());
    assert!(!page.has_next);
}

#[test]
fn test_single_result_page() {
    let parser = ListingParser::new().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 11, 1, 8, 30, 0).unwrap();
    let page = parser.parse_page(SINGLE_RESULT, "FQ8080-133", now);

    assert_eq!(page.entries_seen, 1);
    assert_eq!(page.records.len(), 1);
    assert!(!page.has_next);

    let record = &page.records[0];
    assert_eq!(
        record.title,
        "Air Jordan 1 Retro High OG Black Toe Reimagined FQ8080-133 Size 10.5"
    );
    assert_eq!(record.price, 185.5);
    assert_eq!(record.sale_date, Some(Utc.with_ymd_and_hms(2024, 10, 29, 8, 30, 0).unwrap()));
    assert_eq!(record.source_url, "https://www.ebay.com/itm/387712340001");
}

#[test]
fn test_first_page_filters_and_cleans() {
    let parser = ListingParser::new().unwrap();
    let page = parser.parse_page(FIRST_PAGE, "DD1391-100", Utc::now());

    assert_eq!(page.entries_seen, 3);
    assert!(page.has_next);

    // the Jordan 4 entry does not mention the style code
    let titles: Vec<&str> = page.records.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "Nike Dunk Low Retro White Black Panda DD1391-100 Men's Size 10",
            "Nike Dunk Low Panda dd1391 100 size 9.5 NEW DS",
        ]
    );

    // price ranges keep the first amount
    let prices: Vec<f64> = page.records.iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![105.0, 95.0]);

    assert_eq!(
        page.records[0].sale_date,
        Some(Utc.with_ymd_and_hms(2024, 10, 14, 0, 0, 0).unwrap())
    );
}

#[test]
fn test_last_page_has_disabled_next() {
    let parser = ListingParser::new().unwrap();
    let page = parser.parse_page(LAST_PAGE, "DD1391-100", Utc::now());

    assert_eq!(page.entries_seen, 2);
    assert!(!page.has_next);
    assert_eq!(page.records[0].price, 1020.0);
    assert_eq!(page.records[1].price, 0.0);
    assert!(!page.records[1].has_valid_price());
    assert_eq!(page.records[1].sale_date, None);
}
