use chrono::{DateTime, Utc};
use kickscout_core::{KicksError, ListingRecord, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::parsing::{clean_price, parse_sold_date, title_matches};

const TITLE_NOISE: &[&str] = &["New Listing", "NEW LISTING"];

/// What one result page yielded.
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// Listings whose title matched the identifier, in page order.
    pub records: Vec<ListingRecord>,
    /// Result entries on the page before title matching.
    pub entries_seen: usize,
    /// Whether an enabled next-page control was present.
    pub has_next: bool,
}

/// Parses sold-listing result pages. Selectors are compiled once; parsing
/// itself never fails and missing fields fall back to defaults.
#[derive(Debug)]
pub struct ListingParser {
    item: Selector,
    title: Selector,
    price: Selector,
    link: Selector,
    next_page: Selector,
}

impl ListingParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            item: Self::parse_selector("li.s-item, div.s-item")?,
            title: Self::parse_selector(".s-item__title")?,
            price: Self::parse_selector(".s-item__price")?,
            link: Self::parse_selector("a.s-item__link")?,
            next_page: Self::parse_selector(
                "a.pagination__next, button.pagination__next, a[aria-label=\"Next page\"]",
            )?,
        })
    }

    fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector).map_err(|e| KicksError::Config(format!("bad selector {}: {}", selector, e)))
    }

    pub fn parse_page(&self, html: &str, identifier: &str, now: DateTime<Utc>) -> ParsedPage {
        let document = Html::parse_document(html);

        let mut page = ParsedPage::default();
        for item in document.select(&self.item) {
            page.entries_seen += 1;
            if let Some(record) = self.parse_item(item, identifier, now) {
                page.records.push(record);
            }
        }
        page.has_next = self.has_next_page(&document);

        debug!(
            "Parsed page: {} entries, {} matched {}, has_next: {}",
            page.entries_seen,
            page.records.len(),
            identifier,
            page.has_next
        );
        page
    }

    fn parse_item(&self, item: ElementRef, identifier: &str, now: DateTime<Utc>) -> Option<ListingRecord> {
        let title = item
            .select(&self.title)
            .next()
            .map(|el| el.text().collect::<String>())
            .map(|text| clean_title(&text))
            .filter(|title| !title.is_empty())?;

        if !title_matches(&title, identifier) {
            return None;
        }

        let price = item
            .select(&self.price)
            .next()
            .map(|el| el.text().collect::<String>())
            .map(|text| clean_price(&text))
            .unwrap_or(0.0);

        let source_url = item
            .select(&self.link)
            .next()
            .and_then(|el| el.value().attr("href"))
            .unwrap_or_default()
            .to_string();

        let entry_text = item.text().collect::<Vec<_>>().join(" ");
        let sale_date = parse_sold_date(&entry_text, now);

        Some(ListingRecord {
            title,
            price,
            sale_date,
            source_url,
        })
    }

    fn has_next_page(&self, document: &Html) -> bool {
        let Some(next) = document.select(&self.next_page).next() else {
            debug!("No next page control found");
            return false;
        };

        let element = next.value();
        let disabled = element.attr("disabled").is_some()
            || element.attr("aria-disabled") == Some("true")
            || element.classes().any(|class| class.contains("disabled"));

        if disabled {
            debug!("Found disabled next page control, no more pages");
        }
        !disabled
    }
}

fn clean_title(raw: &str) -> String {
    let mut title = raw.trim();
    for noise in TITLE_NOISE {
        if let Some(rest) = title.strip_prefix(noise) {
            title = rest.trim_start();
        }
    }
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}
