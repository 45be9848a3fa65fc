use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

mod details;
mod display;
mod error;
mod export;
mod graph;
mod metrics;
mod reconcile;

pub use details::PriceDetails;
pub use display::{create_source_table, create_summary_table, format_price, SourceTableRow, SummaryTableRow};
pub use error::{KicksError, Result};
pub use export::write_listings_csv;
pub use graph::PriceTrend;
pub use metrics::{calculate_metrics, round_cents, SalesMetrics, RECENT_WINDOW_DAYS};
pub use reconcile::reconcile;

/// The three providers a search consults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Resale-index REST service (StockX catalogue data)
    ResaleIndex,
    /// Auction marketplace searched for completed, sold listings (eBay)
    Auction,
    /// Secondary marketplace reached through a process bridge (GOAT)
    Marketplace,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::ResaleIndex => write!(f, "StockX"),
            SourceKind::Auction => write!(f, "eBay"),
            SourceKind::Marketplace => write!(f, "GOAT"),
        }
    }
}

/// One sold listing that matched the searched identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    /// Sale price in USD. `0.0` when the price text could not be parsed.
    pub price: f64,
    pub sale_date: Option<DateTime<Utc>>,
    pub source_url: String,
}

impl ListingRecord {
    pub fn new(title: impl Into<String>, price: f64) -> Self {
        Self {
            title: title.into(),
            price,
            sale_date: None,
            source_url: String::new(),
        }
    }

    pub fn with_sale_date(mut self, sale_date: DateTime<Utc>) -> Self {
        self.sale_date = Some(sale_date);
        self
    }

    pub fn with_source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = source_url.into();
        self
    }

    pub fn has_valid_price(&self) -> bool {
        self.price > 0.0
    }
}

/// Listings for one identifier, in the order the marketplace returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingSet {
    pub identifier: String,
    records: Vec<ListingRecord>,
}

impl ListingSet {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            records: Vec::new(),
        }
    }

    pub fn from_records(identifier: impl Into<String>, records: Vec<ListingRecord>) -> Self {
        Self {
            identifier: identifier.into(),
            records,
        }
    }

    pub fn push(&mut self, record: ListingRecord) {
        self.records.push(record);
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = ListingRecord>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[ListingRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListingRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Prices and metadata a single provider reported. Every field is optional;
/// providers fill in only what they know.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub retail_price: Option<f64>,
    pub avg_price: Option<f64>,
    pub lowest_price: Option<f64>,
    pub highest_price: Option<f64>,
    pub last_sale_price: Option<f64>,
    pub total_sales: Option<u32>,
    pub last_90_days_sales: Option<u32>,
    pub link: Option<String>,
}

/// Outcome of querying one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceSnapshot {
    Available(PriceData),
    Unavailable { reason: String },
}

impl SourceSnapshot {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        SourceSnapshot::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn data(&self) -> Option<&PriceData> {
        match self {
            SourceSnapshot::Available(data) => Some(data),
            SourceSnapshot::Unavailable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, SourceSnapshot::Available(_))
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            SourceSnapshot::Available(_) => None,
            SourceSnapshot::Unavailable { reason } => Some(reason),
        }
    }
}

/// What a price source hands back to the aggregator: its snapshot plus, for
/// listing-based sources, the raw listings behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResult {
    pub snapshot: SourceSnapshot,
    pub listings: Option<ListingSet>,
}

impl SourceResult {
    pub fn snapshot(snapshot: SourceSnapshot) -> Self {
        Self {
            snapshot,
            listings: None,
        }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::snapshot(SourceSnapshot::unavailable(reason))
    }

    pub fn with_listings(mut self, listings: ListingSet) -> Self {
        self.listings = Some(listings);
        self
    }
}

/// The reconciled record returned to the inventory tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnifiedSummary {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub retail_price: Option<f64>,
    pub avg_price: Option<f64>,
    pub lowest_price: Option<f64>,
    pub highest_price: Option<f64>,
    pub total_sales: Option<u32>,
}

impl UnifiedSummary {
    /// True when no source contributed anything.
    pub fn is_empty(&self) -> bool {
        *self == UnifiedSummary::default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchReport {
    pub identifier: String,
    pub searched_at: DateTime<Utc>,
    pub resale_index: SourceSnapshot,
    pub auction: SourceSnapshot,
    pub marketplace: SourceSnapshot,
    pub summary: UnifiedSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listings: Option<ListingSet>,
}

impl SearchReport {
    pub fn snapshot(&self, kind: SourceKind) -> &SourceSnapshot {
        match kind {
            SourceKind::ResaleIndex => &self.resale_index,
            SourceKind::Auction => &self.auction,
            SourceKind::Marketplace => &self.marketplace,
        }
    }

    /// All sources unavailable and nothing reconciled.
    pub fn has_data(&self) -> bool {
        !self.summary.is_empty()
    }

    pub fn format(&self, graph_height: u8) -> String {
        let mut result = String::new();

        result.push_str(&format!("{} {}\n", "Search results for".bold(), self.identifier.bold()));
        result.push_str(&format!("Searched at {}\n\n", self.searched_at.format("%Y-%m-%d %H:%M:%S UTC")));

        result.push_str(&format!("{}\n", "Sources".underline()));
        result.push_str(&create_source_table(self));
        result.push_str("\n\n");

        if !self.has_data() {
            result.push_str(&format!("{}\n", "No usable price data from any source".yellow()));
            return result;
        }

        result.push_str(&format!("{}\n", "Aggregated".underline()));
        result.push_str(&create_summary_table(&self.summary));
        result.push('\n');

        if let Some(listings) = &self.listings {
            let trend = PriceTrend::from_listings(listings);
            if !trend.is_empty() {
                result.push_str(&format!("\n{}\n", "Sold price trend".underline()));
                result.push_str(&trend.to_ascii_graph(40, graph_height as usize));
                result.push('\n');
            }
        }

        result
    }
}
