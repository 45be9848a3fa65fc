use serde::{Deserialize, Serialize};

use crate::SearchReport;

/// Flat price record handed to the inventory tool. Unknown text is
/// `"Unknown"` and unknown numbers are `0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceDetails {
    pub name: String,
    pub brand: String,
    pub retail_price: f64,
    pub avg_price: f64,
    pub sku: String,
    pub resale_index_price: f64,
    pub auction_price: f64,
    pub marketplace_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub total_sales: u32,
}

impl PriceDetails {
    pub fn from_report(report: &SearchReport) -> Self {
        let summary = &report.summary;
        let or_unknown = |value: &Option<String>| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .unwrap_or("Unknown")
                .to_string()
        };

        Self {
            name: or_unknown(&summary.name),
            brand: or_unknown(&summary.brand),
            retail_price: summary.retail_price.unwrap_or(0.0),
            avg_price: summary.avg_price.unwrap_or(0.0),
            sku: report.identifier.clone(),
            resale_index_price: report.resale_index.data().and_then(|d| d.avg_price).unwrap_or(0.0),
            auction_price: report.auction.data().and_then(|d| d.avg_price).unwrap_or(0.0),
            marketplace_price: report.marketplace.data().and_then(|d| d.lowest_price).unwrap_or(0.0),
            high_price: summary.highest_price.unwrap_or(0.0),
            low_price: summary.lowest_price.unwrap_or(0.0),
            total_sales: summary.total_sales.unwrap_or(0),
        }
    }
}
