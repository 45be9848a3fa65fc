use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{KicksError, ListingSet, PriceData, Result};

/// Sales within this many days of the reference time count as recent.
pub const RECENT_WINDOW_DAYS: i64 = 90;

/// Summary statistics over one listing set.
///
/// Price statistics only consider listings with a positive price; counts
/// include every listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesMetrics {
    pub average_price: Option<f64>,
    /// Price of the first valid listing in scrape order, which follows the
    /// marketplace's result ranking and not the sale date.
    pub last_sale_price: Option<f64>,
    pub highest_price: Option<f64>,
    pub lowest_price: Option<f64>,
    pub total_sales: u32,
    pub last_90_days_sales: u32,
}

impl From<SalesMetrics> for PriceData {
    fn from(metrics: SalesMetrics) -> Self {
        PriceData {
            avg_price: metrics.average_price,
            lowest_price: metrics.lowest_price,
            highest_price: metrics.highest_price,
            last_sale_price: metrics.last_sale_price,
            total_sales: Some(metrics.total_sales),
            last_90_days_sales: Some(metrics.last_90_days_sales),
            ..PriceData::default()
        }
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reduce a listing set to summary statistics relative to `now`.
///
/// An empty set is [`KicksError::NoData`], never a zero-filled summary.
pub fn calculate_metrics(listings: &ListingSet, now: DateTime<Utc>) -> Result<SalesMetrics> {
    if listings.is_empty() {
        return Err(KicksError::NoData(format!(
            "no listings for {}",
            listings.identifier
        )));
    }

    let prices: Vec<f64> = listings
        .iter()
        .filter(|record| record.has_valid_price())
        .map(|record| record.price)
        .collect();

    let average_price = if prices.is_empty() {
        None
    } else {
        Some(round_cents(prices.iter().sum::<f64>() / prices.len() as f64))
    };

    let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
    let recent = listings
        .iter()
        .filter(|record| record.sale_date.is_some_and(|date| date >= cutoff))
        .count();

    Ok(SalesMetrics {
        average_price,
        last_sale_price: prices.first().copied().map(round_cents),
        highest_price: prices.iter().copied().reduce(f64::max).map(round_cents),
        lowest_price: prices.iter().copied().reduce(f64::min).map(round_cents),
        total_sales: listings.len() as u32,
        last_90_days_sales: recent as u32,
    })
}
