use chrono::{DateTime, Utc};
use rasciigraph::{plot, Config};
use serde::{Deserialize, Serialize};

use crate::ListingSet;

/// Sold prices with a known date, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTrend {
    pub prices: Vec<(f64, DateTime<Utc>)>,
}

impl PriceTrend {
    pub fn from_listings(listings: &ListingSet) -> Self {
        let mut prices: Vec<(f64, DateTime<Utc>)> = listings
            .iter()
            .filter(|record| record.has_valid_price())
            .filter_map(|record| record.sale_date.map(|date| (record.price, date)))
            .collect();
        prices.sort_by_key(|(_, date)| *date);
        Self { prices }
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn to_ascii_graph(&self, width: usize, height: usize) -> String {
        if self.prices.is_empty() {
            return "No dated sales".to_string();
        }

        let prices: Vec<f64> = self.prices.iter().map(|(price, _)| price.round()).collect();

        let config = Config::default()
            .with_width(width as u32)
            .with_height(height.max(1) as u32);
        let graph = plot(prices, config);

        graph
            .lines()
            .map(|line| format!("{:width$}", line, width = width))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
