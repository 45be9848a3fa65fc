use tracing::debug;

use crate::{metrics::round_cents, SourceSnapshot, UnifiedSummary};

/// Zero or negative prices from providers mean "unknown".
fn positive(price: Option<f64>) -> Option<f64> {
    price.filter(|p| *p > 0.0)
}

/// Merge the three provider snapshots into one summary.
///
/// Rules, in order:
/// 1. name, brand, retail and average price come from the resale index.
/// 2. The auction average fills a missing average, or is blended with the
///    resale-index average as a plain two-source mean.
/// 3. Price extremes start from the auction listings and are widened by the
///    marketplace's reported price.
/// 4. Sales counts add up across every source that reports one.
/// 5. If the average is still unknown, the marketplace price stands in.
pub fn reconcile(
    resale_index: &SourceSnapshot,
    auction: &SourceSnapshot,
    marketplace: &SourceSnapshot,
) -> UnifiedSummary {
    let mut summary = UnifiedSummary::default();

    if let Some(data) = resale_index.data() {
        summary.name = data.name.clone();
        summary.brand = data.brand.clone();
        summary.retail_price = positive(data.retail_price);
        summary.avg_price = positive(data.avg_price);
    }

    if let Some(data) = auction.data() {
        if let Some(auction_avg) = positive(data.avg_price) {
            summary.avg_price = Some(match summary.avg_price {
                Some(index_avg) => {
                    debug!("Blending average prices {} and {}", index_avg, auction_avg);
                    round_cents((index_avg + auction_avg) / 2.0)
                }
                None => auction_avg,
            });
        }
        summary.highest_price = positive(data.highest_price);
        summary.lowest_price = positive(data.lowest_price);
    }

    let marketplace_price = marketplace.data().and_then(|data| positive(data.lowest_price));
    if let Some(price) = marketplace_price {
        summary.highest_price = Some(summary.highest_price.map_or(price, |high| high.max(price)));
        summary.lowest_price = Some(summary.lowest_price.map_or(price, |low| low.min(price)));
    }

    summary.total_sales = [resale_index, auction, marketplace]
        .iter()
        .filter_map(|snapshot| snapshot.data().and_then(|data| data.total_sales))
        .reduce(|total, count| total + count);

    if summary.avg_price.is_none() {
        if let Some(price) = marketplace_price {
            debug!("Falling back to marketplace price {} as average", price);
            summary.avg_price = Some(price);
        }
    }

    summary
}
