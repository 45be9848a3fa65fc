use std::io::Write;

use csv::Writer;

use crate::{ListingSet, Result};

/// Write listings as CSV, one row per listing in scrape order.
pub fn write_listings_csv<W: Write>(listings: &ListingSet, output: W) -> Result<()> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(["SKU", "Title", "Price (USD)", "Sold", "Link"])?;
    for record in listings.iter() {
        let price = format!("{:.2}", record.price);
        let sold = record
            .sale_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        writer.write_record([
            listings.identifier.as_str(),
            record.title.as_str(),
            price.as_str(),
            sold.as_str(),
            record.source_url.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
