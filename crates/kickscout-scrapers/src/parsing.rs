//! Text helpers shared by the listing parser: identifier matching, price
//! cleanup and sold-date extraction. None of these fail; bad input degrades
//! to a default.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static PRICE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid price regex"));

static SOLD_DAYS_AGO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bsold\s+(\d+)\s+days?\b").expect("valid sold-days regex"));

static SOLD_ON_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsold\s+([a-z]{3})[a-z]*\.?\s+(\d{1,2}),?\s+(\d{4})")
        .expect("valid sold-date regex")
});

/// Lowercase and drop everything that is not a letter or digit, so
/// `"DD1391-100"` and `"dd1391 100"` compare equal.
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Loose identifier match: the normalized title contains the normalized
/// identifier. Short identifiers will produce false positives.
pub fn title_matches(title: &str, identifier: &str) -> bool {
    normalize(title).contains(&normalize(identifier))
}

/// First numeric token of a price string, thousands separators removed.
/// `"$150.00 to $199.99"` is `150.0`; anything unparseable is `0.0`.
pub fn clean_price(text: &str) -> f64 {
    PRICE_TOKEN
        .find(text)
        .and_then(|token| token.as_str().replace(',', "").parse::<f64>().ok())
        .filter(|price| price.is_finite())
        .unwrap_or(0.0)
}

/// Sale time from a "Sold N days ago" phrase, or from an absolute
/// "Sold Oct 3, 2024" tag. The relative phrase wins when both are present.
/// An age too large to represent leaves the date unknown.
pub fn parse_sold_date(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if let Some(caps) = SOLD_DAYS_AGO.captures(text) {
        return caps[1]
            .parse::<i64>()
            .ok()
            .and_then(Duration::try_days)
            .and_then(|age| now.checked_sub_signed(age));
    }

    let caps = SOLD_ON_DATE.captures(text)?;
    let month = month_number(&caps[1])?;
    let day = caps[2].parse::<u32>().ok()?;
    let year = caps[3].parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn month_number(abbrev: &str) -> Option<u32> {
    let month = match abbrev.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
