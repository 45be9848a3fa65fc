use tabled::settings::{object::Columns, Modify, Style, Width};
use tabled::{Table, Tabled};

use crate::{SearchReport, SourceKind, SourceSnapshot, UnifiedSummary};

#[derive(Tabled)]
pub struct SourceTableRow {
    #[tabled(rename = "Source")]
    pub source: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Avg", display_with = "display_right_10")]
    pub avg: String,
    #[tabled(rename = "Low", display_with = "display_right_10")]
    pub low: String,
    #[tabled(rename = "High", display_with = "display_right_10")]
    pub high: String,
    #[tabled(rename = "Sales", display_with = "display_right_5")]
    pub sales: String,
    #[tabled(rename = "Note")]
    pub note: String,
}

#[derive(Tabled)]
pub struct SummaryTableRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value", display_with = "display_right_12")]
    pub value: String,
}

fn display_right_12(s: &str) -> String {
    format!("{:>12}", s)
}

fn display_right_10(s: &str) -> String {
    format!("{:>10}", s)
}

fn display_right_5(s: &str) -> String {
    format!("{:>5}", s)
}

/// `$1,234.50`, or `N/A` when unknown.
pub fn format_price(price: Option<f64>) -> String {
    let Some(price) = price else {
        return "N/A".to_string();
    };

    let formatted = format!("{:.2}", price.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if price < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

fn format_count(count: Option<u32>) -> String {
    count.map(|c| c.to_string()).unwrap_or_else(|| "N/A".to_string())
}

impl SourceTableRow {
    pub fn from_snapshot(kind: SourceKind, snapshot: &SourceSnapshot) -> Self {
        match snapshot {
            SourceSnapshot::Available(data) => {
                let note = match kind {
                    SourceKind::ResaleIndex => data.name.clone().unwrap_or_default(),
                    SourceKind::Auction => data
                        .last_sale_price
                        .map(|p| format!("last sale {}", format_price(Some(p))))
                        .unwrap_or_default(),
                    SourceKind::Marketplace => data.link.clone().unwrap_or_default(),
                };
                Self {
                    source: kind.to_string(),
                    status: "ok".to_string(),
                    avg: format_price(data.avg_price),
                    low: format_price(data.lowest_price),
                    high: format_price(data.highest_price),
                    sales: format_count(data.total_sales),
                    note,
                }
            }
            SourceSnapshot::Unavailable { reason } => Self {
                source: kind.to_string(),
                status: "unavailable".to_string(),
                avg: "-".to_string(),
                low: "-".to_string(),
                high: "-".to_string(),
                sales: "-".to_string(),
                note: reason.clone(),
            },
        }
    }
}

pub fn create_source_table(report: &SearchReport) -> String {
    let rows: Vec<SourceTableRow> = [SourceKind::ResaleIndex, SourceKind::Auction, SourceKind::Marketplace]
        .into_iter()
        .map(|kind| SourceTableRow::from_snapshot(kind, report.snapshot(kind)))
        .collect();

    let mut table = Table::new(&rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(0)).with(Width::truncate(8)))
        .with(Modify::new(Columns::single(6)).with(Width::wrap(50)));

    table.to_string()
}

pub fn create_summary_table(summary: &UnifiedSummary) -> String {
    let text = |value: &Option<String>| value.clone().unwrap_or_else(|| "Unknown".to_string());
    let rows = vec![
        SummaryTableRow { field: "Name".to_string(), value: text(&summary.name) },
        SummaryTableRow { field: "Brand".to_string(), value: text(&summary.brand) },
        SummaryTableRow { field: "Retail Price".to_string(), value: format_price(summary.retail_price) },
        SummaryTableRow { field: "Average Price".to_string(), value: format_price(summary.avg_price) },
        SummaryTableRow { field: "Lowest Price".to_string(), value: format_price(summary.lowest_price) },
        SummaryTableRow { field: "Highest Price".to_string(), value: format_price(summary.highest_price) },
        SummaryTableRow { field: "Total Sales".to_string(), value: format_count(summary.total_sales) },
    ];

    let mut table = Table::new(&rows);
    table
        .with(Style::modern())
        .with(Modify::new(Columns::single(1)).with(Width::wrap(60)));

    table.to_string()
}
