use crate::models::{MarketSummary, PriceTables, SENTINEL};
use tracing::debug;

const TOP_DISTRICTS: usize = 3;
const NO_DATA_INSIGHT: &str = "No apartment price data available.";

/// Aggregate both price tables into the figures the report prompt quotes
pub fn summarize(tables: &PriceTables) -> MarketSummary {
    let mut rows: Vec<_> = tables
        .tagged_rows()
        .filter(|(_, row)| row.price.is_finite())
        .collect();

    if rows.is_empty() {
        return MarketSummary {
            listings_analyzed: 0,
            average_price: SENTINEL.to_string(),
            average_value: None,
            price_range: SENTINEL.to_string(),
            key_insights: vec![NO_DATA_INSIGHT.to_string()],
        };
    }

    let count = rows.len();
    let average = rows.iter().map(|(_, row)| row.price).sum::<f64>() / count as f64;
    let min = rows.iter().map(|(_, row)| row.price).fold(f64::INFINITY, f64::min);
    let max = rows.iter().map(|(_, row)| row.price).fold(f64::NEG_INFINITY, f64::max);

    // sort_by is stable, so ties keep scan order
    rows.sort_by(|(_, a), (_, b)| b.price.total_cmp(&a.price));
    let key_insights = rows
        .iter()
        .take(TOP_DISTRICTS)
        .map(|(kind, row)| {
            format!(
                "{} has an average price of {} ({})",
                row.district,
                format_price(row.price),
                kind
            )
        })
        .collect();

    debug!(count, average, "Summarized market data");

    MarketSummary {
        listings_analyzed: count,
        average_price: format_price(average),
        average_value: Some(average),
        price_range: format!("{} - {}", format_price(min), format_price(max)),
        key_insights,
    }
}

/// Bulletin prices are in millions of MNT
fn format_price(value: f64) -> String {
    format!("MNT {value:.2}M")
}
