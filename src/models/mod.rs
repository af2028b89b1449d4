use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used for any listing field no extraction strategy could find
pub const SENTINEL: &str = "N/A";

/// Core listing data model, one per fetched listing page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingRecord {
    pub url: String,
    pub title: String,
    pub price: String,
    pub location: String,
    pub area: String,
    pub rooms: String,
    pub description: String,
    /// Set only when the page could not be fetched
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl ListingRecord {
    /// Record for a page that could not be retrieved; every field is the sentinel
    pub fn unavailable(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: SENTINEL.to_string(),
            price: SENTINEL.to_string(),
            location: SENTINEL.to_string(),
            area: SENTINEL.to_string(),
            rooms: SENTINEL.to_string(),
            description: SENTINEL.to_string(),
            error: Some(error.into()),
            fetched_at: Utc::now(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    /// The six content fields in corpus order
    pub fn content_fields(&self) -> [&str; 6] {
        [
            &self.title,
            &self.price,
            &self.location,
            &self.area,
            &self.rooms,
            &self.description,
        ]
    }
}

/// Which section of the statistics bulletin a row came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    New,
    Old,
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::New => write!(f, "new"),
            TableKind::Old => write!(f, "old"),
        }
    }
}

/// One district line of an apartment price table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRow {
    pub district: String,
    /// Latest reporting-period price (million MNT per m²), the primary column
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceTable {
    pub kind: TableKind,
    pub rows: Vec<PriceRow>,
}

impl PriceTable {
    pub fn new(kind: TableKind) -> Self {
        Self { kind, rows: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Plain-text dump of the table: a header line, then one indexed line per row
    pub fn to_text(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(format!("{} apartment prices: District Price Change Change%", self.kind));
        for (idx, row) in self.rows.iter().enumerate() {
            lines.push(format!(
                "{} {} {:.2} {:.2} {:.2}",
                idx, row.district, row.price, row.change, row.change_pct
            ));
        }
        lines.join("\n")
    }
}

/// Both tables extracted from one statistics bulletin
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceTables {
    pub new: PriceTable,
    pub old: PriceTable,
}

impl Default for PriceTables {
    fn default() -> Self {
        Self {
            new: PriceTable::new(TableKind::New),
            old: PriceTable::new(TableKind::Old),
        }
    }
}

impl PriceTables {
    /// New rows first, then old rows, each tagged with its table
    pub fn tagged_rows(&self) -> impl Iterator<Item = (TableKind, &PriceRow)> {
        self.new
            .rows
            .iter()
            .map(|row| (TableKind::New, row))
            .chain(self.old.rows.iter().map(|row| (TableKind::Old, row)))
    }
}

/// Descriptive aggregate over the price tables, consumed by the report prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSummary {
    pub listings_analyzed: usize,
    pub average_price: String,
    pub average_value: Option<f64>,
    pub price_range: String,
    pub key_insights: Vec<String>,
}

/// A search-result card from a listing site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingCandidate {
    pub title: String,
    pub price: String,
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_record_is_all_sentinel() {
        let record = ListingRecord::unavailable("bad://url", "boom");
        assert!(record.is_degraded());
        assert!(record.content_fields().iter().all(|f| *f == SENTINEL));
        assert_eq!(record.error.as_deref(), Some("boom"));
    }

    #[test]
    fn table_dump_lists_every_row() {
        let table = PriceTable {
            kind: TableKind::Old,
            rows: vec![
                PriceRow { district: "Bayangol".into(), price: 4.41, change: 0.64, change_pct: 17.0 },
                PriceRow { district: "Sukhbaatar".into(), price: 5.2, change: -0.1, change_pct: -1.9 },
            ],
        };
        let text = table.to_text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("old apartment prices"));
        assert_eq!(lines[1], "0 Bayangol 4.41 0.64 17.00");
        assert_eq!(lines[2], "1 Sukhbaatar 5.20 -0.10 -1.90");
    }

    #[test]
    fn tagged_rows_keep_new_before_old() {
        let tables = PriceTables {
            new: PriceTable {
                kind: TableKind::New,
                rows: vec![PriceRow { district: "A".into(), price: 1.0, change: 0.0, change_pct: 0.0 }],
            },
            old: PriceTable {
                kind: TableKind::Old,
                rows: vec![PriceRow { district: "B".into(), price: 2.0, change: 0.0, change_pct: 0.0 }],
            },
        };
        let kinds: Vec<TableKind> = tables.tagged_rows().map(|(k, _)| k).collect();
        assert_eq!(kinds, vec![TableKind::New, TableKind::Old]);
    }
}
