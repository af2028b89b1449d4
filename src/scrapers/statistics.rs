use crate::error::ExtractionError;
use crate::models::{PriceRow, PriceTable, PriceTables, TableKind};
use crate::scrapers::fetcher::PageFetcher;
use tracing::{debug, info, warn};

/// Page of the bulletin carrying the apartment price tables
const PRICE_PAGE_INDEX: usize = 1;

const NEW_HEADER: &str = "new apartment price";
const OLD_HEADER: &str = "old apartment price";
const SOURCE_FOOTER: &str = "source";

/// District label plus six numeric columns
const MIN_ROW_TOKENS: usize = 7;

/// Downloads the apartment price bulletin and parses its two price tables
pub struct StatisticsExtractor {
    fetcher: PageFetcher,
    default_url: String,
}

impl StatisticsExtractor {
    pub fn new(fetcher: PageFetcher, default_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            default_url: default_url.into(),
        }
    }

    /// Extract the new/old price tables. Missing page or markers give empty tables.
    pub async fn extract_price_tables(
        &self,
        pdf_url: Option<&str>,
    ) -> Result<PriceTables, ExtractionError> {
        let url = pdf_url.unwrap_or(&self.default_url);
        info!("Extracting apartment price data from {}", url);

        let bytes = self.fetcher.fetch_bytes(url).await?;

        // pdf-extract may panic on odd documents; a blocking task contains that
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ExtractionError::Parse(format!("PDF parser aborted: {e}")))?
        .map_err(ExtractionError::Parse)?;

        Ok(tables_from_pages(&pages))
    }
}

/// Price tables from the bulletin's price page; empty when the page is missing
pub fn tables_from_pages(pages: &[String]) -> PriceTables {
    let Some(page) = pages.get(PRICE_PAGE_INDEX) else {
        warn!(pages = pages.len(), "Bulletin has no price page");
        return PriceTables::default();
    };

    let tables = parse_price_tables(page);
    info!(
        new_rows = tables.new.rows.len(),
        old_rows = tables.old.rows.len(),
        "Parsed apartment price tables"
    );
    tables
}

/// Slice one page of bulletin text into the new and old tables
pub fn parse_price_tables(page_text: &str) -> PriceTables {
    let lines: Vec<&str> = page_text.lines().collect();

    let new_block = block_between(&lines, |l| is_marker(l, NEW_HEADER), |l| is_marker(l, OLD_HEADER));
    let old_block = block_between(&lines, |l| is_marker(l, OLD_HEADER), is_source_footer);

    PriceTables {
        new: parse_block(TableKind::New, &new_block),
        old: parse_block(TableKind::Old, &old_block),
    }
}

/// Parse one table line; rows with too few tokens or any non-numeric value are dropped
pub fn parse_price_line(line: &str) -> Option<PriceRow> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_ROW_TOKENS {
        return None;
    }

    let values = tokens[1..MIN_ROW_TOKENS]
        .iter()
        .map(|token| token.parse::<f64>())
        .collect::<Result<Vec<f64>, _>>()
        .ok()?;

    Some(PriceRow {
        district: tokens[0].to_string(),
        price: values[3],
        change: values[4],
        change_pct: values[5],
    })
}

fn parse_block(kind: TableKind, lines: &[&str]) -> PriceTable {
    let rows: Vec<PriceRow> = lines.iter().filter_map(|line| parse_price_line(line)).collect();
    debug!(%kind, candidates = lines.len(), kept = rows.len(), "Parsed price block");
    PriceTable { kind, rows }
}

/// Non-empty lines strictly between the first `start` line and the next `end` line
fn block_between<'a>(
    lines: &[&'a str],
    start: impl Fn(&str) -> bool,
    end: impl Fn(&str) -> bool,
) -> Vec<&'a str> {
    let Some(start_idx) = lines.iter().position(|line| start(*line)) else {
        return Vec::new();
    };
    let rest = &lines[start_idx + 1..];
    let Some(end_idx) = rest.iter().position(|line| end(*line)) else {
        return Vec::new();
    };

    rest[..end_idx]
        .iter()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty())
        .collect()
}

fn is_marker(line: &str, marker: &str) -> bool {
    line.to_lowercase().contains(marker)
}

fn is_source_footer(line: &str) -> bool {
    line.trim_start().to_lowercase().starts_with(SOURCE_FOOTER)
}
