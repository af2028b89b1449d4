use super::Corpus;
use crate::models::{ListingRecord, PriceTables};
use crate::scrapers::{ListingExtractor, StatisticsExtractor};
use tracing::{info, warn};

/// Everything one build run produced, corpus plus the structured inputs
#[derive(Debug, Clone)]
pub struct CorpusBuild {
    pub corpus: Corpus,
    pub listings: Vec<ListingRecord>,
    pub tables: PriceTables,
    pub statistics_error: Option<String>,
}

/// Runs the extractors and folds their output into a [`Corpus`]
pub struct CorpusBuilder {
    listings: ListingExtractor,
    statistics: StatisticsExtractor,
}

impl CorpusBuilder {
    pub fn new(listings: ListingExtractor, statistics: StatisticsExtractor) -> Self {
        Self { listings, statistics }
    }

    /// Extract every URL in turn, then the statistics bulletin once.
    /// Individual failures degrade locally and never abort the build.
    pub async fn build(&self, urls: &[String], pdf_url: Option<&str>) -> CorpusBuild {
        info!("Extracting {} listings...", urls.len());
        let mut listings = Vec::with_capacity(urls.len());
        for url in urls {
            listings.push(self.listings.extract(url).await);
        }
        let degraded = listings.iter().filter(|l| l.is_degraded()).count();
        if degraded > 0 {
            warn!("{}/{} listings could not be fetched", degraded, listings.len());
        }

        let (tables, statistics_error) = match self.statistics.extract_price_tables(pdf_url).await {
            Ok(tables) => (tables, None),
            Err(e) => {
                warn!(error = %e, "Price tables unavailable, building without them");
                (PriceTables::default(), Some(e.to_string()))
            }
        };

        let texts = corpus_texts(&listings, &tables);
        info!("Converting {} texts to fingerprints...", texts.len());

        CorpusBuild {
            corpus: Corpus::from_texts(texts),
            listings,
            tables,
            statistics_error,
        }
    }
}

/// One pipe-delimited line per listing
pub fn listing_text(record: &ListingRecord) -> String {
    record.content_fields().join(" | ")
}

/// Listing lines first, then the new and old table dumps when they have rows
pub fn corpus_texts(listings: &[ListingRecord], tables: &PriceTables) -> Vec<String> {
    listings
        .iter()
        .map(listing_text)
        .chain(
            [&tables.new, &tables.old]
                .into_iter()
                .filter(|table| !table.is_empty())
                .map(|table| table.to_text()),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PriceRow, PriceTable, TableKind};
    use crate::scrapers::PageFetcher;
    use crate::scrapers::listing::parse_listing;
    use std::time::Duration;

    fn tables_with_old_only() -> PriceTables {
        PriceTables {
            new: PriceTable::new(TableKind::New),
            old: PriceTable {
                kind: TableKind::Old,
                rows: vec![PriceRow { district: "B".into(), price: 3.0, change: 0.1, change_pct: 3.4 }],
            },
        }
    }

    #[test]
    fn listing_fields_are_pipe_joined_in_order() {
        let html = r#"<body><h1>Flat</h1><div class="announcement-description">Cosy</div></body>"#;
        let record = parse_listing("u", html);
        assert_eq!(listing_text(&record), "Flat | N/A | N/A | N/A | N/A | Cosy");
    }

    #[test]
    fn empty_tables_contribute_no_text() {
        let record = ListingRecord::unavailable("u", "down");
        let texts = corpus_texts(&[record], &tables_with_old_only());

        assert_eq!(texts.len(), 2);
        assert!(texts[0].starts_with("N/A | "));
        assert!(texts[1].starts_with("old apartment prices"));
    }

    #[test]
    fn listings_precede_new_then_old_table_dumps() {
        let mut tables = tables_with_old_only();
        tables.new.rows.push(PriceRow { district: "A".into(), price: 5.0, change: 0.2, change_pct: 4.1 });
        let listings = [
            ListingRecord::unavailable("u1", "down"),
            parse_listing("u2", "<body><h1>Flat</h1></body>"),
        ];

        let texts = corpus_texts(&listings, &tables);

        assert_eq!(texts.len(), 4);
        assert!(texts[0].starts_with("N/A | "));
        assert!(texts[1].starts_with("Flat | "));
        assert!(texts[2].starts_with("new apartment prices"));
        assert!(texts[3].starts_with("old apartment prices"));
    }

    #[tokio::test]
    async fn build_degrades_without_network() {
        let fetcher = PageFetcher::new(Duration::from_secs(2)).unwrap();
        let builder = CorpusBuilder::new(
            ListingExtractor::new(fetcher.clone()),
            StatisticsExtractor::new(fetcher, "http://127.0.0.1:9/bulletin.pdf"),
        );

        let urls = vec!["not a url".to_string(), "http://127.0.0.1:9/adv/2".to_string()];
        let build = builder.build(&urls, None).await;

        assert_eq!(build.listings.len(), 2);
        assert!(build.listings.iter().all(ListingRecord::is_degraded));
        assert!(build.statistics_error.is_some());
        assert_eq!(build.corpus.len(), 2);
        assert_eq!(build.corpus.texts().len(), build.corpus.fingerprints().len());
    }
}
