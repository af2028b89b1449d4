use crate::models::{ListingCandidate, SENTINEL};
use crate::scrapers::fetcher::PageFetcher;
use crate::scrapers::listing::collapse_whitespace;
use crate::scrapers::traits::ListingSearch;
use crate::scrapers::types::SearchQuery;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};

/// Search-page scraper for unegui.mn
pub struct UneguiSearch {
    fetcher: PageFetcher,
    search_url: String,
}

impl UneguiSearch {
    pub fn new(fetcher: PageFetcher, search_url: impl Into<String>) -> Self {
        Self {
            fetcher,
            search_url: search_url.into(),
        }
    }
}

#[async_trait]
impl ListingSearch for UneguiSearch {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ListingCandidate>> {
        info!("Searching for {} in {}", query.property_type, query.location);

        let url = Url::parse_with_params(&self.search_url, &[("q", query.terms())])
            .with_context(|| format!("Invalid search URL: {}", self.search_url))?;

        let html = self.fetcher.fetch(url.as_str()).await?;
        let candidates = parse_search_results(&url, &html);

        if candidates.is_empty() {
            warn!("No listing cards found on search page");
        } else {
            info!("Found {} candidate listings", candidates.len());
        }
        Ok(candidates)
    }

    fn source_name(&self) -> &'static str {
        "unegui.mn"
    }
}

/// Pull result cards out of a search page; links are resolved against `page_url`
pub fn parse_search_results(page_url: &Url, html: &str) -> Vec<ListingCandidate> {
    let document = Html::parse_document(html);
    let (Ok(card_selector), Ok(link_selector), Ok(price_selector)) = (
        Selector::parse(".advert"),
        Selector::parse("a.advert__content-title"),
        Selector::parse(".advert__content-price"),
    ) else {
        return Vec::new();
    };

    let mut candidates = Vec::new();
    for card in document.select(&card_selector) {
        let Some(link) = card.select(&link_selector).next() else {
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Ok(url) = page_url.join(href) else {
            debug!(href, "Skipping card with unusable link");
            continue;
        };

        let title = collapse_whitespace(&link.text().collect::<String>());
        let price = card
            .select(&price_selector)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| SENTINEL.to_string());

        candidates.push(ListingCandidate {
            title: if title.is_empty() { SENTINEL.to_string() } else { title },
            price,
            url: url.to_string(),
        });
    }

    candidates
}
