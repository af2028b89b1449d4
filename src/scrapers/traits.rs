use crate::models::ListingCandidate;
use crate::scrapers::types::SearchQuery;
use anyhow::Result;
use async_trait::async_trait;

/// Common trait for listing-site search backends
/// This allows easy addition of new sources (1212.mn, remax.mn, etc) in the future
#[async_trait]
pub trait ListingSearch: Send + Sync {
    /// Candidate listings matching the query, best effort
    async fn search(&self, query: &SearchQuery) -> Result<Vec<ListingCandidate>>;

    /// Get the name of the search source
    fn source_name(&self) -> &'static str;
}
