pub mod fetcher;
pub mod listing;
pub mod search;
pub mod statistics;
pub mod traits;
pub mod types;

pub use fetcher::PageFetcher;
pub use listing::ListingExtractor;
pub use search::UneguiSearch;
pub use statistics::StatisticsExtractor;
pub use traits::ListingSearch;
pub use types::SearchQuery;
