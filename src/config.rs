use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STATISTICS_PDF_URL: &str =
    "https://www.1212.mn/BookLibraryDownload.ashx?url=Housing_price_index.pdf&ln=Mn";
pub const DEFAULT_LISTING_SEARCH_URL: &str = "https://www.unegui.mn/l-hdlh/l-hdlh-zarna/";
pub const DEFAULT_TOGETHER_BASE_URL: &str = "https://api.together.xyz/v1";
pub const DEFAULT_TOGETHER_MODEL: &str = "meta-llama/Meta-Llama-3-70B-Instruct-Turbo";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub together_api_key: Option<String>,
    pub together_base_url: String,
    pub together_model: String,
    pub statistics_pdf_url: String,
    pub listing_search_url: String,
    pub index_path: PathBuf,
    pub data_path: PathBuf,
    pub fetch_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let timeout_secs: u64 = env::var("FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "15".to_string())
            .parse()
            .context("FETCH_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            together_api_key: env::var("TOGETHER_API_KEY").ok().filter(|k| !k.is_empty()),
            together_base_url: env::var("TOGETHER_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_TOGETHER_BASE_URL.to_string()),
            together_model: env::var("TOGETHER_MODEL")
                .unwrap_or_else(|_| DEFAULT_TOGETHER_MODEL.to_string()),
            statistics_pdf_url: env::var("STATISTICS_PDF_URL")
                .unwrap_or_else(|_| DEFAULT_STATISTICS_PDF_URL.to_string()),
            listing_search_url: env::var("LISTING_SEARCH_URL")
                .unwrap_or_else(|_| DEFAULT_LISTING_SEARCH_URL.to_string()),
            index_path: env::var("INDEX_PATH")
                .unwrap_or_else(|_| "vector_store.index".to_string())
                .into(),
            data_path: env::var("DATA_PATH")
                .unwrap_or_else(|_| "vector_data.json".to_string())
                .into(),
            fetch_timeout: Duration::from_secs(timeout_secs),
        })
    }
}
