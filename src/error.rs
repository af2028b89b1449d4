use thiserror::Error;

/// Network failure, timeout or non-2xx status for a single GET
#[derive(Debug, Clone, Error)]
#[error("Could not retrieve content from {url}: {reason}")]
pub struct FetchError {
    pub url: String,
    pub reason: String,
}

impl FetchError {
    pub fn new(url: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// The statistics bulletin could not be downloaded or read
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Statistics download failed: {0}")]
    Download(#[from] FetchError),

    #[error("Statistics document unreadable: {0}")]
    Parse(String),
}

/// LLM call failed or returned nothing usable
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("LLM client is not configured: {0}")]
    Config(String),

    #[error("LLM request failed: {0}")]
    Network(String),

    #[error("LLM API error: {0}")]
    Api(String),

    #[error("LLM response could not be parsed: {0}")]
    Parse(String),

    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// The analysis succeeded but its translation did not
    #[error("Could not translate to Mongolian: {reason}")]
    Translation { report: String, reason: String },
}

/// PDF report could not be produced
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Headless Chrome is unavailable: {0}")]
    BrowserUnavailable(String),

    #[error("PDF rendering failed: {0}")]
    Render(String),
}

/// The persisted corpus pair is missing, malformed or out of sync
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Corpus I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corpus file {path} is malformed: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corpus is corrupt: {vectors} fingerprints but {texts} texts")]
    Mismatch { vectors: usize, texts: usize },

    #[error("Corpus index declares dimension {found}, expected {expected}")]
    Header { found: usize, expected: usize },

    #[error("Fingerprint {position} has dimension {found}, expected {expected}")]
    Dimension {
        position: usize,
        found: usize,
        expected: usize,
    },
}
