use clap::{Parser, Subcommand};
use housing_analyst::config::Config;
use housing_analyst::workflows;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "housing-analyst")]
#[command(about = "Scrape listings and apartment price statistics, then write a deal analysis")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract listings and price tables, then save the fingerprint corpus
    BuildIndex {
        /// Listing page to include (repeatable)
        #[arg(long = "url", required = true)]
        urls: Vec<String>,
        /// Statistics bulletin to use instead of the configured one
        #[arg(long)]
        pdf_url: Option<String>,
    },
    /// Look up the closest entries in the saved corpus
    Search {
        query: String,
        #[arg(short, long, default_value_t = 3)]
        k: usize,
    },
    /// Interactive analysis of one listing
    Analyze {
        /// Translate the report into Mongolian
        #[arg(long)]
        translate: bool,
        /// Also render the report to this PDF file
        #[arg(long)]
        pdf: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    info!("🏠 Housing Analyst");

    match cli.command {
        Command::BuildIndex { urls, pdf_url } => {
            workflows::build_index(&config, &urls, pdf_url.as_deref()).await
        }
        Command::Search { query, k } => workflows::search(&config, &query, k),
        Command::Analyze { translate, pdf } => workflows::analyze(&config, translate, pdf).await,
    }
}
