use crate::config::Config;
use crate::corpus::{Corpus, CorpusBuilder};
use crate::market;
use crate::models::{ListingRecord, PriceTables};
use crate::report::pdf::render_outcome;
use crate::report::writer::{conclusion, has_report, report_or_error};
use crate::report::{PdfRenderer, ReportDocument, ReportWriter, TogetherClient};
use crate::router::{classify_query, parse_selection, QueryKind, Selection};
use crate::scrapers::{
    ListingExtractor, ListingSearch, PageFetcher, SearchQuery, StatisticsExtractor, UneguiSearch,
};
use anyhow::{Context, Result};
use dialoguer::Input;
use std::path::PathBuf;
use tracing::{info, warn};

/// Extract listings and the price bulletin, then persist the corpus pair
pub async fn build_index(config: &Config, urls: &[String], pdf_url: Option<&str>) -> Result<()> {
    let fetcher = PageFetcher::new(config.fetch_timeout)?;
    let builder = CorpusBuilder::new(
        ListingExtractor::new(fetcher.clone()),
        StatisticsExtractor::new(fetcher, config.statistics_pdf_url.clone()),
    );

    let build = builder.build(urls, pdf_url).await;

    for (i, listing) in build.listings.iter().enumerate() {
        print_listing(i + 1, listing);
    }
    if let Some(error) = &build.statistics_error {
        println!("PDF extraction error: {}", error);
    }
    println!(
        "Price rows: {} new, {} old",
        build.tables.new.rows.len(),
        build.tables.old.rows.len()
    );

    build
        .corpus
        .save(&config.index_path, &config.data_path)
        .context("Failed to persist corpus")?;

    info!("💾 Build complete: {} entries", build.corpus.len());
    Ok(())
}

/// Brute-force lookup against the persisted corpus
pub fn search(config: &Config, query: &str, k: usize) -> Result<()> {
    let corpus = Corpus::load(&config.index_path, &config.data_path)
        .context("Failed to load corpus, run build-index first")?;

    info!("Searching {} corpus entries", corpus.len());
    let hits = corpus.search(query, k);
    if hits.is_empty() {
        println!("Corpus is empty.");
    }
    for hit in hits {
        println!("[{}] distance {:.4}", hit.position, hit.distance);
        println!("   {}", hit.text.replace('\n', "\n   "));
        println!();
    }
    Ok(())
}

/// Interactive listing analysis: URL or general query, market context, LLM report
pub async fn analyze(config: &Config, translate: bool, pdf: Option<PathBuf>) -> Result<()> {
    let api_key = config
        .together_api_key
        .clone()
        .context("TOGETHER_API_KEY must be set")?;
    let client = TogetherClient::new(api_key, &config.together_base_url, &config.together_model)?;
    info!("Report writer using model {}", client.model());
    let writer = ReportWriter::new(client);

    let fetcher = PageFetcher::new(config.fetch_timeout)?;
    let listings = ListingExtractor::new(fetcher.clone());
    let statistics = StatisticsExtractor::new(fetcher.clone(), config.statistics_pdf_url.clone());
    let search = UneguiSearch::new(fetcher, config.listing_search_url.clone());

    println!("Welcome to the Real Estate Assistant!");
    let query: String = Input::new()
        .with_prompt("Please enter your query (a property URL or a description like 'apartments in Khan-Uul')")
        .interact_text()?;

    let url = match classify_query(&query) {
        QueryKind::Listing(url) => {
            println!("\n--- Listing analysis ---");
            url
        }
        QueryKind::General(location) => {
            println!("\n--- General search ---");
            match pick_candidate(&search, location).await? {
                Some(url) => url,
                None => return Ok(()),
            }
        }
    };

    let listing = listings.extract(&url).await;
    if let Some(error) = &listing.error {
        println!("Error during extraction: {}", error);
        return Ok(());
    }
    print_listing(1, &listing);

    let tables = match statistics.extract_price_tables(None).await {
        Ok(tables) => tables,
        Err(e) => {
            warn!(error = %e, "Continuing without market data");
            PriceTables::default()
        }
    };
    let summary = market::summarize(&tables);

    let result = writer.generate_report(&listing, Some(&summary), translate).await;
    let report_ok = has_report(&result);
    let report = report_or_error(result);

    println!("\n========== FINAL REPORT ==========");
    println!("{}", report);
    println!("==================================");

    if let Some(path) = pdf {
        if report_ok {
            let document = report_document(&listing, &report, tables);
            let outcome = PdfRenderer::render(&document, &path).await;
            println!("{}", render_outcome(&outcome));
        } else {
            println!("Skipping PDF: no report was generated.");
        }
    }

    Ok(())
}

/// Search, list candidates and let the operator choose one; `None` means stop
async fn pick_candidate(search: &dyn ListingSearch, location: String) -> Result<Option<String>> {
    let property_type: String = Input::new()
        .with_prompt("Enter the property type (e.g., apartment, house)")
        .interact_text()?;

    let query = SearchQuery { location, property_type };
    let candidates = match search.search(&query).await {
        Ok(candidates) => candidates,
        Err(e) => {
            println!("Search on {} failed: {:#}", search.source_name(), e);
            return Ok(None);
        }
    };

    if candidates.is_empty() {
        println!("No listings found matching your query.");
        return Ok(None);
    }

    println!("\nSearch Results:");
    for (idx, candidate) in candidates.iter().enumerate() {
        println!("{}. {} - {} ({})", idx + 1, candidate.title, candidate.price, candidate.url);
    }

    let answer: String = Input::new()
        .with_prompt("Enter the number of the listing to analyze (or 'q' to quit)")
        .interact_text()?;

    match parse_selection(&answer, candidates.len()) {
        Selection::Pick(idx) => Ok(Some(candidates[idx].url.clone())),
        Selection::Cancel => {
            println!("Exiting.");
            Ok(None)
        }
        Selection::Invalid => {
            println!("Invalid selection. Exiting.");
            Ok(None)
        }
    }
}

fn report_document(listing: &ListingRecord, report: &str, tables: PriceTables) -> ReportDocument {
    ReportDocument {
        title: listing.title.clone(),
        price: listing.price.clone(),
        area: listing.area.clone(),
        location: listing.location.clone(),
        market_analysis: report.to_string(),
        conclusion: conclusion(report),
        market_data: Some(tables),
    }
}

fn print_listing(n: usize, listing: &ListingRecord) {
    println!("{}. {} ({})", n, listing.title, listing.price);
    println!("   Location: {}", listing.location);
    println!("   Area: {}, Rooms: {}", listing.area, listing.rooms);
    println!("   URL: {}", listing.url);
    if let Some(error) = &listing.error {
        println!("   Error: {}", error);
    }
    println!();
}
