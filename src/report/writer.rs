use crate::error::GenerationError;
use crate::models::{ListingRecord, MarketSummary, SENTINEL};
use crate::report::llm::CompletionClient;
use std::fmt;
use tracing::{info, warn};

const REPORT_MAX_TOKENS: u32 = 1024;
const REPORT_TEMPERATURE: f32 = 0.2;
const TRANSLATION_TEMPERATURE: f32 = 0.3;

/// Deal analysis narrative writer backed by an LLM
pub struct ReportWriter<C> {
    client: C,
}

impl<C: CompletionClient> ReportWriter<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Generate the analysis, optionally translated to Mongolian
    pub async fn generate_report(
        &self,
        listing: &ListingRecord,
        market: Option<&MarketSummary>,
        translate: bool,
    ) -> Result<String, GenerationError> {
        let fallback;
        let market = match market {
            Some(summary) => summary,
            None => {
                fallback = empty_market();
                &fallback
            }
        };

        info!("Generating deal analysis for {}", listing.url);
        let report = self
            .client
            .complete(&analysis_prompt(listing, market), REPORT_MAX_TOKENS, REPORT_TEMPERATURE)
            .await?;

        if translate {
            info!("Translating report to Mongolian...");
            let prompt = translation_prompt(&report);
            return self
                .client
                .complete(&prompt, REPORT_MAX_TOKENS, TRANSLATION_TEMPERATURE)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Translation failed, keeping the English report");
                    GenerationError::Translation { report, reason: e.to_string() }
                });
        }
        Ok(report)
    }
}

/// Operator-facing text standing in for a report that could not be generated
pub fn report_or_error(result: Result<String, GenerationError>) -> String {
    match result {
        Ok(report) => report,
        Err(GenerationError::Translation { report, reason }) => {
            format!("{report}\n\nError: Could not translate to Mongolian. Details: {reason}")
        }
        Err(e) => format!("Error: Could not generate report using LLM. Details: {e}"),
    }
}

/// Whether the outcome still carries a usable analysis
pub fn has_report(result: &Result<String, GenerationError>) -> bool {
    matches!(result, Ok(_) | Err(GenerationError::Translation { .. }))
}

fn empty_market() -> MarketSummary {
    MarketSummary {
        listings_analyzed: 0,
        average_price: SENTINEL.to_string(),
        average_value: None,
        price_range: SENTINEL.to_string(),
        key_insights: vec!["No market data available.".to_string()],
    }
}

pub fn analysis_prompt(listing: &ListingRecord, market: &MarketSummary) -> String {
    let insights = market
        .key_insights
        .iter()
        .map(|insight| format!("- {insight}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are a professional real estate analyst.

Your task is to analyze whether the following apartment listing is a good deal, using step-by-step reasoning based on the listing and the market data.

Use the following format:
1. Summarize the listing in 1-2 sentences.
2. Compare the listing's price and area to the market average.
3. Analyze the district/location and any other notable features.
4. Based on your reasoning, give a verdict: **"Good deal"**, **"Average deal"**, or **"Overpriced"** and explain why.

Be specific and base your reasoning on numbers where possible.

---

**Apartment Listing Details:**
URL: {url}
Title: {title}
Price: {price}
Location: {location}
Area: {area}
Rooms: {rooms}
Description: {description}

**Market Context:**
Listings Analyzed: {analyzed}
Average Price: {average}
Price Range: {range}
Key Insights:
{insights}

---

Format:
========== MARKET ANALYSIS REPORT ==========

### Step-by-Step Reasoning
1. [Summary of the apartment.]
2. [Price vs market.]
3. [Location & other considerations.]
4. [Final verdict with justification.]

============================================
"#,
        url = listing.url,
        title = listing.title,
        price = listing.price,
        location = listing.location,
        area = listing.area,
        rooms = listing.rooms,
        description = listing.description,
        analyzed = market.listings_analyzed,
        average = market.average_price,
        range = market.price_range,
        insights = insights,
    )
}

pub fn translation_prompt(report: &str) -> String {
    format!(
        r#"Translate the following real estate market analysis report into Mongolian:

---

{report}

---

Only return the translated text. Do not include explanations or extra formatting.
"#
    )
}

/// Final call of a deal analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    GoodDeal,
    AverageDeal,
    Overpriced,
}

impl Verdict {
    /// The verdict mentioned last in the narrative, if any
    pub fn detect(report: &str) -> Option<Self> {
        let lowered = report.to_lowercase();
        [
            (Verdict::GoodDeal, "good deal"),
            (Verdict::AverageDeal, "average deal"),
            (Verdict::Overpriced, "overpriced"),
        ]
        .into_iter()
        .filter_map(|(verdict, phrase)| lowered.rfind(phrase).map(|pos| (pos, verdict)))
        .max_by_key(|(pos, _)| *pos)
        .map(|(_, verdict)| verdict)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::GoodDeal => write!(f, "Good deal"),
            Verdict::AverageDeal => write!(f, "Average deal"),
            Verdict::Overpriced => write!(f, "Overpriced"),
        }
    }
}

/// Conclusion line for the PDF: the last line naming a verdict
pub fn conclusion(report: &str) -> String {
    let verdict = Verdict::detect(report);
    report
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| verdict.is_some() && Verdict::detect(line) == verdict)
        .map(|line| line.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.').trim().to_string())
        .unwrap_or_else(|| SENTINEL.to_string())
}
