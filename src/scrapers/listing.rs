use crate::models::{ListingRecord, SENTINEL};
use crate::scrapers::fetcher::PageFetcher;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

/// A single best-effort way of locating one field on a listing page
pub type Strategy = fn(&Html) -> Option<String>;

const LOCATION_KEYWORDS: &[&str] = &["байршил", "location"];
const AREA_KEYWORDS: &[&str] = &["талбай"];
const ROOM_KEYWORDS: &[&str] = &["өрөө", "room"];

const DESCRIPTION_BODY_LIMIT: usize = 500;

pub const TITLE_STRATEGIES: &[Strategy] = &[title_from_heading, title_from_meta];
pub const PRICE_STRATEGIES: &[Strategy] = &[price_from_data_attribute, price_from_styled_value];
pub const LOCATION_STRATEGIES: &[Strategy] = &[location_from_labelled_block];
pub const AREA_STRATEGIES: &[Strategy] = &[area_from_characteristics];
pub const ROOM_STRATEGIES: &[Strategy] = &[rooms_from_text];
pub const DESCRIPTION_STRATEGIES: &[Strategy] = &[
    description_from_container,
    description_from_meta,
    description_from_body,
];

/// Extracts a [`ListingRecord`] from a single listing page
pub struct ListingExtractor {
    fetcher: PageFetcher,
}

impl ListingExtractor {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self { fetcher }
    }

    /// Fetch and extract one listing. Never fails: a fetch error yields a sentinel record.
    pub async fn extract(&self, url: &str) -> ListingRecord {
        info!("Extracting details from {}", url);

        match self.fetcher.fetch(url).await {
            Ok(html) => {
                let record = parse_listing(url, &html);
                debug!(?record, "Extracted listing");
                record
            }
            Err(e) => {
                warn!(url, error = %e, "Listing unavailable, returning sentinel record");
                ListingRecord::unavailable(url, e.to_string())
            }
        }
    }
}

/// Run every field's strategy chain over already-downloaded markup
pub fn parse_listing(url: &str, html: &str) -> ListingRecord {
    let document = Html::parse_document(html);

    ListingRecord {
        url: url.to_string(),
        title: first_match(&document, TITLE_STRATEGIES),
        price: first_match(&document, PRICE_STRATEGIES),
        location: first_match(&document, LOCATION_STRATEGIES),
        area: first_match(&document, AREA_STRATEGIES),
        rooms: first_match(&document, ROOM_STRATEGIES),
        description: first_match(&document, DESCRIPTION_STRATEGIES),
        error: None,
        fetched_at: Utc::now(),
    }
}

/// First non-empty strategy result, or the sentinel
pub fn first_match(document: &Html, strategies: &[Strategy]) -> String {
    strategies
        .iter()
        .find_map(|strategy| strategy(document).filter(|value| !value.trim().is_empty()))
        .unwrap_or_else(|| SENTINEL.to_string())
}

fn title_from_heading(document: &Html) -> Option<String> {
    let heading = first_element(document, "h1")?;
    Some(element_text(heading).trim().to_string())
}

fn title_from_meta(document: &Html) -> Option<String> {
    meta_content(document, "og:title")
}

fn price_from_data_attribute(document: &Html) -> Option<String> {
    let section = first_element(document, "section.list-announcement[data-price]")?;
    let raw = section.value().attr("data-price")?;

    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() => Some(format!("MNT {}", format_thousands(price))),
        // Unparseable attribute is still better than nothing
        _ => Some(raw.to_string()),
    }
}

fn price_from_styled_value(document: &Html) -> Option<String> {
    let value = first_element(document, ".announcement-price__value")?;
    Some(element_text(value).trim().to_string())
}

fn location_from_labelled_block(document: &Html) -> Option<String> {
    let (parent, _) = visible_text_nodes(document)
        .into_iter()
        .find(|(_, text)| contains_keyword(text, LOCATION_KEYWORDS))?;
    Some(collapse_whitespace(&element_text(parent)))
}

fn area_from_characteristics(document: &Html) -> Option<String> {
    let items = selector("li")?;
    let labels = selector("span")?;
    let values = selector("a.value-chars")?;

    let item = document.select(&items).find(|li| {
        li.select(&labels)
            .any(|label| contains_keyword(&element_text(label), AREA_KEYWORDS))
    })?;
    let value = item.select(&values).next()?;
    Some(element_text(value).trim().to_string())
}

fn rooms_from_text(document: &Html) -> Option<String> {
    visible_text_nodes(document)
        .into_iter()
        .find(|(_, text)| contains_keyword(text, ROOM_KEYWORDS))
        .map(|(_, text)| text.trim().to_string())
}

fn description_from_container(document: &Html) -> Option<String> {
    let container = first_element(document, "div.announcement-description")?;
    Some(collapse_whitespace(&element_text(container)))
}

fn description_from_meta(document: &Html) -> Option<String> {
    meta_content(document, "og:description")
}

fn description_from_body(document: &Html) -> Option<String> {
    let body_text = visible_text_nodes(document)
        .into_iter()
        .map(|(_, text)| text.trim())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(truncate_with_ellipsis(&body_text, DESCRIPTION_BODY_LIMIT))
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn first_element<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = selector(css)?;
    let element = document.select(&selector).next();
    element
}

fn meta_content(document: &Html, property: &str) -> Option<String> {
    let meta = first_element(document, &format!(r#"meta[property="{property}"]"#))?;
    Some(meta.value().attr("content")?.trim().to_string())
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Text nodes inside `<body>` in document order, paired with their parent element.
/// Script and style contents are not visible text.
fn visible_text_nodes(document: &Html) -> Vec<(ElementRef<'_>, &str)> {
    let Some(body) = first_element(document, "body") else {
        return Vec::new();
    };

    body.descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap)?;
            if matches!(parent.value().name(), "script" | "style" | "noscript" | "template") {
                return None;
            }
            Some((parent, &**text))
        })
        .collect()
}

fn contains_keyword(text: &str, keywords: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword))
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_with_ellipsis(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let mut truncated: String = text.chars().take(limit).collect();
        truncated.push_str("...");
        truncated
    } else {
        text.to_string()
    }
}

/// Render a number rounded to whole units with comma thousands separators
pub(crate) fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const LISTING_PAGE: &str = r#"
        <html>
        <head>
            <title>2 өрөө байр зарна</title>
            <meta property="og:title" content="Meta title">
            <meta property="og:description" content="Meta description">
        </head>
        <body>
            <h1>  Төмөр замд 2 өрөө байр зарна </h1>
            <section class="list-announcement" data-price="155000000"></section>
            <div class="location-block">Байршил:
                Улаанбаатар,   Баянгол
            </div>
            <ul class="chars-column">
                <li><span>Тагт:</span> <a class="value-chars">1</a></li>
                <li><span>Талбай:</span> <a class="value-chars">56 м²</a></li>
            </ul>
            <div class="announcement-description">
                Бүрэн   цутгамал,
                гал тогооны тавилга үлдэнэ.
            </div>
            <script>var location = "nowhere";</script>
        </body>
        </html>
    "#;

    #[test]
    fn extracts_every_field_from_a_full_page() {
        let record = parse_listing("https://example.mn/adv/1", LISTING_PAGE);

        assert_eq!(record.title, "Төмөр замд 2 өрөө байр зарна");
        assert_eq!(record.price, "MNT 155,000,000");
        assert_eq!(record.location, "Байршил: Улаанбаатар, Баянгол");
        assert_eq!(record.area, "56 м²");
        assert_eq!(record.rooms, "Төмөр замд 2 өрөө байр зарна");
        assert_eq!(record.description, "Бүрэн цутгамал, гал тогооны тавилга үлдэнэ.");
        assert!(record.error.is_none());
    }

    #[test]
    fn title_is_sentinel_without_heading_or_og_title() {
        let record = parse_listing("u", "<html><body><p>nothing here</p></body></html>");
        assert_eq!(record.title, SENTINEL);
    }

    #[test]
    fn title_falls_back_to_og_title() {
        let html = r#"<html><head><meta property="og:title" content=" From meta "></head><body></body></html>"#;
        let record = parse_listing("u", html);
        assert_eq!(record.title, "From meta");
    }

    #[test]
    fn malformed_price_attribute_is_kept_verbatim() {
        let html = r#"<body><section class="list-announcement" data-price="155 сая"></section>
            <span class="announcement-price__value">ignored</span></body>"#;
        let record = parse_listing("u", html);
        assert_eq!(record.price, "155 сая");
    }

    #[test]
    fn price_falls_back_to_styled_value() {
        let html = r#"<body><div class="announcement-price__value"> 120 сая ₮ </div></body>"#;
        let record = parse_listing("u", html);
        assert_eq!(record.price, "120 сая ₮");
    }

    #[test]
    fn area_requires_the_value_element() {
        let html = r#"<body><ul><li><span>Талбай:</span> 56</li></ul></body>"#;
        let record = parse_listing("u", html);
        assert_eq!(record.area, SENTINEL);
    }

    #[test]
    fn description_falls_back_to_meta_then_body() {
        let with_meta = r#"<html><head><meta property="og:description" content="Meta description"></head>
            <body><p>body text</p></body></html>"#;
        assert_eq!(parse_listing("u", with_meta).description, "Meta description");

        let long_body = format!("<body><p>{}</p></body>", "a".repeat(600));
        let description = parse_listing("u", &long_body).description;
        assert_eq!(description.chars().count(), 503);
        assert!(description.ends_with("..."));

        let short_body = "<body><p>short</p> <p>text</p></body>";
        assert_eq!(parse_listing("u", short_body).description, "short text");
    }

    #[test]
    fn empty_page_degrades_every_field() {
        let record = parse_listing("u", "");
        assert!(record.content_fields().iter().all(|f| *f == SENTINEL));
        assert!(record.error.is_none());
    }

    #[test]
    fn script_text_is_never_matched() {
        let html = r#"<body><script>let location = 1; let rooms = 2;</script></body>"#;
        let record = parse_listing("u", html);
        assert_eq!(record.location, SENTINEL);
        assert_eq!(record.rooms, SENTINEL);
    }

    #[test]
    fn thousands_formatting() {
        assert_eq!(format_thousands(155_000_000.0), "155,000,000");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(-1234567.0), "-1,234,567");
        assert_eq!(format_thousands(0.0), "0");
    }

    #[tokio::test]
    async fn unreachable_url_yields_sentinel_record() {
        let fetcher = PageFetcher::new(Duration::from_secs(2)).unwrap();
        let extractor = ListingExtractor::new(fetcher);

        for url in ["not a url", "http://127.0.0.1:9/adv/1"] {
            let record = extractor.extract(url).await;
            assert_eq!(record.url, url);
            assert!(record.content_fields().iter().all(|f| *f == SENTINEL));
            assert!(record.error.as_deref().is_some_and(|e| !e.is_empty()));
        }
    }
}
