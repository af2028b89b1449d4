use crate::error::RenderError;
use crate::models::PriceTables;
use anyhow::Context;
use chrono::Utc;
use headless_chrome::{Browser, LaunchOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Structured payload rendered into the PDF report
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub price: String,
    pub area: String,
    pub location: String,
    pub market_analysis: String,
    pub conclusion: String,
    pub market_data: Option<PriceTables>,
}

impl ReportDocument {
    /// Self-contained styled HTML for the report
    pub fn to_html(&self) -> String {
        let analysis = self
            .market_analysis
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .map(|line| match line.strip_prefix("### ").or_else(|| line.strip_prefix("## ")) {
                Some(heading) => format!("<h2>{}</h2>", escape(heading)),
                None => format!("<p>{}</p>", escape(line.trim_matches('*'))),
            })
            .collect::<Vec<_>>()
            .join("\n");

        let market_table = self
            .market_data
            .as_ref()
            .map(market_table_html)
            .unwrap_or_default();

        format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ font-family: "DejaVu Sans", Arial, sans-serif; margin: 2cm; color: #222; }}
  h1 {{ color: #1f3b5a; border-bottom: 2px solid #1f3b5a; padding-bottom: 6px; }}
  h2 {{ color: #1f3b5a; margin-top: 24px; }}
  table {{ border-collapse: collapse; width: 100%; margin-top: 12px; }}
  th, td {{ border: 1px solid #bbb; padding: 4px 8px; text-align: right; }}
  th:first-child, td:first-child {{ text-align: left; }}
  .facts td {{ text-align: left; }}
  .conclusion {{ background: #eef3f8; padding: 12px; font-weight: bold; }}
  footer {{ margin-top: 32px; font-size: 10px; color: #777; }}
</style>
</head>
<body>
<h1>{title}</h1>
<table class="facts">
<tr><td>Price</td><td>{price}</td></tr>
<tr><td>Area</td><td>{area}</td></tr>
<tr><td>Location</td><td>{location}</td></tr>
</table>
<h2>Market Analysis</h2>
{analysis}
{market_table}
<h2>Conclusion</h2>
<p class="conclusion">{conclusion}</p>
<footer>Generated {generated}</footer>
</body>
</html>
"#,
            title = escape(&self.title),
            price = escape(&self.price),
            area = escape(&self.area),
            location = escape(&self.location),
            analysis = analysis,
            market_table = market_table,
            conclusion = escape(&self.conclusion),
            generated = Utc::now().format("%Y-%m-%d %H:%M UTC"),
        )
    }
}

fn market_table_html(tables: &PriceTables) -> String {
    let rows = tables
        .tagged_rows()
        .map(|(kind, row)| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{:.2}</td><td>{:.2}</td><td>{:.1}</td></tr>",
                escape(&row.district),
                kind,
                row.price,
                row.change,
                row.change_pct
            )
        })
        .collect::<Vec<_>>();

    if rows.is_empty() {
        return String::new();
    }

    format!(
        "<h2>Apartment Prices (million MNT per m²)</h2>\n<table>\n<tr><th>District</th><th>Type</th><th>Price</th><th>Change</th><th>Change %</th></tr>\n{}\n</table>",
        rows.join("\n")
    )
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Prints report HTML to PDF through headless Chrome
pub struct PdfRenderer;

impl PdfRenderer {
    pub async fn render(document: &ReportDocument, output: &Path) -> Result<PathBuf, RenderError> {
        let html = document.to_html();
        let output = output.to_path_buf();

        tokio::task::spawn_blocking(move || Self::render_blocking(&html, &output))
            .await
            .map_err(|e| RenderError::Render(format!("render task aborted: {e}")))?
    }

    fn render_blocking(html: &str, output: &Path) -> Result<PathBuf, RenderError> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|e| RenderError::BrowserUnavailable(e.to_string()))?;

        let browser = Browser::new(options)
            .map_err(|e| RenderError::BrowserUnavailable(e.to_string()))?;

        Self::print(&browser, html, output).map_err(|e| RenderError::Render(format!("{e:#}")))
    }

    fn print(browser: &Browser, html: &str, output: &Path) -> anyhow::Result<PathBuf> {
        // removed when dropped at the end of this call
        let staged = stage_html(html).context("Failed to stage report HTML")?;
        let source = staged.path();

        let tab = browser.new_tab()?;
        tab.navigate_to(&format!("file://{}", source.display()))?;
        tab.wait_until_navigated()?;

        let pdf = tab.print_to_pdf(None)?;
        std::fs::write(output, &pdf)
            .with_context(|| format!("Failed to write {}", output.display()))?;

        info!("Saved PDF report to {} ({} bytes)", output.display(), pdf.len());
        Ok(output.to_path_buf())
    }
}

/// Write report HTML to a uniquely named temporary file for Chrome to open
fn stage_html(html: &str) -> std::io::Result<NamedTempFile> {
    let mut staged = tempfile::Builder::new()
        .prefix("housing-report-")
        .suffix(".html")
        .tempfile()?;
    staged.write_all(html.as_bytes())?;
    staged.flush()?;
    Ok(staged)
}

/// Operator-facing outcome line for a render attempt
pub fn render_outcome(result: &Result<PathBuf, RenderError>) -> String {
    match result {
        Ok(path) => format!("PDF report generated successfully: {}", path.display()),
        Err(e) => format!("Error: PDF generation failed. {e}"),
    }
}
