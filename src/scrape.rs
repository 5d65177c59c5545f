//! Page text scraping for the selected URLs

use crate::session::Fetcher;
use scraper::{Html, Selector};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

const TEXT_WIDTH: usize = 120;

/// Visible text of one scraped page
#[derive(Debug, Clone, Serialize)]
pub struct ScrapedPage {
    pub url: String,
    pub text: String,
}

pub struct PageScraper<'a> {
    fetcher: &'a dyn Fetcher,
    timeout: Duration,
}

impl<'a> PageScraper<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Text of a page; empty when the page cannot be fetched
    pub async fn scrape(&self, url: &str) -> String {
        match self.fetcher.get(url, self.timeout).await {
            Ok(response) if response.is_ok() => {
                let text = page_text(&response.body);
                if text.is_empty() {
                    warn!("No visible text found at {}", url);
                }
                debug!("Scraped {} chars from {}", text.len(), url);
                text
            }
            Ok(response) => {
                warn!("{} answered {}", url, response.status);
                String::new()
            }
            Err(e) => {
                warn!("Error scraping {}: {}", url, e);
                String::new()
            }
        }
    }

    /// Scrape every URL in order, keeping pages that produced text
    pub async fn scrape_all(&self, urls: &[String]) -> Vec<ScrapedPage> {
        let mut pages = Vec::new();
        for url in urls {
            let text = self.scrape(url).await;
            if !text.is_empty() {
                pages.push(ScrapedPage {
                    url: url.clone(),
                    text,
                });
            }
        }
        pages
    }
}

/// Body text of an HTML document with blank lines collapsed
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let body = Selector::parse("body")
        .ok()
        .and_then(|s| document.select(&s).next().map(|e| e.html()))
        .unwrap_or_else(|| html.to_string());

    let text = html2text::from_read(body.as_bytes(), TEXT_WIDTH).unwrap_or_default();
    collapse_blank_lines(&text)
}

fn collapse_blank_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
