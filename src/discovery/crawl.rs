//! Homepage link crawl, the fallback candidate source

use crate::paths::{CandidatePath, ROOT_PATH};
use crate::session::Fetcher;
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const SKIPPED_SCHEMES: [&str; 3] = ["javascript:", "mailto:", "tel:"];

#[async_trait]
pub trait LinkCrawler: Send + Sync {
    /// Same-host link paths found on `homepage`; empty on any failure
    async fn crawl_internal_links(&self, homepage: &str) -> BTreeSet<CandidatePath>;
}

/// Crawls the `a[href]` anchors of a single page
pub struct HomepageCrawler<'a> {
    fetcher: &'a dyn Fetcher,
    timeout: Duration,
}

impl<'a> HomepageCrawler<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }
}

#[async_trait]
impl LinkCrawler for HomepageCrawler<'_> {
    async fn crawl_internal_links(&self, homepage: &str) -> BTreeSet<CandidatePath> {
        let Ok(base) = Url::parse(homepage) else {
            warn!("Cannot crawl invalid homepage URL {}", homepage);
            return BTreeSet::new();
        };

        match self.fetcher.get(homepage, self.timeout).await {
            Ok(response) if response.is_ok() => {
                let links = internal_links(&response.body, &base);
                debug!("Found {} internal links on {}", links.len(), homepage);
                links
            }
            Ok(response) => {
                warn!("Homepage {} answered {}", homepage, response.status);
                BTreeSet::new()
            }
            Err(e) => {
                warn!("Failed to crawl {}: {}", homepage, e);
                BTreeSet::new()
            }
        }
    }
}

/// Normalized same-site link paths of an HTML page, without the homepage
pub fn internal_links(html: &str, base: &Url) -> BTreeSet<CandidatePath> {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("a[href]") else {
        return BTreeSet::new();
    };

    document
        .select(&selector)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.starts_with('#'))
        .filter(|href| {
            let lower = href.to_ascii_lowercase();
            !SKIPPED_SCHEMES.iter().any(|s| lower.starts_with(s))
        })
        .filter_map(|href| base.join(href).ok())
        .filter(|url| same_site(url, base))
        .filter(|url| url.path() != ROOT_PATH)
        .filter_map(|url| CandidatePath::parse(url.path()))
        .collect()
}

/// Same host and port, ignoring a leading `www.` on either side
fn same_site(url: &Url, base: &Url) -> bool {
    let bare = |u: &Url| {
        u.host_str()
            .map(|h| h.trim_start_matches("www.").to_ascii_lowercase())
    };
    bare(url).is_some() && bare(url) == bare(base) && url.port() == base.port()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Returns the same link set for every homepage
    #[derive(Default)]
    pub struct FixedCrawler {
        links: BTreeSet<CandidatePath>,
        calls: std::sync::Mutex<usize>,
    }

    impl FixedCrawler {
        pub fn new(links: &[&str]) -> Self {
            Self {
                links: links.iter().filter_map(|l| CandidatePath::parse(l)).collect(),
                calls: std::sync::Mutex::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl LinkCrawler for FixedCrawler {
        async fn crawl_internal_links(&self, _homepage: &str) -> BTreeSet<CandidatePath> {
            *self.calls.lock().unwrap() += 1;
            self.links.clone()
        }
    }
}
