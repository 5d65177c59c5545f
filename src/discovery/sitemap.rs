//! Sitemap XML parsing and index resolution
//!
//! Supports:
//! - Standard `urlset` sitemaps
//! - Sitemap index files (`sitemapindex`), resolved depth-first
//! - Any namespace prefix or default namespace (tags are matched by local name)
//!
//! Walks use an explicit stack with a visited set, a depth ceiling and a
//! document ceiling, so self-referencing or very large sitemap graphs
//! terminate.

use crate::error::{Error, Result};
use crate::paths::shallow_paths;
use crate::session::Fetcher;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SitemapNode {
    /// `sitemapindex`: child sitemap URLs, unresolved
    Index(Vec<String>),
    /// `urlset`: concrete page URLs
    Leaf(Vec<String>),
    /// Any other root element
    Unknown(String),
}

/// Limits for one resolution walk
#[derive(Debug, Clone)]
pub struct ResolverLimits {
    pub max_depth: usize,
    pub max_documents: usize,
    pub max_path_segments: usize,
    pub timeout: Duration,
}

/// Fetches sitemap documents and flattens sitemap trees
pub struct SitemapResolver<'a> {
    fetcher: &'a dyn Fetcher,
    limits: ResolverLimits,
}

impl<'a> SitemapResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, limits: ResolverLimits) -> Self {
        Self { fetcher, limits }
    }

    /// URLs of every `urlset` document reachable from `sitemap_url`
    ///
    /// A root that is itself a leaf yields its own URL.
    pub async fn resolve_leaves(&self, sitemap_url: &str) -> Vec<String> {
        let mut leaves = Vec::new();
        self.walk(sitemap_url, |url, _| leaves.push(url.to_string()))
            .await;
        info!("Found {} leaf sitemaps under {}", leaves.len(), sitemap_url);
        leaves
    }

    /// Shallow page paths of every leaf reachable from `sitemap_url`
    ///
    /// Paths deeper than the configured segment limit are dropped; duplicates
    /// are removed keeping first occurrence.
    pub async fn resolve_urls(&self, sitemap_url: &str) -> Vec<String> {
        let mut locs = Vec::new();
        self.walk(sitemap_url, |_, urls| locs.extend_from_slice(urls))
            .await;

        let paths: Vec<String> = shallow_paths(&locs, self.limits.max_path_segments)
            .into_iter()
            .map(|p| p.into_string())
            .collect();
        debug!(
            "Kept {} of {} sitemap URLs from {}",
            paths.len(),
            locs.len(),
            sitemap_url
        );
        paths
    }

    async fn walk(&self, root: &str, mut on_leaf: impl FnMut(&str, &[String])) {
        let mut stack: Vec<(String, usize)> = vec![(root.trim().to_string(), 0)];
        let mut visited: HashSet<String> = HashSet::new();

        while let Some((url, depth)) = stack.pop() {
            if !visited.insert(url.clone()) {
                debug!("Skipping already visited sitemap {}", url);
                continue;
            }
            if visited.len() > self.limits.max_documents {
                warn!(
                    "Reached sitemap document limit ({}), stopping at {}",
                    self.limits.max_documents, url
                );
                break;
            }

            match self.fetch_node(&url).await {
                Ok(SitemapNode::Index(children)) => {
                    debug!("Sitemap index with {} children: {}", children.len(), url);
                    if depth >= self.limits.max_depth {
                        warn!(
                            "Sitemap index {} is nested deeper than {}, not expanding",
                            url, self.limits.max_depth
                        );
                        continue;
                    }
                    // Reverse so children pop in document order
                    for child in children.into_iter().rev() {
                        stack.push((child, depth + 1));
                    }
                }
                Ok(SitemapNode::Leaf(urls)) => {
                    debug!("Leaf sitemap with {} URLs: {}", urls.len(), url);
                    on_leaf(&url, &urls);
                }
                Ok(SitemapNode::Unknown(tag)) => {
                    warn!("Unknown XML root tag in {}: {}", url, tag);
                }
                Err(e) => {
                    warn!("Failed to resolve sitemap {}: {}", url, e);
                }
            }
        }
    }

    async fn fetch_node(&self, url: &str) -> Result<SitemapNode> {
        let response = self.fetcher.get(url, self.limits.timeout).await?;
        if !response.is_ok() {
            return Err(Error::Sitemap(format!("HTTP {}: {}", response.status, url)));
        }
        parse_sitemap(&response.body)
    }
}

/// Classify and parse a sitemap document
pub fn parse_sitemap(xml: &str) -> Result<SitemapNode> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut root: Option<String> = None;
    let mut open: Vec<String> = Vec::new();
    let mut current_loc: Option<String> = None;
    let mut locs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if root.is_none() {
                    root = Some(name.clone());
                }
                open.push(name);
                if is_entry_loc(root.as_deref(), &open) {
                    current_loc = Some(String::new());
                }
            }
            Ok(Event::Empty(e)) => {
                if root.is_none() {
                    root = Some(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                }
            }
            Ok(Event::Text(text)) => {
                if let Some(loc) = current_loc.as_mut() {
                    let unescaped = text
                        .unescape()
                        .map_err(|e| Error::Sitemap(format!("Bad text in <loc>: {}", e)))?;
                    loc.push_str(&unescaped);
                }
            }
            Ok(Event::CData(data)) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                if let Some(loc) = current_loc.take() {
                    let loc = loc.trim();
                    if !loc.is_empty() {
                        locs.push(loc.to_string());
                    }
                }
                open.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::Sitemap(format!(
                    "XML error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => {}
        }
    }

    match root.as_deref() {
        Some("sitemapindex") => Ok(SitemapNode::Index(locs)),
        Some("urlset") => Ok(SitemapNode::Leaf(locs)),
        Some(other) => Ok(SitemapNode::Unknown(other.to_string())),
        None => Err(Error::Sitemap("Document has no root element".to_string())),
    }
}

/// `<loc>` directly inside a `<sitemap>` or `<url>` entry of the root
fn is_entry_loc(root: Option<&str>, open: &[String]) -> bool {
    let entry = match root {
        Some("sitemapindex") => "sitemap",
        Some("urlset") => "url",
        _ => return false,
    };
    matches!(open, [_, e, loc] if e == entry && loc == "loc")
}
