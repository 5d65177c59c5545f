//! Search-engine evidence: result links and snippets from DuckDuckGo

use crate::config::SearchConfig;
use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::paths::CandidatePath;
use crate::session::Fetcher;
use async_trait::async_trait;
use rand::Rng;
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

const REDIRECT_BASE: &str = "https://duckduckgo.com/";

/// Top results of one query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    /// Target URLs, redirect wrappers removed
    pub links: Vec<String>,
    /// Result snippets joined with `"; "`
    pub snippet: String,
}

/// Supplies candidate URLs and snippets for a query
///
/// `None` means no usable results (challenge page, no results, failure).
#[async_trait]
pub trait SearchLinkCollector: Send + Sync {
    async fn search(&self, query: &str) -> Option<SearchHits>;
}

/// DuckDuckGo HTML endpoint client
pub struct DuckDuckGoSearch<'a> {
    fetcher: &'a dyn Fetcher,
    config: SearchConfig,
}

impl<'a> DuckDuckGoSearch<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, config: &SearchConfig) -> Self {
        Self {
            fetcher,
            config: config.clone(),
        }
    }

    fn query_url(&self, query: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.config.endpoint,
            &[("q", query), ("kl", self.config.region.as_str())],
        )?;
        Ok(url.to_string())
    }

    async fn pause(&self) {
        let delay = jitter_ms(self.config.min_delay_ms, self.config.max_delay_ms);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }

    async fn fetch_results(&self, query: &str) -> Result<Option<SearchHits>> {
        let url = self.query_url(query)?;
        let response = self.fetcher.get(&url, self.config.timeout()).await?;

        match response.status {
            200 => Ok(parse_results(&response.body, self.config.results_per_query)),
            202 => {
                warn!("Search challenge page for query {:?}", query);
                Ok(None)
            }
            status => Err(Error::Search(format!("HTTP {} for {:?}", status, query))),
        }
    }
}

#[async_trait]
impl SearchLinkCollector for DuckDuckGoSearch<'_> {
    async fn search(&self, query: &str) -> Option<SearchHits> {
        let hits = match self.fetch_results(query).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!("Search failed for {:?}: {}", query, e);
                None
            }
        };
        self.pause().await;

        debug!(
            "Search {:?}: {}",
            query,
            hits.as_ref()
                .map(|h| format!("{} links", h.links.len()))
                .unwrap_or_else(|| "no results".to_string())
        );
        hits
    }
}

fn jitter_ms(min: u64, max: u64) -> u64 {
    if max > min {
        rand::rng().random_range(min..=max)
    } else {
        min
    }
}

/// Extract the top non-ad results from a results page
pub fn parse_results(html: &str, limit: usize) -> Option<SearchHits> {
    let document = Html::parse_document(html);

    let no_results = Selector::parse(".no-results").ok()?;
    if document.select(&no_results).next().is_some() {
        return None;
    }

    let snippet_selector = Selector::parse(".result:not(.result--ad) .result__snippet").ok()?;
    let snippets: Vec<String> = document
        .select(&snippet_selector)
        .take(limit)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect();
    if snippets.is_empty() {
        return None;
    }

    let link_selector = Selector::parse(".result:not(.result--ad) a.result__a").ok()?;
    let links = document
        .select(&link_selector)
        .filter_map(|el| el.value().attr("href"))
        .filter_map(decode_result_link)
        .take(limit)
        .collect();

    Some(SearchHits {
        links,
        snippet: snippets.join("; "),
    })
}

/// Unwrap a `/l/?uddg=<target>` redirect link; plain http(s) links pass through
pub fn decode_result_link(href: &str) -> Option<String> {
    let base = Url::parse(REDIRECT_BASE).ok()?;
    let url = base.join(href.trim()).ok()?;

    if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
        let target = Url::parse(&target).ok()?;
        return matches!(target.scheme(), "http" | "https").then(|| target.to_string());
    }

    let is_redirect_host = url
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"));
    (!is_redirect_host && matches!(url.scheme(), "http" | "https")).then(|| url.to_string())
}

/// Firmographic facts gathered from search snippets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchTopic {
    Industry,
    EmployeeCount,
    ParentCompany,
    Address,
}

impl SearchTopic {
    pub const ALL: [SearchTopic; 4] = [
        Self::Industry,
        Self::EmployeeCount,
        Self::ParentCompany,
        Self::Address,
    ];

    /// Query restricted to the company's own site
    pub fn site_query(&self, name: &str, domain: &Domain) -> String {
        match self {
            Self::Industry => format!("industry site:{}", domain),
            Self::EmployeeCount => {
                format!("total employees staffs count {} site:{}", name, domain)
            }
            Self::ParentCompany => format!("parent company site:{}", domain),
            Self::Address => format!("address location site:{}", domain),
        }
    }

    /// Unrestricted query, only run when the site query found something
    pub fn general_query(&self, name: &str) -> String {
        match self {
            Self::Industry => format!("{} company industry", name),
            Self::EmployeeCount => format!("{} company employee count", name),
            Self::ParentCompany => format!("{} parent company", name),
            Self::Address => format!("{} company address", name),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Industry => "industry",
            Self::EmployeeCount => "employee count",
            Self::ParentCompany => "parent company",
            Self::Address => "address",
        }
    }
}

/// Snippets and links collected for one company
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchEvidence {
    /// Site query snippet of each topic, followed by its general query snippet
    pub contexts: Vec<(SearchTopic, String)>,
    /// Every result link from every query
    pub links: BTreeSet<String>,
}

impl SearchEvidence {
    /// Run the site and general query of every topic
    pub async fn gather(
        collector: &dyn SearchLinkCollector,
        name: &str,
        domain: &Domain,
    ) -> Self {
        let mut evidence = SearchEvidence::default();

        for topic in SearchTopic::ALL {
            let Some(hits) = collector.search(&topic.site_query(name, domain)).await else {
                debug!("No {} results on {}", topic.label(), domain);
                continue;
            };
            evidence.links.extend(hits.links);
            let mut context = hits.snippet;

            if let Some(general) = collector.search(&topic.general_query(name)).await {
                evidence.links.extend(general.links);
                if !general.snippet.is_empty() {
                    if !context.is_empty() {
                        context.push_str(" \n ");
                    }
                    context.push_str(&general.snippet);
                }
            }

            if !context.is_empty() {
                evidence.contexts.push((topic, context));
            }
        }

        info!(
            "Search evidence for {}: {} topics, {} links",
            domain,
            evidence.contexts.len(),
            evidence.links.len()
        );
        evidence
    }

    /// Link paths on the company's own domain
    pub fn paths(&self, domain: &Domain) -> BTreeSet<CandidatePath> {
        self.links
            .iter()
            .filter_map(|link| Url::parse(link).ok())
            .filter(|url| url.host_str().is_some_and(|h| domain.owns_host(h)))
            .filter_map(|url| CandidatePath::parse(url.path()))
            .collect()
    }
}
