//! Tiered discovery: sitemap first, homepage crawl as the fallback
//!
//! Search-engine links are gathered once per company and merged into
//! whichever tier produces the final selection.

use super::crawl::LinkCrawler;
use super::locator::SitemapLocator;
use super::search::{SearchEvidence, SearchLinkCollector};
use super::select::{InformationNeed, PathRelevanceSelector, PoolKind, Selection};
use super::sitemap::{ResolverLimits, SitemapResolver};
use crate::config::{DiscoveryConfig, HttpConfig};
use crate::domain::Domain;
use crate::oracle::Oracle;
use crate::paths::{normalize_path, CandidatePath};
use crate::session::Fetcher;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// What is known about a company's sitemap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "url", rename_all = "snake_case")]
pub enum SitemapCache {
    /// Never probed
    Unknown,
    /// Probed, none advertised
    Absent,
    Found(String),
}

impl SitemapCache {
    pub fn from_located(located: Option<String>) -> Self {
        match located {
            Some(url) => SitemapCache::Found(url),
            None => SitemapCache::Absent,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            SitemapCache::Found(url) => Some(url),
            _ => None,
        }
    }
}

/// Which tier produced the final selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Sitemap,
    Crawl,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Sitemap => "sitemap",
            Tier::Crawl => "crawl",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// States entered during one discovery run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    SitemapLookup,
    LeafEnumeration,
    SitemapSelection,
    CrawlFallback,
    CrawlSelection,
}

/// One company to discover
#[derive(Debug, Clone)]
pub struct DiscoveryTarget<'a> {
    pub name: &'a str,
    pub domain: &'a Domain,
    pub sitemap: SitemapCache,
}

/// Result of a discovery run
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryOutcome {
    pub tier: Tier,
    /// Selected paths in oracle order, then on-domain search links
    pub paths: Vec<CandidatePath>,
    /// Sitemap state after this run, for caching
    pub sitemap: SitemapCache,
    /// Whether the tier's selection passed the validity gate
    pub selected: bool,
    pub evidence: SearchEvidence,
    pub trace: Vec<Stage>,
}

impl DiscoveryOutcome {
    /// Absolute URLs to scrape
    ///
    /// The sitemap tier always includes the homepage.
    pub fn scrape_urls(&self, domain: &Domain) -> Vec<String> {
        let mut urls = Vec::new();
        let has_root = self.paths.iter().any(|p| p.is_root());
        if self.tier == Tier::Sitemap && !has_root {
            urls.push(domain.homepage());
        }
        urls.extend(
            self.paths
                .iter()
                .map(|path| format!("https://{}{}", domain, path)),
        );
        urls
    }

    pub fn crawled(&self) -> bool {
        self.trace.contains(&Stage::CrawlFallback)
    }
}

/// Sequences sitemap location, leaf enumeration, relevance selection and the
/// crawl fallback for one company at a time
pub struct FallbackOrchestrator<'a> {
    fetcher: &'a dyn Fetcher,
    oracle: &'a dyn Oracle,
    crawler: &'a dyn LinkCrawler,
    search: Option<&'a dyn SearchLinkCollector>,
    robots_timeout: Duration,
    sitemap_timeout: Duration,
    config: DiscoveryConfig,
}

impl<'a> FallbackOrchestrator<'a> {
    pub fn new(
        fetcher: &'a dyn Fetcher,
        oracle: &'a dyn Oracle,
        crawler: &'a dyn LinkCrawler,
        http: &HttpConfig,
        config: &DiscoveryConfig,
    ) -> Self {
        Self {
            fetcher,
            oracle,
            crawler,
            search: None,
            robots_timeout: http.robots_timeout(),
            sitemap_timeout: http.sitemap_timeout(),
            config: config.clone(),
        }
    }

    /// Merge search-engine evidence into every run
    pub fn with_search(mut self, search: &'a dyn SearchLinkCollector) -> Self {
        self.search = Some(search);
        self
    }

    fn selector(&self) -> PathRelevanceSelector<'_> {
        PathRelevanceSelector::new(
            self.oracle,
            &InformationNeed::ALL,
            self.config.max_prompt_candidates,
        )
    }

    fn resolver(&self) -> SitemapResolver<'_> {
        SitemapResolver::new(
            self.fetcher,
            ResolverLimits {
                max_depth: self.config.max_sitemap_depth,
                max_documents: self.config.max_sitemap_documents,
                max_path_segments: self.config.max_path_segments,
                timeout: self.sitemap_timeout,
            },
        )
    }

    /// Run discovery for one company
    ///
    /// Never fails: total failure is an outcome with only search paths (or
    /// none) for downstream stages to tolerate.
    pub async fn run(&self, target: DiscoveryTarget<'_>) -> DiscoveryOutcome {
        let domain = target.domain;
        let mut trace = vec![Stage::Start];
        info!("Discovering pages for {} ({})", target.name, domain);

        let evidence = match self.search {
            Some(search) => SearchEvidence::gather(search, target.name, domain).await,
            None => SearchEvidence::default(),
        };

        trace.push(Stage::SitemapLookup);
        let sitemap = match target.sitemap {
            SitemapCache::Unknown => {
                let locator = SitemapLocator::new(self.fetcher, self.robots_timeout);
                SitemapCache::from_located(locator.locate(domain).await)
            }
            known => {
                debug!("Using cached sitemap state for {}: {:?}", domain, known);
                known
            }
        };

        let from_sitemap = match sitemap.url() {
            Some(root) => self.sitemap_tier(root, &mut trace).await,
            None => None,
        };

        let (tier, selected, paths) = match from_sitemap {
            Some(paths) => (Tier::Sitemap, true, paths),
            None => {
                trace.push(Stage::CrawlFallback);
                info!("Sitemap tier failed for {}, crawling homepage", domain);
                let selection = self.crawl_tier(domain, &mut trace).await;
                let selected = selection.passes_gate();
                // Last tier: a homepage-only answer still gets the homepage scraped
                let paths = match selection {
                    Selection::HomepageOnly => vec![CandidatePath::root()],
                    other => other.into_paths(),
                };
                (Tier::Crawl, selected, paths)
            }
        };

        let mut seen = HashSet::new();
        let merged: Vec<CandidatePath> = paths
            .into_iter()
            .chain(evidence.paths(domain))
            .filter(|path| seen.insert(path.clone()))
            .collect();

        info!(
            "Discovery for {} finished via {} tier with {} paths",
            domain,
            tier,
            merged.len()
        );
        DiscoveryOutcome {
            tier,
            paths: merged,
            sitemap,
            selected,
            evidence,
            trace,
        }
    }

    /// Selected page paths, or `None` when the tier must fall back
    async fn sitemap_tier(&self, root: &str, trace: &mut Vec<Stage>) -> Option<Vec<CandidatePath>> {
        trace.push(Stage::LeafEnumeration);
        let resolver = self.resolver();
        let leaves = resolver.resolve_leaves(root).await;
        if leaves.is_empty() {
            warn!("Sitemap {} has no readable leaves", root);
            return None;
        }

        trace.push(Stage::SitemapSelection);
        let selector = self.selector();
        let chosen = if leaves.len() == 1 {
            leaves
        } else {
            let mut seen = HashSet::new();
            let leaf_paths: Vec<String> = leaves
                .iter()
                .map(|l| normalize_path(l))
                .filter(|p| seen.insert(p.clone()))
                .collect();
            let selection = selector.select(&leaf_paths, PoolKind::Sitemaps).await;
            if !selection.passes_gate() {
                return None;
            }
            leaf_urls(&leaves, selection.paths(), root)
        };

        let mut seen = HashSet::new();
        let mut pool = Vec::new();
        for leaf in &chosen {
            for path in resolver.resolve_urls(leaf).await {
                if seen.insert(path.clone()) {
                    pool.push(path);
                }
            }
        }
        debug!("{} candidate pages from {} leaf sitemaps", pool.len(), chosen.len());

        match selector.select(&pool, PoolKind::Pages).await {
            Selection::Paths(paths) => Some(paths),
            _ => None,
        }
    }

    async fn crawl_tier(&self, domain: &Domain, trace: &mut Vec<Stage>) -> Selection {
        let mut links = self.crawler.crawl_internal_links(&domain.homepage()).await;
        if self.config.filter_crawled_links {
            links.retain(|p| p.segment_count() <= self.config.max_path_segments);
        }

        trace.push(Stage::CrawlSelection);
        let links: Vec<CandidatePath> = links.into_iter().collect();
        self.selector().select(&links, PoolKind::Pages).await
    }
}

/// Map selected leaf paths back to every leaf URL they came from
///
/// Leaves differing only by query string share a path and are all kept. A
/// path matching no known leaf is resolved against the root sitemap.
fn leaf_urls(leaves: &[String], selected: &[CandidatePath], root: &str) -> Vec<String> {
    let root = Url::parse(root).ok();
    let mut urls: Vec<String> = Vec::new();
    for path in selected {
        let matching: Vec<&String> = leaves
            .iter()
            .filter(|leaf| normalize_path(leaf) == path.as_str())
            .collect();
        if matching.is_empty() {
            if let Some(url) = root.as_ref().and_then(|r| r.join(path.as_str()).ok()) {
                urls.push(url.to_string());
            }
            continue;
        }
        for leaf in matching {
            if !urls.contains(leaf) {
                urls.push(leaf.clone());
            }
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::crawl::testing::FixedCrawler;
    use crate::discovery::search::testing::CannedSearch;
    use crate::oracle::testing::ScriptedOracle;
    use crate::session::testing::StaticFetcher;

    const ROOT: &str = "https://acme.com/sitemap.xml";

    fn urlset(urls: &[&str]) -> String {
        let entries: String = urls
            .iter()
            .map(|u| format!("<url><loc>{}</loc></url>", u))
            .collect();
        format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
            entries
        )
    }

    fn index(children: &[&str]) -> String {
        let entries: String = children
            .iter()
            .map(|u| format!("<sitemap><loc>{}</loc></sitemap>", u))
            .collect();
        format!(
            r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</sitemapindex>"#,
            entries
        )
    }

    fn domain() -> Domain {
        Domain::from_website("https://www.acme.com").unwrap()
    }

    fn target(domain: &Domain, sitemap: SitemapCache) -> DiscoveryTarget<'_> {
        DiscoveryTarget {
            name: "Acme",
            domain,
            sitemap,
        }
    }

    fn orchestrator<'a>(
        fetcher: &'a StaticFetcher,
        oracle: &'a ScriptedOracle,
        crawler: &'a FixedCrawler,
    ) -> FallbackOrchestrator<'a> {
        FallbackOrchestrator::new(
            fetcher,
            oracle,
            crawler,
            &HttpConfig::default(),
            &DiscoveryConfig::default(),
        )
    }

    fn path_strings(outcome: &DiscoveryOutcome) -> Vec<&str> {
        outcome.paths.iter().map(|p| p.as_str()).collect()
    }

    #[tokio::test]
    async fn test_single_leaf_skips_leaf_selection() {
        let fetcher = StaticFetcher::new().xml(
            ROOT,
            &urlset(&[
                "https://acme.com/",
                "https://acme.com/about/",
                "https://acme.com/team",
                "https://acme.com/blog/2024/05/launch",
            ]),
        );
        let oracle = ScriptedOracle::new(["/about, /team"]);
        let crawler = FixedCrawler::new(&["/contact"]);
        let domain = domain();

        let outcome = orchestrator(&fetcher, &oracle, &crawler)
            .run(target(&domain, SitemapCache::Found(ROOT.to_string())))
            .await;

        assert_eq!(outcome.tier, Tier::Sitemap);
        assert!(outcome.selected);
        assert_eq!(path_strings(&outcome), vec!["/about", "/team"]);
        assert!(!outcome.crawled());
        assert_eq!(crawler.calls(), 0);

        let prompts = oracle.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("/about\n/team"));
        assert!(!prompts[0].contains("/blog/2024"));

        assert_eq!(
            outcome.scrape_urls(&domain),
            vec![
                "https://acme.com/".to_string(),
                "https://acme.com/about".to_string(),
                "https://acme.com/team".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_multiple_leaves_are_selected_first() {
        let fetcher = StaticFetcher::new()
            .xml(
                ROOT,
                &index(&[
                    "https://acme.com/post-sitemap.xml",
                    "https://acme.com/page-sitemap.xml",
                ]),
            )
            .xml(
                "https://acme.com/post-sitemap.xml",
                &urlset(&["https://acme.com/news-1"]),
            )
            .xml(
                "https://acme.com/page-sitemap.xml",
                &urlset(&["https://acme.com/about", "https://acme.com/investors"]),
            );
        let oracle = ScriptedOracle::new(["/page-sitemap.xml", "/investors"]);
        let crawler = FixedCrawler::new(&[]);
        let domain = domain();

        let outcome = orchestrator(&fetcher, &oracle, &crawler)
            .run(target(&domain, SitemapCache::Found(ROOT.to_string())))
            .await;

        assert_eq!(outcome.tier, Tier::Sitemap);
        assert_eq!(path_strings(&outcome), vec!["/investors"]);
        assert_eq!(
            outcome.trace,
            vec![
                Stage::Start,
                Stage::SitemapLookup,
                Stage::LeafEnumeration,
                Stage::SitemapSelection
            ]
        );

        let prompts = oracle.prompts();
        assert_eq!(prompts.len(), 2);
        assert!(prompts[0].contains("/post-sitemap.xml\n/page-sitemap.xml"));
        assert!(prompts[1].contains("/about\n/investors"));
        assert!(!prompts[1].contains("/news-1"));
    }

    #[tokio::test]
    async fn test_homepage_sentinel_falls_back_to_crawl() {
        let fetcher = StaticFetcher::new().xml(ROOT, &urlset(&["https://acme.com/blog"]));
        let oracle = ScriptedOracle::new(["/", "/contact, /about-us"]);
        let crawler = FixedCrawler::new(&["/about-us", "/contact", "/products/widgets/blue"]);
        let search = CannedSearch::new().with(
            "address location site:acme.com",
            &["https://acme.com/locations/", "https://maps.example.com/acme"],
            "Acme, 1 Main Street",
        );
        let domain = domain();

        let outcome = orchestrator(&fetcher, &oracle, &crawler)
            .with_search(&search)
            .run(target(&domain, SitemapCache::Found(ROOT.to_string())))
            .await;

        assert_eq!(outcome.tier, Tier::Crawl);
        assert!(outcome.selected);
        assert!(outcome.crawled());
        assert_eq!(crawler.calls(), 1);
        assert_eq!(path_strings(&outcome), vec!["/contact", "/about-us", "/locations"]);

        let crawl_prompt = &oracle.prompts()[1];
        assert!(!crawl_prompt.contains("/products/widgets/blue"));

        assert_eq!(
            outcome.scrape_urls(&domain),
            vec![
                "https://acme.com/contact".to_string(),
                "https://acme.com/about-us".to_string(),
                "https://acme.com/locations".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_crawl_links_unfiltered_when_configured() {
        let fetcher = StaticFetcher::new();
        let oracle = ScriptedOracle::new(["/products/widgets/blue"]);
        let crawler = FixedCrawler::new(&["/products/widgets/blue"]);
        let domain = domain();

        let config = DiscoveryConfig {
            filter_crawled_links: false,
            ..DiscoveryConfig::default()
        };
        let orchestrator = FallbackOrchestrator::new(
            &fetcher,
            &oracle,
            &crawler,
            &HttpConfig::default(),
            &config,
        );
        let outcome = orchestrator.run(target(&domain, SitemapCache::Absent)).await;
        assert_eq!(path_strings(&outcome), vec!["/products/widgets/blue"]);
    }

    #[tokio::test]
    async fn test_unknown_sitemap_is_located_and_cached() {
        let fetcher = StaticFetcher::new()
            .with(
                "https://acme.com/robots.txt",
                200,
                "text/plain",
                "User-agent: *\nSitemap: https://acme.com/wp-sitemap.xml",
            )
            .xml(
                "https://acme.com/wp-sitemap.xml",
                &urlset(&["https://acme.com/about"]),
            );
        let oracle = ScriptedOracle::new(["/about"]);
        let crawler = FixedCrawler::new(&[]);
        let domain = domain();

        let outcome = orchestrator(&fetcher, &oracle, &crawler)
            .run(target(&domain, SitemapCache::Unknown))
            .await;

        assert_eq!(
            outcome.sitemap,
            SitemapCache::Found("https://acme.com/wp-sitemap.xml".to_string())
        );
        assert_eq!(outcome.tier, Tier::Sitemap);
    }

    #[tokio::test]
    async fn test_absent_sitemap_goes_straight_to_crawl() {
        let fetcher = StaticFetcher::new();
        let oracle = ScriptedOracle::new(["/team"]);
        let crawler = FixedCrawler::new(&["/team"]);
        let domain = domain();

        let outcome = orchestrator(&fetcher, &oracle, &crawler)
            .run(target(&domain, SitemapCache::Absent))
            .await;

        assert!(fetcher.requested().is_empty());
        assert_eq!(outcome.sitemap, SitemapCache::Absent);
        assert_eq!(
            outcome.trace,
            vec![
                Stage::Start,
                Stage::SitemapLookup,
                Stage::CrawlFallback,
                Stage::CrawlSelection
            ]
        );
        assert_eq!(path_strings(&outcome), vec!["/team"]);
    }

    #[tokio::test]
    async fn test_total_failure_is_an_empty_outcome() {
        let fetcher = StaticFetcher::new();
        let oracle = ScriptedOracle::failing();
        let crawler = FixedCrawler::new(&[]);
        let domain = domain();

        let outcome = orchestrator(&fetcher, &oracle, &crawler)
            .run(target(&domain, SitemapCache::Unknown))
            .await;

        assert_eq!(outcome.tier, Tier::Crawl);
        assert!(!outcome.selected);
        assert!(outcome.paths.is_empty());
        assert!(outcome.scrape_urls(&domain).is_empty());
        assert_eq!(outcome.sitemap, SitemapCache::Absent);
        assert!(oracle.prompts().is_empty());
    }

    #[tokio::test]
    async fn test_sitemap_success_never_crawls() {
        let answers = ["/about", "/about, /", "/team/, /contact"];
        for answer in answers {
            let fetcher = StaticFetcher::new().xml(
                ROOT,
                &urlset(&["https://acme.com/about", "https://acme.com/team", "https://acme.com/contact"]),
            );
            let oracle = ScriptedOracle::new([answer]);
            let crawler = FixedCrawler::new(&["/elsewhere"]);
            let domain = domain();

            let outcome = orchestrator(&fetcher, &oracle, &crawler)
                .run(target(&domain, SitemapCache::Found(ROOT.to_string())))
                .await;

            assert!(outcome.selected, "answer {:?}", answer);
            assert!(!outcome.crawled(), "answer {:?}", answer);
            assert_eq!(crawler.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_homepage_only_in_crawl_tier_scrapes_homepage() {
        let fetcher = StaticFetcher::new();
        let oracle = ScriptedOracle::new(["/"]);
        let crawler = FixedCrawler::new(&["/blog", "/news"]);
        let domain = domain();

        let outcome = orchestrator(&fetcher, &oracle, &crawler)
            .run(target(&domain, SitemapCache::Absent))
            .await;

        assert_eq!(outcome.tier, Tier::Crawl);
        assert!(!outcome.selected);
        assert_eq!(path_strings(&outcome), vec!["/"]);
        assert_eq!(
            outcome.scrape_urls(&domain),
            vec!["https://acme.com/".to_string()]
        );
    }

    #[tokio::test]
    async fn test_leaf_selection_failure_falls_back_to_crawl() {
        for answer in ["/", "I could not find anything useful."] {
            let fetcher = StaticFetcher::new()
                .xml(
                    ROOT,
                    &index(&[
                        "https://acme.com/post-sitemap.xml",
                        "https://acme.com/page-sitemap.xml",
                    ]),
                )
                .xml(
                    "https://acme.com/post-sitemap.xml",
                    &urlset(&["https://acme.com/news-1"]),
                )
                .xml(
                    "https://acme.com/page-sitemap.xml",
                    &urlset(&["https://acme.com/about"]),
                );
            let oracle = ScriptedOracle::new([answer, "/contact"]);
            let crawler = FixedCrawler::new(&["/contact"]);
            let domain = domain();

            let outcome = orchestrator(&fetcher, &oracle, &crawler)
                .run(target(&domain, SitemapCache::Found(ROOT.to_string())))
                .await;

            assert_eq!(
                outcome.trace,
                vec![
                    Stage::Start,
                    Stage::SitemapLookup,
                    Stage::LeafEnumeration,
                    Stage::SitemapSelection,
                    Stage::CrawlFallback,
                    Stage::CrawlSelection
                ],
                "answer {:?}",
                answer
            );
            assert_eq!(outcome.tier, Tier::Crawl);
            assert_eq!(crawler.calls(), 1);
            assert_eq!(path_strings(&outcome), vec!["/contact"]);
            assert_eq!(oracle.prompts().len(), 2);
        }
    }

    #[tokio::test]
    async fn test_leaves_sharing_a_path_are_listed_once_and_all_expanded() {
        let fetcher = StaticFetcher::new()
            .xml(
                ROOT,
                &index(&[
                    "https://acme.com/sitemap.xml?page=1",
                    "https://acme.com/sitemap.xml?page=2",
                    "https://acme.com/news-sitemap.xml",
                ]),
            )
            .xml(
                "https://acme.com/sitemap.xml?page=1",
                &urlset(&["https://acme.com/blog"]),
            )
            .xml(
                "https://acme.com/sitemap.xml?page=2",
                &urlset(&["https://acme.com/about"]),
            )
            .xml(
                "https://acme.com/news-sitemap.xml",
                &urlset(&["https://acme.com/press"]),
            );
        let oracle = ScriptedOracle::new(["/sitemap.xml", "/about"]);
        let crawler = FixedCrawler::new(&[]);
        let domain = domain();

        let outcome = orchestrator(&fetcher, &oracle, &crawler)
            .run(target(&domain, SitemapCache::Found(ROOT.to_string())))
            .await;

        let prompts = oracle.prompts();
        assert_eq!(prompts[0].matches("/sitemap.xml\n").count(), 1);
        assert!(prompts[1].contains("/blog\n/about"));
        assert!(!prompts[1].contains("/press"));
        assert_eq!(path_strings(&outcome), vec!["/about"]);
    }

    #[test]
    fn test_leaf_urls_keep_every_matching_leaf() {
        let leaves = vec![
            "https://acme.com/sitemap.xml?page=1".to_string(),
            "https://acme.com/sitemap.xml?page=2".to_string(),
            "https://acme.com/other.xml".to_string(),
        ];
        let selected = vec![CandidatePath::parse("/sitemap.xml").unwrap()];
        assert_eq!(
            leaf_urls(&leaves, &selected, ROOT),
            vec![
                "https://acme.com/sitemap.xml?page=1".to_string(),
                "https://acme.com/sitemap.xml?page=2".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_paths_keep_oracle_order_before_search_links() {
        let fetcher = StaticFetcher::new().xml(
            ROOT,
            &urlset(&["https://acme.com/about", "https://acme.com/team", "https://acme.com/contact"]),
        );
        let oracle = ScriptedOracle::new(["/team, /contact, /about"]);
        let crawler = FixedCrawler::new(&[]);
        let search = CannedSearch::new().with(
            "industry site:acme.com",
            &["https://acme.com/about", "https://acme.com/blog"],
            "Acme makes widgets",
        );
        let domain = domain();

        let outcome = orchestrator(&fetcher, &oracle, &crawler)
            .with_search(&search)
            .run(target(&domain, SitemapCache::Found(ROOT.to_string())))
            .await;

        assert_eq!(
            path_strings(&outcome),
            vec!["/team", "/contact", "/about", "/blog"]
        );
    }

    #[test]
    fn test_leaf_urls_fall_back_to_root_origin() {
        let leaves = vec!["https://cdn.acme.com/sitemaps/pages.xml".to_string()];
        let selected = vec![
            CandidatePath::parse("/sitemaps/pages.xml").unwrap(),
            CandidatePath::parse("/other.xml").unwrap(),
        ];
        assert_eq!(
            leaf_urls(&leaves, &selected, ROOT),
            vec![
                "https://cdn.acme.com/sitemaps/pages.xml".to_string(),
                "https://acme.com/other.xml".to_string()
            ]
        );
    }
}
