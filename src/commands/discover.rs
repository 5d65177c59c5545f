//! Discover command: run page discovery for one website without the ledger

use super::Toolkit;
use crate::config::Config;
use crate::discovery::{DiscoveryTarget, FallbackOrchestrator, SitemapCache, Stage, Tier};
use crate::domain::Domain;
use crate::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DiscoverReport {
    pub domain: String,
    pub tier: Tier,
    pub selected: bool,
    pub sitemap: Option<String>,
    pub paths: Vec<String>,
    pub scrape_urls: Vec<String>,
    pub trace: Vec<Stage>,
}

/// Discover the pages worth scraping for a website
///
/// The company name defaults to the domain; it only shapes search queries.
pub async fn cmd_discover(
    config: &Config,
    toolkit: Toolkit<'_>,
    website: &str,
    name: Option<&str>,
) -> Result<DiscoverReport> {
    let domain = Domain::from_website(website)?;
    let name = name.unwrap_or(domain.as_str());

    let mut orchestrator = FallbackOrchestrator::new(
        toolkit.fetcher,
        toolkit.oracle,
        toolkit.crawler,
        &config.http,
        &config.discovery,
    );
    if let Some(search) = toolkit.search {
        orchestrator = orchestrator.with_search(search);
    }

    let outcome = orchestrator
        .run(DiscoveryTarget {
            name,
            domain: &domain,
            sitemap: SitemapCache::Unknown,
        })
        .await;

    Ok(DiscoverReport {
        domain: domain.to_string(),
        tier: outcome.tier,
        selected: outcome.selected,
        sitemap: outcome.sitemap.url().map(str::to_string),
        paths: outcome.paths.iter().map(|p| p.as_str().to_string()).collect(),
        scrape_urls: outcome.scrape_urls(&domain),
        trace: outcome.trace,
    })
}

/// Print a discovery report to console
pub fn print_discover_report(report: &DiscoverReport) {
    println!("Discovery for {}", report.domain);
    println!("  Sitemap: {}", report.sitemap.as_deref().unwrap_or("none"));
    println!(
        "  Tier: {}{}",
        report.tier,
        if report.selected { "" } else { " (no usable selection)" }
    );

    if report.scrape_urls.is_empty() {
        println!("  No pages selected.");
        return;
    }

    println!("  Pages to scrape:");
    for url in &report.scrape_urls {
        println!("    • {}", url);
    }
}
