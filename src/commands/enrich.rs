//! Enrich command: discovery, scrape, extraction and ledger update per company

use super::Toolkit;
use crate::config::Config;
use crate::discovery::{DiscoveryTarget, FallbackOrchestrator, SitemapCache, Tier};
use crate::error::Result;
use crate::extract::ProfileExtractor;
use crate::ledger::{Company, LedgerDb};
use crate::progress::company_progress_bar;
use crate::scrape::PageScraper;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct EnrichOptions {
    /// Only these companies; otherwise every company not yet enriched
    pub ids: Vec<i64>,
    pub limit: Option<usize>,
    /// Ignore the cached sitemap state and probe again
    pub relocate: bool,
}

/// What happened to one company
#[derive(Debug, Clone, Serialize)]
pub struct CompanyReport {
    pub id: i64,
    pub name: String,
    pub tier: Tier,
    pub paths: usize,
    pub pages: usize,
    pub fields_extracted: usize,
    pub cells_written: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EnrichStats {
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub sitemap_tier: usize,
    pub crawl_tier: usize,
    pub cells_written: u64,
    pub companies: Vec<CompanyReport>,
}

/// Enrich companies one after another
///
/// A company that fails is logged and skipped; the run continues.
pub async fn cmd_enrich(
    config: &Config,
    db: &LedgerDb,
    toolkit: Toolkit<'_>,
    options: EnrichOptions,
) -> Result<EnrichStats> {
    let mut companies = select_companies(db, &options).await?;
    if let Some(limit) = options.limit {
        companies.truncate(limit);
    }
    info!("Enriching {} companies", companies.len());

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
    let scraper = PageScraper::new(toolkit.fetcher, config.http.page_timeout());
    let extractor = ProfileExtractor::new(toolkit.oracle, config.extract.max_context_chars);

    let mut stats = EnrichStats::default();
    let pb = company_progress_bar(companies.len() as u64, "Enriching");

    for company in &companies {
        pb.set_message(company.name.clone());

        if company.domain().is_none() {
            warn!("Skipping {}: no website (run 'firmograph resolve')", company.name);
            stats.skipped += 1;
            pb.inc(1);
            continue;
        }

        match enrich_one(db, &orchestrator, &scraper, &extractor, company, options.relocate).await {
            Ok(report) => {
                match report.tier {
                    Tier::Sitemap => stats.sitemap_tier += 1,
                    Tier::Crawl => stats.crawl_tier += 1,
                }
                stats.cells_written += report.cells_written;
                stats.processed += 1;
                stats.companies.push(report);
            }
            Err(e) => {
                warn!("Failed to enrich {} (id {}): {}", company.name, company.id, e);
                stats.failed += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    Ok(stats)
}

async fn select_companies(db: &LedgerDb, options: &EnrichOptions) -> Result<Vec<Company>> {
    if options.ids.is_empty() {
        let companies = db.companies_with_domain(false).await?;
        return Ok(companies
            .into_iter()
            .filter(|c| c.enriched_at.is_none())
            .collect());
    }

    let mut companies = Vec::with_capacity(options.ids.len());
    for id in &options.ids {
        companies.push(db.get_company(*id).await?);
    }
    Ok(companies)
}

async fn enrich_one(
    db: &LedgerDb,
    orchestrator: &FallbackOrchestrator<'_>,
    scraper: &PageScraper<'_>,
    extractor: &ProfileExtractor<'_>,
    company: &Company,
    relocate: bool,
) -> Result<CompanyReport> {
    let Some(domain) = company.domain() else {
        return Err(crate::error::Error::InvalidWebsite(company.name.clone()));
    };

    let cached = if relocate {
        SitemapCache::Unknown
    } else {
        company.sitemap_cache()
    };

    let outcome = orchestrator
        .run(DiscoveryTarget {
            name: &company.name,
            domain: &domain,
            sitemap: cached.clone(),
        })
        .await;
    if outcome.sitemap != cached {
        db.set_sitemap(company.id, &outcome.sitemap).await?;
    }

    let urls = outcome.scrape_urls(&domain);
    let pages = scraper.scrape_all(&urls).await;
    let profile = extractor.extract(&outcome.evidence, &pages).await;

    let cells_written = db.apply_profile(company.id, &profile).await?;
    db.record_tier(company.id, outcome.tier).await?;

    info!(
        "{}: {} tier, {} pages, {} fields, {} cells written",
        company.name,
        outcome.tier,
        pages.len(),
        profile.filled(),
        cells_written
    );
    Ok(CompanyReport {
        id: company.id,
        name: company.name.clone(),
        tier: outcome.tier,
        paths: outcome.paths.len(),
        pages: pages.len(),
        fields_extracted: profile.filled(),
        cells_written,
    })
}

/// Print enrichment results to console
pub fn print_enrich_stats(stats: &EnrichStats) {
    println!("\nEnrichment complete:");
    println!("  Processed: {}", stats.processed);
    println!("    via sitemap: {}", stats.sitemap_tier);
    println!("    via crawl: {}", stats.crawl_tier);
    println!("  Skipped: {}", stats.skipped);
    println!("  Failed: {}", stats.failed);
    println!("  Cells written: {}", stats.cells_written);

    for report in &stats.companies {
        println!(
            "  • [{}] {} ({}): {} paths, {} pages, {} fields",
            report.id, report.name, report.tier, report.paths, report.pages, report.fields_extracted
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::testing::FixedCrawler;
    use crate::oracle::testing::ScriptedOracle;
    use crate::session::testing::StaticFetcher;
    use tempfile::TempDir;

    async fn ledger(tmp: &TempDir) -> (Config, LedgerDb) {
        let mut config = Config::default();
        config.paths.db_file = tmp.path().join("ledger.db");
        let db = LedgerDb::connect(&config).await.unwrap();
        db.init_schema().await.unwrap();
        (config, db)
    }

    #[tokio::test]
    async fn test_enrich_via_sitemap() {
        let tmp = TempDir::new().unwrap();
        let (config, db) = ledger(&tmp).await;
        let id = db.insert_company("Acme", Some("https://www.acme.com")).await.unwrap();
        db.insert_company("No Site", None).await.unwrap();

        let fetcher = StaticFetcher::new()
            .with(
                "https://acme.com/robots.txt",
                200,
                "text/plain",
                "Sitemap: https://acme.com/sitemap.xml",
            )
            .xml(
                "https://acme.com/sitemap.xml",
                r#"<urlset><url><loc>https://acme.com/about</loc></url><url><loc>https://acme.com/blog</loc></url></urlset>"#,
            )
            .html("https://acme.com/", "<body><p>Acme builds widgets.</p></body>")
            .html(
                "https://acme.com/about",
                "<body><p>Acme Ltd, 1 Main Street, London. 250 employees.</p></body>",
            );
        let oracle = ScriptedOracle::new([
            "/about",
            r#"{"industry": "Widgets", "city": "London", "employee_head_count": 250, "email": null}"#,
        ]);
        let crawler = FixedCrawler::new(&[]);
        let toolkit = Toolkit {
            fetcher: &fetcher,
            oracle: &oracle,
            crawler: &crawler,
            search: None,
        };

        let stats = cmd_enrich(&config, &db, toolkit, EnrichOptions::default())
            .await
            .unwrap();

        assert_eq!(stats.processed, 1);
        assert_eq!(stats.sitemap_tier, 1);
        assert_eq!(stats.cells_written, 3);
        assert_eq!(stats.companies[0].pages, 2);
        assert_eq!(crawler.calls(), 0);

        let company = db.get_company(id).await.unwrap();
        assert_eq!(company.industry.as_deref(), Some("Widgets"));
        assert_eq!(company.employee_head_count.as_deref(), Some("250"));
        assert_eq!(company.discovery_tier.as_deref(), Some("sitemap"));
        assert!(company.enriched_at.is_some());
        assert_eq!(
            company.sitemap_cache(),
            SitemapCache::Found("https://acme.com/sitemap.xml".to_string())
        );

        let extraction_prompt = &oracle.prompts()[1];
        assert!(extraction_prompt.contains("250 employees"));
        assert!(extraction_prompt.contains("Acme builds widgets."));

        let again = cmd_enrich(&config, &db, toolkit, EnrichOptions::default())
            .await
            .unwrap();
        assert_eq!(again.processed, 0);
    }

    #[tokio::test]
    async fn test_enrich_explicit_ids_with_crawl_fallback() {
        let tmp = TempDir::new().unwrap();
        let (config, db) = ledger(&tmp).await;
        let id = db.insert_company("Globex", Some("globex.com")).await.unwrap();
        db.set_sitemap(id, &SitemapCache::Absent).await.unwrap();
        db.apply_profile(
            id,
            &crate::extract::CompanyProfile {
                industry: Some("Energy".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let fetcher = StaticFetcher::new().html(
            "https://globex.com/contact",
            "<body>Globex, Springfield</body>",
        );
        let oracle = ScriptedOracle::new([
            "/contact",
            r#"{"industry": "Chemicals", "city": "Springfield"}"#,
        ]);
        let crawler = FixedCrawler::new(&["/contact", "/news"]);
        let toolkit = Toolkit {
            fetcher: &fetcher,
            oracle: &oracle,
            crawler: &crawler,
            search: None,
        };

        let options = EnrichOptions {
            ids: vec![id],
            ..EnrichOptions::default()
        };
        let stats = cmd_enrich(&config, &db, toolkit, options).await.unwrap();

        assert_eq!(stats.crawl_tier, 1);
        assert_eq!(stats.companies[0].pages, 1);
        assert!(fetcher.requested().iter().all(|u| !u.ends_with("robots.txt")));

        let company = db.get_company(id).await.unwrap();
        assert_eq!(company.industry.as_deref(), Some("Energy"));
        assert_eq!(company.city.as_deref(), Some("Springfield"));
        assert_eq!(company.discovery_tier.as_deref(), Some("crawl"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let (config, db) = ledger(&tmp).await;
        let fetcher = StaticFetcher::new();
        let oracle = ScriptedOracle::new(Vec::<String>::new());
        let crawler = FixedCrawler::new(&[]);
        let toolkit = Toolkit {
            fetcher: &fetcher,
            oracle: &oracle,
            crawler: &crawler,
            search: None,
        };

        let options = EnrichOptions {
            ids: vec![42],
            ..EnrichOptions::default()
        };
        assert!(cmd_enrich(&config, &db, toolkit, options).await.is_err());
    }
}
