//! Locate command: probe and cache company sitemaps

use crate::config::Config;
use crate::discovery::{SitemapCache, SitemapLocator};
use crate::error::Result;
use crate::ledger::LedgerDb;
use crate::progress::company_progress_bar;
use crate::session::Fetcher;
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, Serialize)]
pub struct LocateStats {
    pub found: usize,
    pub absent: usize,
    pub skipped: usize,
}

/// Probe sitemaps for companies never probed (or all with `force`)
pub async fn cmd_locate(
    config: &Config,
    db: &LedgerDb,
    fetcher: &dyn Fetcher,
    force: bool,
) -> Result<LocateStats> {
    let companies = db.companies_with_domain(!force).await?;
    let locator = SitemapLocator::new(fetcher, config.http.robots_timeout());

    let mut stats = LocateStats::default();
    let pb = company_progress_bar(companies.len() as u64, "Locating sitemaps");

    for company in &companies {
        pb.set_message(company.name.clone());
        let Some(domain) = company.domain() else {
            warn!("Skipping {}: unusable domain {:?}", company.name, company.domain);
            stats.skipped += 1;
            pb.inc(1);
            continue;
        };

        let cache = SitemapCache::from_located(locator.locate(&domain).await);
        match &cache {
            SitemapCache::Found(url) => {
                debug!("{}: {}", company.name, url);
                stats.found += 1;
            }
            _ => stats.absent += 1,
        }
        db.set_sitemap(company.id, &cache).await?;
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    Ok(stats)
}
