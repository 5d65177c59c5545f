//! Resolve command: find websites for companies that have none

use crate::discovery::SearchLinkCollector;
use crate::error::Result;
use crate::ledger::{Company, LedgerDb};
use crate::progress::company_progress_bar;
use serde::Serialize;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ResolveStats {
    pub resolved: usize,
    pub unresolved: usize,
}

/// Query used to find a company's website
pub fn website_query(name: &str) -> String {
    format!("{} official website", name)
}

/// Origin of the first search result for the company
pub async fn find_website(search: &dyn SearchLinkCollector, name: &str) -> Option<String> {
    let hits = search.search(&website_query(name)).await?;
    hits.links.iter().find_map(|link| {
        let url = Url::parse(link).ok()?;
        url.host_str()?;
        Some(url.origin().ascii_serialization())
    })
}

/// Search for websites of companies without a domain (or all with `force`)
pub async fn cmd_resolve(
    db: &LedgerDb,
    search: &dyn SearchLinkCollector,
    force: bool,
) -> Result<ResolveStats> {
    let companies: Vec<Company> = if force {
        db.list_companies().await?
    } else {
        db.companies_without_domain().await?
    };

    let mut stats = ResolveStats::default();
    let pb = company_progress_bar(companies.len() as u64, "Resolving websites");

    for company in &companies {
        pb.set_message(company.name.clone());
        match find_website(search, &company.name).await {
            Some(website) => match db.set_website(company.id, &website).await {
                Ok(domain) => {
                    info!("{} -> {}", company.name, domain);
                    stats.resolved += 1;
                }
                Err(e) => {
                    warn!("Could not store website for {}: {}", company.name, e);
                    stats.unresolved += 1;
                }
            },
            None => {
                warn!("No website found for {}", company.name);
                stats.unresolved += 1;
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    Ok(stats)
}
