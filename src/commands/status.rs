//! Status and listing commands

use crate::config::Config;
use crate::error::Result;
use crate::ledger::{Company, LedgerDb, LedgerStats};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize)]
pub struct StatusInfo {
    pub config_path: PathBuf,
    pub db_path: PathBuf,
    pub oracle_model: String,
    pub search_enabled: bool,
    pub stats: LedgerStats,
}

/// Gather ledger status
pub async fn cmd_status(config: &Config, db: &LedgerDb) -> Result<StatusInfo> {
    Ok(StatusInfo {
        config_path: config.paths.config_file.clone(),
        db_path: config.paths.db_file.clone(),
        oracle_model: config.oracle.model.clone(),
        search_enabled: config.search.enabled,
        stats: db.stats().await?,
    })
}

/// List all companies in the ledger
pub async fn cmd_list_companies(db: &LedgerDb) -> Result<Vec<Company>> {
    db.list_companies().await
}

/// Print status to console
pub fn print_status(status: &StatusInfo) {
    let stats = &status.stats;
    println!("firmograph status");
    println!("  Config: {}", status.config_path.display());
    println!("  Ledger: {}", status.db_path.display());
    println!("  Oracle model: {}", status.oracle_model);
    println!(
        "  Search evidence: {}",
        if status.search_enabled { "enabled" } else { "disabled" }
    );
    println!();
    println!("Companies: {}", stats.companies);
    println!("  With website: {}", stats.with_website);
    println!("  Sitemap found: {}", stats.sitemap_found);
    println!("  Sitemap absent: {}", stats.sitemap_absent);
    println!("  Enriched: {}", stats.enriched);
    println!("    via sitemap: {}", stats.sitemap_tier);
    println!("    via crawl: {}", stats.crawl_tier);
}

/// Print the company list to console
pub fn print_companies(companies: &[Company]) {
    if companies.is_empty() {
        println!("No companies in the ledger. Use 'firmograph import' to add some.");
        return;
    }

    println!("Companies:");
    for company in companies {
        let sitemap = match (&company.sitemap_url, company.sitemap_checked) {
            (Some(_), _) => "sitemap",
            (None, true) => "no sitemap",
            (None, false) => "unprobed",
        };
        println!(
            "  [{}] {} ({}, {}, {} of 15 fields{})",
            company.id,
            company.name,
            company.domain.as_deref().unwrap_or("no website"),
            sitemap,
            company.profile().filled(),
            company
                .discovery_tier
                .as_deref()
                .map(|t| format!(", via {}", t))
                .unwrap_or_default()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::{SitemapCache, Tier};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_status_counts() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.init_paths(Some(tmp.path().to_path_buf()));
        let db = LedgerDb::connect(&config).await.unwrap();
        db.init_schema().await.unwrap();

        let id = db.insert_company("Acme", Some("acme.com")).await.unwrap();
        db.insert_company("Globex", None).await.unwrap();
        db.set_sitemap(id, &SitemapCache::Absent).await.unwrap();
        db.record_tier(id, Tier::Crawl).await.unwrap();

        let status = cmd_status(&config, &db).await.unwrap();
        assert_eq!(status.db_path, tmp.path().join("ledger.db"));
        assert_eq!(status.stats.companies, 2);
        assert_eq!(status.stats.sitemap_absent, 1);
        assert_eq!(status.stats.crawl_tier, 1);

        let companies = cmd_list_companies(&db).await.unwrap();
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0].discovery_tier.as_deref(), Some("crawl"));
    }
}
