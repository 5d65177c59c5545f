//! Import command implementation

use crate::error::Result;
use crate::ledger::LedgerDb;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// One company line: `name` or `name,website`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyLine {
    pub name: String,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportStats {
    pub imported: usize,
    pub skipped: usize,
}

/// Parse a company list; blank lines and `#` comments are ignored
pub fn parse_company_lines(text: &str) -> Vec<CompanyLine> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (name, website) = match line.split_once(',') {
                Some((name, website)) => (name.trim(), Some(website.trim())),
                None => (line, None),
            };
            if name.is_empty() {
                warn!("Skipping line without a company name: {:?}", line);
                return None;
            }
            Some(CompanyLine {
                name: name.to_string(),
                website: website.filter(|w| !w.is_empty()).map(str::to_string),
            })
        })
        .collect()
}

/// Add companies from a text file to the ledger
pub async fn cmd_import(db: &LedgerDb, path: &Path) -> Result<ImportStats> {
    let text = std::fs::read_to_string(path)?;
    let lines = parse_company_lines(&text);
    let total_lines = text
        .lines()
        .filter(|l| !l.trim().is_empty() && !l.trim().starts_with('#'))
        .count();

    let mut stats = ImportStats {
        skipped: total_lines - lines.len(),
        ..ImportStats::default()
    };
    for line in &lines {
        db.insert_company(&line.name, line.website.as_deref()).await?;
        stats.imported += 1;
    }

    info!("Imported {} companies from {:?}", stats.imported, path);
    Ok(stats)
}
