//! Company ledger storage using SQLite
//!
//! One row per company: identity and website, the cached sitemap state,
//! the fifteen profile columns and the tier that last enriched it.

mod schema;

pub use schema::*;

use crate::config::Config;
use crate::discovery::{SitemapCache, Tier};
use crate::domain::Domain;
use crate::error::{Error, Result};
use crate::extract::CompanyProfile;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, info, warn};

/// A company row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub website: Option<String>,
    pub domain: Option<String>,
    pub sitemap_url: Option<String>,
    pub sitemap_checked: bool,
    pub software_classification: Option<String>,
    pub enterprise_grade: Option<String>,
    pub industry: Option<String>,
    pub customers: Option<String>,
    pub employee_head_count: Option<String>,
    pub investors: Option<String>,
    pub geography: Option<String>,
    pub parent_company: Option<String>,
    pub street: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub finance: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub discovery_tier: Option<String>,
    pub enriched_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Company {
    pub fn sitemap_cache(&self) -> SitemapCache {
        match (&self.sitemap_url, self.sitemap_checked) {
            (Some(url), _) => SitemapCache::Found(url.clone()),
            (None, true) => SitemapCache::Absent,
            (None, false) => SitemapCache::Unknown,
        }
    }

    /// The stored domain, if it is usable
    pub fn domain(&self) -> Option<Domain> {
        self.domain
            .as_deref()
            .and_then(|d| Domain::from_website(d).ok())
    }

    pub fn profile(&self) -> CompanyProfile {
        CompanyProfile {
            software_classification: self.software_classification.clone(),
            enterprise_grade: self.enterprise_grade.clone(),
            industry: self.industry.clone(),
            customers: self.customers.clone(),
            employee_head_count: self.employee_head_count.clone(),
            investors: self.investors.clone(),
            geography: self.geography.clone(),
            parent_company: self.parent_company.clone(),
            street: self.street.clone(),
            postal_code: self.postal_code.clone(),
            city: self.city.clone(),
            country: self.country.clone(),
            finance: self.finance.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Whether a ledger cell still needs an answer
pub fn is_empty_cell(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => EMPTY_MARKERS.contains(&v.trim()),
    }
}

/// Ledger-wide counts
#[derive(Debug, Clone, Default, Serialize)]
pub struct LedgerStats {
    pub companies: i64,
    pub with_website: i64,
    pub sitemap_found: i64,
    pub sitemap_absent: i64,
    pub enriched: i64,
    pub sitemap_tier: i64,
    pub crawl_tier: i64,
}

/// Company ledger database
pub struct LedgerDb {
    pool: SqlitePool,
}

impl LedgerDb {
    /// Connect to the ledger database
    pub async fn connect(config: &Config) -> Result<Self> {
        let db_path = &config.paths.db_file;

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);

        debug!("Connecting to SQLite database at {:?}", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Initialize the database schema
    pub async fn init_schema(&self) -> Result<()> {
        info!("Initializing ledger schema");
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    /// Check if the ledger table exists
    pub async fn is_initialized(&self) -> Result<bool> {
        let result: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM sqlite_master WHERE type='table' AND name='companies'")
                .fetch_optional(&self.pool)
                .await?;
        Ok(result.is_some())
    }

    // ===== Company Operations =====

    /// Insert a company, deriving its domain from the website when given
    pub async fn insert_company(&self, name: &str, website: Option<&str>) -> Result<i64> {
        let now = Utc::now().to_rfc3339();
        let domain = website.and_then(|w| match Domain::from_website(w) {
            Ok(d) => Some(d.as_str().to_string()),
            Err(e) => {
                warn!("Ignoring website of {}: {}", name, e);
                None
            }
        });

        let result = sqlx::query(
            r#"
            INSERT INTO companies (name, website, domain, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(name.trim())
        .bind(website.map(str::trim))
        .bind(&domain)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get company by ID
    pub async fn get_company(&self, id: i64) -> Result<Company> {
        sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::CompanyNotFound(id))
    }

    /// List all companies in insertion order
    pub async fn list_companies(&self) -> Result<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    /// Companies without a usable domain
    pub async fn companies_without_domain(&self) -> Result<Vec<Company>> {
        let companies = sqlx::query_as::<_, Company>(
            "SELECT * FROM companies WHERE domain IS NULL OR domain = '' ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(companies)
    }

    /// Companies with a domain, optionally only those whose sitemap was never probed
    pub async fn companies_with_domain(&self, unprobed_only: bool) -> Result<Vec<Company>> {
        let sql = if unprobed_only {
            "SELECT * FROM companies WHERE domain IS NOT NULL AND domain != '' \
             AND sitemap_url IS NULL AND sitemap_checked = 0 ORDER BY id"
        } else {
            "SELECT * FROM companies WHERE domain IS NOT NULL AND domain != '' ORDER BY id"
        };
        let companies = sqlx::query_as::<_, Company>(sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(companies)
    }

    /// Set the website and its derived domain
    ///
    /// The sitemap cache is reset because it belongs to the old domain.
    pub async fn set_website(&self, id: i64, website: &str) -> Result<Domain> {
        let domain = Domain::from_website(website)?;
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET website = ?, domain = ?, sitemap_url = NULL, sitemap_checked = 0, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(website.trim())
        .bind(domain.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::CompanyNotFound(id));
        }
        Ok(domain)
    }

    /// Store the sitemap state
    pub async fn set_sitemap(&self, id: i64, sitemap: &SitemapCache) -> Result<()> {
        let (url, checked) = match sitemap {
            SitemapCache::Unknown => (None, false),
            SitemapCache::Absent => (None, true),
            SitemapCache::Found(url) => (Some(url.as_str()), true),
        };
        sqlx::query(
            "UPDATE companies SET sitemap_url = ?, sitemap_checked = ?, updated_at = ? WHERE id = ?",
        )
        .bind(url)
        .bind(checked)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record which discovery tier enriched the company
    pub async fn record_tier(&self, id: i64, tier: Tier) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "UPDATE companies SET discovery_tier = ?, enriched_at = ?, updated_at = ? WHERE id = ?",
        )
        .bind(tier.as_str())
        .bind(&now)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Write profile values into cells that are still empty
    ///
    /// Returns the number of cells written.
    pub async fn apply_profile(&self, id: i64, profile: &CompanyProfile) -> Result<u64> {
        let markers = EMPTY_MARKERS
            .iter()
            .map(|m| format!("'{}'", m))
            .collect::<Vec<_>>()
            .join(", ");

        let mut tx = self.pool.begin().await?;
        let mut written = 0;
        for (column, value) in profile.columns() {
            let Some(value) = value else { continue };
            let sql = format!(
                "UPDATE companies SET {col} = ? WHERE id = ? AND ({col} IS NULL OR TRIM({col}) IN ({markers}))",
                col = column,
                markers = markers,
            );
            let result = sqlx::query(&sql)
                .bind(value)
                .bind(id)
                .execute(&mut *tx)
                .await?;
            written += result.rows_affected();
        }

        sqlx::query("UPDATE companies SET updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!("Wrote {} profile cells for company {}", written, id);
        Ok(written)
    }

    // ===== Stats =====

    /// Ledger-wide counts
    pub async fn stats(&self) -> Result<LedgerStats> {
        let row: (i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN domain IS NOT NULL AND domain != '' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN sitemap_url IS NOT NULL THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN sitemap_url IS NULL AND sitemap_checked = 1 THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN enriched_at IS NOT NULL THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN discovery_tier = 'sitemap' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN discovery_tier = 'crawl' THEN 1 ELSE 0 END), 0)
            FROM companies
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(LedgerStats {
            companies: row.0,
            with_website: row.1,
            sitemap_found: row.2,
            sitemap_absent: row.3,
            enriched: row.4,
            sitemap_tier: row.5,
            crawl_tier: row.6,
        })
    }
}
