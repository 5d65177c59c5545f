//! SQLite schema definition

/// SQL schema for the company ledger
pub const SCHEMA_SQL: &str = r#"
-- Companies: one row per company to enrich
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    website TEXT,
    domain TEXT,
    sitemap_url TEXT,
    sitemap_checked INTEGER NOT NULL DEFAULT 0,
    software_classification TEXT,
    enterprise_grade TEXT,
    industry TEXT,
    customers TEXT,
    employee_head_count TEXT,
    investors TEXT,
    geography TEXT,
    parent_company TEXT,
    street TEXT,
    postal_code TEXT,
    city TEXT,
    country TEXT,
    finance TEXT,
    email TEXT,
    phone TEXT,
    discovery_tier TEXT,
    enriched_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_companies_domain ON companies(domain);
CREATE INDEX IF NOT EXISTS idx_companies_enriched ON companies(enriched_at);
"#;

/// Cell values that count as "no answer yet"
pub const EMPTY_MARKERS: [&str; 4] = ["", "None", "[]", "Not found"];
