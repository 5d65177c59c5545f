//! Custom error types for firmograph

use thiserror::Error;

/// Main error type for firmograph operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Sitemap error: {0}")]
    Sitemap(String),

    #[error("Oracle error: {0}")]
    Oracle(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid website: {0}")]
    InvalidWebsite(String),

    #[error("Missing credential: set the {0} environment variable")]
    MissingCredential(String),

    #[error("Company not found: {0}")]
    CompanyNotFound(i64),

    #[error("Not initialized: run 'firmograph init' first")]
    NotInitialized,

    #[error("Already initialized at {0}")]
    AlreadyInitialized(String),
}

/// Result type alias for firmograph
pub type Result<T> = std::result::Result<T, Error>;
