//! firmograph - A CLI tool that enriches a company list with firmographic data
//!
//! This crate provides:
//! - Sitemap location and bounded sitemap index resolution
//! - Language-model selection of the pages worth reading, with a homepage
//!   crawl fallback and search-engine evidence
//! - Page scraping and structured profile extraction into a SQLite ledger

pub mod commands;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod oracle;
pub mod paths;
pub mod progress;
pub mod scrape;
pub mod session;

pub use config::Config;
pub use error::{Error, Result};
