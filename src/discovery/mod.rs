//! Page discovery for company websites
//!
//! This module provides:
//! - Sitemap location from robots.txt and `/sitemap.xml`
//! - Bounded sitemap index resolution
//! - Oracle-driven relevance selection of candidate paths
//! - Search-engine evidence and homepage link crawling as fallback sources
//! - The tiered orchestrator tying them together

mod crawl;
mod locator;
mod orchestrator;
mod search;
mod select;
mod sitemap;

pub use crawl::*;
pub use locator::*;
pub use orchestrator::*;
pub use search::*;
pub use select::*;
pub use sitemap::*;
