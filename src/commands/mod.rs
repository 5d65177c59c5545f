//! CLI commands implementation

pub mod discover;
pub mod enrich;
pub mod import;
pub mod init;
pub mod locate;
pub mod resolve;
pub mod status;

pub use discover::*;
pub use enrich::*;
pub use import::*;
pub use init::*;
pub use locate::*;
pub use resolve::*;
pub use status::*;

use crate::discovery::{LinkCrawler, SearchLinkCollector};
use crate::oracle::Oracle;
use crate::session::Fetcher;

/// External capabilities lent to the discovery and enrichment commands
#[derive(Clone, Copy)]
pub struct Toolkit<'a> {
    pub fetcher: &'a dyn Fetcher,
    pub oracle: &'a dyn Oracle,
    pub crawler: &'a dyn LinkCrawler,
    /// `None` when search evidence is disabled
    pub search: Option<&'a dyn SearchLinkCollector>,
}
