//! Sitemap location from robots.txt and the conventional path

use crate::domain::Domain;
use crate::session::Fetcher;
use std::time::Duration;
use tracing::{debug, info};

const SITEMAP_DIRECTIVE: &str = "sitemap:";

/// Finds the sitemap URL a site advertises
pub struct SitemapLocator<'a> {
    fetcher: &'a dyn Fetcher,
    timeout: Duration,
}

impl<'a> SitemapLocator<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, timeout: Duration) -> Self {
        Self { fetcher, timeout }
    }

    /// Locate the sitemap for a domain
    ///
    /// Tries the bare host first, then the `www.` variant.
    pub async fn locate(&self, domain: &Domain) -> Option<String> {
        let bases: Vec<String> = domain
            .host_variants()
            .iter()
            .map(|host| format!("https://{}", host))
            .collect();
        let found = self.locate_in(&bases).await;
        match &found {
            Some(url) => info!("Sitemap for {}: {}", domain, url),
            None => info!("No sitemap found for {}", domain),
        }
        found
    }

    /// Locate the sitemap under a list of origins, in order
    ///
    /// Per origin: the first `Sitemap:` line of `/robots.txt`, then
    /// `/sitemap.xml` if it answers 200 with an XML content type. Network
    /// failures only mean "not here".
    pub async fn locate_in(&self, bases: &[String]) -> Option<String> {
        for base in bases {
            let base = base.trim_end_matches('/');

            if let Some(url) = self.from_robots(base).await {
                return Some(url);
            }

            let candidate = format!("{}/sitemap.xml", base);
            match self.fetcher.get(&candidate, self.timeout).await {
                Ok(response) if response.is_ok() && response.is_xml() => {
                    return Some(candidate);
                }
                Ok(response) => debug!(
                    "{} answered {} ({:?})",
                    candidate, response.status, response.content_type
                ),
                Err(e) => debug!("Failed to fetch {}: {}", candidate, e),
            }
        }
        None
    }

    async fn from_robots(&self, base: &str) -> Option<String> {
        let robots_url = format!("{}/robots.txt", base);
        match self.fetcher.get(&robots_url, self.timeout).await {
            Ok(response) if response.is_ok() => sitemap_directive(&response.body),
            Ok(response) => {
                debug!("{} answered {}", robots_url, response.status);
                None
            }
            Err(e) => {
                debug!("Failed to fetch {}: {}", robots_url, e);
                None
            }
        }
    }
}

/// Value of the first non-empty `Sitemap:` directive, case-insensitive
pub fn sitemap_directive(robots: &str) -> Option<String> {
    robots.lines().find_map(|line| {
        let line = line.trim();
        let head = line.get(..SITEMAP_DIRECTIVE.len())?;
        if !head.eq_ignore_ascii_case(SITEMAP_DIRECTIVE) {
            return None;
        }
        let value = line[SITEMAP_DIRECTIVE.len()..].trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}
