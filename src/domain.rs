//! Registrable domain derivation for company websites

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A company's normalized domain (e.g. `example.com`)
///
/// Subdomains are stripped down to the registrable domain, except under the
/// `.eu` registry where a non-`www` subdomain is kept (`shop.brand.eu`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Domain(String);

impl Domain {
    /// Derive the domain from a website URL or bare host name
    pub fn from_website(website: &str) -> Result<Self> {
        let trimmed = website.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidWebsite("empty website".to_string()));
        }

        let with_scheme = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let url = Url::parse(&with_scheme)
            .map_err(|e| Error::InvalidWebsite(format!("{}: {}", website, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::InvalidWebsite(format!("{}: no host", website)))?
            .trim_end_matches('.')
            .to_lowercase();

        Ok(Self(registrable_domain(&host)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host names probed for this domain: bare first, then `www.`
    pub fn host_variants(&self) -> Vec<String> {
        vec![self.0.clone(), format!("www.{}", self.0)]
    }

    /// Homepage URL on the bare domain
    pub fn homepage(&self) -> String {
        format!("https://{}/", self.0)
    }

    /// Whether `host` is this domain or one of its subdomains
    pub fn owns_host(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_lowercase();
        host == self.0 || host.ends_with(&format!(".{}", self.0))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn registrable_domain(host: &str) -> String {
    let host = host.strip_prefix("www.").unwrap_or(host);
    let Some(registrable) = psl::domain_str(host) else {
        return host.to_string();
    };

    let suffix = psl::suffix_str(host).unwrap_or_default();
    if suffix == "eu" && host != registrable {
        return host.to_string();
    }

    registrable.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_subdomains() {
        let domain = Domain::from_website("https://www.shop.example.com/about?x=1").unwrap();
        assert_eq!(domain.as_str(), "example.com");
    }

    #[test]
    fn test_multi_label_suffix() {
        let domain = Domain::from_website("blog.acme.co.uk").unwrap();
        assert_eq!(domain.as_str(), "acme.co.uk");
    }

    #[test]
    fn test_eu_keeps_subdomain() {
        let domain = Domain::from_website("https://shop.brand.eu/").unwrap();
        assert_eq!(domain.as_str(), "shop.brand.eu");

        let domain = Domain::from_website("https://www.brand.eu/").unwrap();
        assert_eq!(domain.as_str(), "brand.eu");
    }

    #[test]
    fn test_eu_substring_is_not_eu_registry() {
        let domain = Domain::from_website("https://app.neuron.com").unwrap();
        assert_eq!(domain.as_str(), "neuron.com");
    }

    #[test]
    fn test_host_variants() {
        let domain = Domain::from_website("Example.COM").unwrap();
        assert_eq!(
            domain.host_variants(),
            vec!["example.com".to_string(), "www.example.com".to_string()]
        );
        assert_eq!(domain.homepage(), "https://example.com/");
    }

    #[test]
    fn test_owns_host() {
        let domain = Domain::from_website("example.com").unwrap();
        assert!(domain.owns_host("example.com"));
        assert!(domain.owns_host("www.example.com"));
        assert!(!domain.owns_host("notexample.com"));
        assert!(!domain.owns_host("en.wikipedia.org"));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(Domain::from_website("   ").is_err());
    }
}
