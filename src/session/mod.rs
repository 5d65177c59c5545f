//! The run-scoped HTTP session
//!
//! One [`Session`] is opened per command run and lent by reference to every
//! component that touches the network (locator, resolver, search, crawler,
//! scraper). Components depend on the [`Fetcher`] trait, not on the session.

mod rate_limit;

pub use rate_limit::*;

use crate::config::HttpConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

/// Status, declared content type and body of a GET
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl FetchedResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Whether the declared content type mentions xml
    pub fn is_xml(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("xml"))
    }
}

/// `GET url` with a per-request timeout
///
/// Timeouts and connection failures are `Err`; any HTTP status, including
/// errors, is a successful fetch that callers inspect.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedResponse>;
}

/// Shared HTTP session with cookie store and per-host pacing
pub struct Session {
    client: Client,
    rate_limit_per_host: f64,
    rate_limiters: Mutex<HashMap<String, HostRateLimiter>>,
}

impl Session {
    /// Open a new session
    pub fn open(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| Error::Fetch(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rate_limit_per_host: config.rate_limit_per_host,
            rate_limiters: Mutex::new(HashMap::new()),
        })
    }

    async fn rate_limit(&self, host: &str) {
        let limiter = {
            let mut limiters = self.rate_limiters.lock().await;
            limiters
                .entry(host.to_string())
                .or_insert_with(|| HostRateLimiter::new(self.rate_limit_per_host))
                .clone()
        };

        limiter.wait().await;
    }
}

#[async_trait]
impl Fetcher for Session {
    async fn get(&self, url: &str, timeout: Duration) -> Result<FetchedResponse> {
        let parsed = Url::parse(url)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| Error::Fetch(format!("URL has no host: {}", url)))?;

        self.rate_limit(host).await;

        debug!("Fetching: {}", url);
        let response = self.client.get(parsed.clone()).timeout(timeout).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response.text().await?;

        Ok(FetchedResponse {
            status,
            content_type,
            body,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> HttpConfig {
        HttpConfig {
            rate_limit_per_host: 1000.0,
            ..HttpConfig::default()
        }
    }

    #[tokio::test]
    async fn test_fetch_reports_status_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sitemap.xml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<urlset/>".as_bytes().to_vec(), "application/xml"),
            )
            .mount(&server)
            .await;

        let session = Session::open(&test_config()).unwrap();
        let response = session
            .get(&format!("{}/sitemap.xml", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();

        assert!(response.is_ok());
        assert!(response.is_xml());
        assert_eq!(response.body, "<urlset/>");
    }

    #[tokio::test]
    async fn test_error_status_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let session = Session::open(&test_config()).unwrap();
        let response = session
            .get(&format!("{}/robots.txt", server.uri()), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(response.status, 404);
        assert!(!response.is_ok());
    }

    #[tokio::test]
    async fn test_timeout_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let session = Session::open(&test_config()).unwrap();
        let result = session
            .get(&format!("{}/slow", server.uri()), Duration::from_millis(50))
            .await;

        assert!(result.is_err());
    }
}
