//! Language-model oracle
//!
//! The oracle is a stateless single-shot text generator. Prompt construction
//! and response parsing belong to the callers (`select`, `extract`).

pub mod parse;

use crate::config::OracleConfig;
use crate::error::{Error, Result};
use crate::session::MinuteRateLimiter;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

#[async_trait]
pub trait Oracle: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> String {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default()
    }
}

/// Gemini `generateContent` client
pub struct GeminiOracle {
    client: Client,
    endpoint: Url,
    api_key: String,
    retries: usize,
    limiter: MinuteRateLimiter,
}

impl GeminiOracle {
    pub fn new(config: &OracleConfig, api_key: String) -> Result<Self> {
        let base = Url::parse(&config.api_base)?;
        let endpoint = base
            .join(&format!("/v1beta/models/{}:generateContent", config.model))
            .map_err(|e| Error::Config(format!("Invalid oracle URL: {}", e)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
            retries: config.retries,
            limiter: MinuteRateLimiter::new(config.requests_per_minute),
        })
    }

    async fn send_once(&self, request: &GenerateRequest<'_>) -> Result<String> {
        self.limiter.wait().await;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?;

        let parsed: GenerateResponse = response.json().await?;
        Ok(parsed.into_text())
    }
}

#[async_trait]
impl Oracle for GeminiOracle {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let mut last_err: Option<Error> = None;
        for attempt in 0..=self.retries {
            match self.send_once(&request).await {
                Ok(text) => {
                    debug!("Oracle answered with {} chars", text.len());
                    return Ok(text);
                }
                Err(e) => {
                    warn!("Oracle request failed (attempt {}): {}", attempt + 1, e);
                    last_err = Some(Error::Oracle(e.to_string()));
                }
            }

            if attempt < self.retries {
                tokio::time::sleep(Duration::from_millis(500 * (attempt + 1) as u64)).await;
            }
        }

        Err(last_err.unwrap_or_else(|| Error::Oracle("Oracle request failed".to_string())))
    }
}
