//! Configuration management for firmograph
//!
//! Handles loading, saving, and validating configuration from TOML files.

mod defaults;

pub use defaults::*;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Language model used for path selection and extraction
    #[serde(default)]
    pub oracle: OracleConfig,

    /// HTTP session settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Search engine evidence settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Sitemap discovery and selection settings
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Profile extraction settings
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Paths configuration (internal, not user-editable)
    #[serde(skip)]
    pub paths: PathsConfig,
}

/// Oracle (language model) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Base URL of the Generative Language API
    #[serde(default = "default_oracle_api_base")]
    pub api_base: String,

    /// Model identifier
    #[serde(default = "default_oracle_model")]
    pub model: String,

    /// Environment variable name for the API key
    #[serde(default = "default_oracle_api_key_env")]
    pub api_key_env: String,

    /// Request timeout in seconds
    #[serde(default = "default_oracle_timeout")]
    pub timeout_secs: u64,

    /// Maximum requests per minute
    #[serde(default = "default_oracle_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Extra attempts after a failed request
    #[serde(default)]
    pub retries: usize,
}

/// HTTP session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User agent string
    #[serde(default = "default_http_user_agent")]
    pub user_agent: String,

    /// Timeout for robots.txt and /sitemap.xml probes (seconds)
    #[serde(default = "default_robots_timeout")]
    pub robots_timeout_secs: u64,

    /// Timeout for sitemap documents (seconds)
    #[serde(default = "default_sitemap_timeout")]
    pub sitemap_timeout_secs: u64,

    /// Timeout for HTML pages (seconds)
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,

    /// Requests per second per host
    #[serde(default = "default_rate_limit_per_host")]
    pub rate_limit_per_host: f64,
}

/// Search engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Collect search evidence at all
    #[serde(default = "default_search_enabled")]
    pub enabled: bool,

    /// DuckDuckGo HTML endpoint
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Region parameter (kl)
    #[serde(default = "default_search_region")]
    pub region: String,

    /// Request timeout (seconds)
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,

    /// Minimum pause after each query (milliseconds)
    #[serde(default = "default_search_min_delay")]
    pub min_delay_ms: u64,

    /// Maximum pause after each query (milliseconds)
    #[serde(default = "default_search_max_delay")]
    pub max_delay_ms: u64,

    /// Snippets and links kept per query
    #[serde(default = "default_search_results_per_query")]
    pub results_per_query: usize,
}

/// Discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Maximum sitemap index nesting followed from the root sitemap
    #[serde(default = "default_max_sitemap_depth")]
    pub max_sitemap_depth: usize,

    /// Maximum sitemap documents fetched in one walk
    #[serde(default = "default_max_sitemap_documents")]
    pub max_sitemap_documents: usize,

    /// Pages deeper than this many path segments are not candidates
    #[serde(default = "default_max_path_segments")]
    pub max_path_segments: usize,

    /// Apply the segment filter to crawled homepage links as well
    #[serde(default = "default_filter_crawled_links")]
    pub filter_crawled_links: bool,

    /// Candidate list is truncated to this many entries per prompt
    #[serde(default = "default_max_prompt_candidates")]
    pub max_prompt_candidates: usize,
}

/// Extraction configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Maximum characters of scraped page text in the extraction prompt
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,
}

/// Internal paths configuration
#[derive(Debug, Clone, Default)]
pub struct PathsConfig {
    /// Base directory for firmograph data
    pub base_dir: PathBuf,

    /// Path to config file
    pub config_file: PathBuf,

    /// Path to the SQLite ledger
    pub db_file: PathBuf,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_base: default_oracle_api_base(),
            model: default_oracle_model(),
            api_key_env: default_oracle_api_key_env(),
            timeout_secs: default_oracle_timeout(),
            requests_per_minute: default_oracle_requests_per_minute(),
            retries: 0,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_http_user_agent(),
            robots_timeout_secs: default_robots_timeout(),
            sitemap_timeout_secs: default_sitemap_timeout(),
            page_timeout_secs: default_page_timeout(),
            rate_limit_per_host: default_rate_limit_per_host(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: default_search_enabled(),
            endpoint: default_search_endpoint(),
            region: default_search_region(),
            timeout_secs: default_search_timeout(),
            min_delay_ms: default_search_min_delay(),
            max_delay_ms: default_search_max_delay(),
            results_per_query: default_search_results_per_query(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_sitemap_depth: default_max_sitemap_depth(),
            max_sitemap_documents: default_max_sitemap_documents(),
            max_path_segments: default_max_path_segments(),
            filter_crawled_links: default_filter_crawled_links(),
            max_prompt_candidates: default_max_prompt_candidates(),
        }
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_context_chars: default_max_context_chars(),
        }
    }
}

impl HttpConfig {
    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_secs)
    }

    pub fn sitemap_timeout(&self) -> Duration {
        Duration::from_secs(self.sitemap_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }
}

impl SearchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Get the default base directory for firmograph (~/.firmograph)
    pub fn default_base_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".firmograph")
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        Self::default_base_dir().join("config.toml")
    }

    /// Initialize paths configuration
    pub fn init_paths(&mut self, base_dir: Option<PathBuf>) {
        let base = base_dir.unwrap_or_else(Self::default_base_dir);
        self.paths = PathsConfig {
            config_file: base.join("config.toml"),
            db_file: base.join("ledger.db"),
            base_dir: base,
        };
    }

    /// Load configuration from a specific file path
    pub fn load(config_path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", config_path);

        if !config_path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                config_path.display()
            )));
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        let base = config_path
            .parent()
            .unwrap_or(Path::new("."))
            .to_path_buf();
        config.paths = PathsConfig {
            config_file: config_path.to_path_buf(),
            db_file: base.join("ledger.db"),
            base_dir: base,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific base directory
    pub fn load_from(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut config = Config::default();
        config.init_paths(base_dir);

        if config.paths.config_file.exists() {
            debug!("Loading config from {:?}", config.paths.config_file);
            let content = std::fs::read_to_string(&config.paths.config_file)?;
            let mut loaded: Config = toml::from_str(&content)?;
            loaded.paths = config.paths;
            config = loaded;
        } else {
            debug!("No config file found, using defaults");
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.paths.config_file.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&self.paths.config_file, content)?;
        info!("Saved config to {:?}", self.paths.config_file);
        Ok(())
    }

    /// Read the oracle API key from the environment
    pub fn oracle_api_key(&self) -> Result<String> {
        match std::env::var(&self.oracle.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(Error::MissingCredential(self.oracle.api_key_env.clone())),
        }
    }

    /// Check if firmograph is initialized (config and ledger exist)
    pub fn is_initialized(&self) -> bool {
        self.paths.config_file.exists() && self.paths.db_file.exists()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.http.rate_limit_per_host <= 0.0 {
            return Err(Error::Config(
                "http.rate_limit_per_host must be positive".to_string(),
            ));
        }

        if self.oracle.requests_per_minute == 0 {
            return Err(Error::Config(
                "oracle.requests_per_minute must be at least 1".to_string(),
            ));
        }

        if self.search.min_delay_ms > self.search.max_delay_ms {
            return Err(Error::Config(
                "search.min_delay_ms must be <= search.max_delay_ms".to_string(),
            ));
        }

        if self.discovery.max_sitemap_documents == 0 {
            return Err(Error::Config(
                "discovery.max_sitemap_documents must be at least 1".to_string(),
            ));
        }

        if self.discovery.max_prompt_candidates == 0 {
            return Err(Error::Config(
                "discovery.max_prompt_candidates must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
