//! Default values for configuration

/// Default Generative Language API base URL
pub fn default_oracle_api_base() -> String {
    std::env::var("FIRMOGRAPH_ORACLE_URL")
        .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string())
}

/// Default model used for path selection and extraction
pub fn default_oracle_model() -> String {
    "gemini-2.0-flash".to_string()
}

/// Default environment variable holding the oracle API key
pub fn default_oracle_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

/// Default oracle request timeout in seconds
pub fn default_oracle_timeout() -> u64 {
    60
}

/// Default oracle request budget per minute
pub fn default_oracle_requests_per_minute() -> u32 {
    15
}

/// Default user agent (desktop browser)
pub fn default_http_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string()
}

/// Default robots.txt and /sitemap.xml probe timeout in seconds
pub fn default_robots_timeout() -> u64 {
    5
}

/// Default sitemap document fetch timeout in seconds
pub fn default_sitemap_timeout() -> u64 {
    10
}

/// Default page fetch timeout in seconds (homepage crawl and scraping)
pub fn default_page_timeout() -> u64 {
    20
}

/// Default rate limit (requests per second per host)
pub fn default_rate_limit_per_host() -> f64 {
    4.0
}

/// Default DuckDuckGo HTML endpoint
pub fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".to_string()
}

/// Default search region
pub fn default_search_region() -> String {
    "uk-en".to_string()
}

/// Default: search evidence enabled
pub fn default_search_enabled() -> bool {
    true
}

/// Default search request timeout (seconds)
pub fn default_search_timeout() -> u64 {
    10
}

/// Default minimum pause after a search query (milliseconds)
pub fn default_search_min_delay() -> u64 {
    1000
}

/// Default maximum pause after a search query (milliseconds)
pub fn default_search_max_delay() -> u64 {
    3500
}

/// Default number of snippets and links kept per query
pub fn default_search_results_per_query() -> usize {
    2
}

/// Default maximum sitemap index nesting
pub fn default_max_sitemap_depth() -> usize {
    5
}

/// Default maximum sitemap documents fetched per walk
pub fn default_max_sitemap_documents() -> usize {
    200
}

/// Default maximum non-empty path segments for candidate pages
pub fn default_max_path_segments() -> usize {
    2
}

/// Default: crawled links get the same segment filter as sitemap URLs
pub fn default_filter_crawled_links() -> bool {
    true
}

/// Default maximum candidates listed in a single selection prompt
pub fn default_max_prompt_candidates() -> usize {
    3000
}

/// Default maximum characters of page text handed to the extractor
pub fn default_max_context_chars() -> usize {
    60_000
}
