use serde::Deserialize;

/// Main configuration structure for Lingua-Crawl
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Scheme and host of the code-hosting site
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Per-request timeout (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Delay incurred after every fetch, successful or not (milliseconds)
    #[serde(rename = "pacing-delay-ms")]
    pub pacing_delay_ms: u64,

    /// Maximum number of repository pages fetched at once
    #[serde(rename = "max-concurrent-enrichments")]
    pub max_concurrent_enrichments: usize,

    /// Enrich each (owner, name) pair only once per run
    #[serde(rename = "dedupe-candidates")]
    pub dedupe_candidates: bool,

    /// Route requests through the request's proxy pool
    #[serde(rename = "use-proxies")]
    pub use_proxies: bool,

    /// Optional deadline for a whole crawl (milliseconds)
    #[serde(rename = "crawl-deadline-ms")]
    pub crawl_deadline_ms: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "https://github.com".to_string(),
            request_timeout_ms: 10_000,
            pacing_delay_ms: 500,
            max_concurrent_enrichments: 8,
            dedupe_candidates: false,
            use_proxies: true,
            crawl_deadline_ms: None,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "LinguaCrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/lingua-crawl".to_string(),
        }
    }
}

/// CSS selectors used to locate the language breakdown on a repository page
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Sections on the page; the last match holds the language list
    pub section: String,

    /// List items inside the section
    pub item: String,

    /// Language name inside an item; its next sibling span holds the percentage
    #[serde(rename = "language-name")]
    pub language_name: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            section: ".BorderGrid-row".to_string(),
            item: "li".to_string(),
            language_name: "span.text-bold".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving timestamped JSON reports
    #[serde(rename = "results-dir")]
    pub results_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_dir: "output_results".to_string(),
        }
    }
}
