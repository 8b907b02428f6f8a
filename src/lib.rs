//! Lingua-Crawl: repository language composition harvester
//!
//! This crate searches a code-hosting site for repositories matching a set of
//! keywords, then visits every repository page to scrape its language
//! breakdown. One failing repository never aborts the run; the search itself
//! is the only load-bearing request.

pub mod config;
pub mod crawler;
pub mod input;
pub mod output;

use thiserror::Error;

/// Main error type for Lingua-Crawl operations
#[derive(Debug, Error)]
pub enum LinguaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Failed to retrieve search results from {url}: {source}")]
    SearchUnavailable { url: String, source: FetchError },

    #[error("Crawl exceeded its deadline of {millis}ms")]
    DeadlineExceeded { millis: u64 },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },
}

/// Failure of a single page retrieval
///
/// None of these are retried. The caller decides whether the failure is fatal
/// (the search page) or only drops one repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },

    #[error("Empty response body from {url}")]
    EmptyBody { url: String },
}

/// Raised when markup handed to the extractor is not usable text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("markup is empty")]
    Empty,

    #[error("markup is not valid UTF-8 text: {0}")]
    NotText(#[from] std::str::Utf8Error),

    #[error("language selectors unavailable: {0}")]
    Selectors(String),
}

/// Errors in the top-level JSON request
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Invalid input JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Invalid input format: {0}")]
    InvalidFormat(String),
}

/// Result type alias for Lingua-Crawl operations
pub type Result<T> = std::result::Result<T, LinguaError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{
    build_search_url, extract_candidates, extract_language_stats, select_proxy, CrawlReport,
    Crawler, EnrichedRepository, LanguageStats, RepositoryRef,
};
pub use input::{handle_input, CrawlRequest, Input, ObjectType};
