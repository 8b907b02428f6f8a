//! Crawler module for searching and enriching repositories
//!
//! This module contains the core pipeline, including:
//! - Proxy selection per request
//! - HTTP fetching with timeout, pacing and error normalization
//! - Tolerant extraction of search candidates and language breakdowns
//! - Per-repository enrichment with failure isolation
//! - Overall crawl coordination with bounded fan-out

mod coordinator;
mod enricher;
pub mod events;
mod extractor;
mod fetcher;
mod model;
mod proxy;

pub use coordinator::{build_search_url, Crawler};
pub use enricher::{repository_url, RepositoryEnricher};
pub use events::{CrawlEvent, CrawlObserver, RecordingObserver, TracingObserver};
pub use extractor::{
    extract_candidates, extract_language_stats, extract_language_stats_bytes,
    parse_search_response, partition_candidates, LanguageExtractor,
};
pub use fetcher::{build_http_client, HttpFetcher, PacedFetcher, PageFetcher};
pub use model::{CrawlReport, EnrichedRepository, LanguageStats, RepositoryRef};
pub use proxy::select_proxy;

use crate::config::Config;
use crate::input::CrawlRequest;
use crate::LinguaError;

/// Runs a complete crawl with the HTTP fetcher
///
/// This is the main entry point for a one-off crawl. It will:
/// 1. Build the HTTP client
/// 2. Fetch and parse the search results
/// 3. Enrich every repository found
/// 4. Return the successful enrichments
///
/// # Example
///
/// ```no_run
/// use lingua_crawl::{Config, CrawlRequest, ObjectType};
/// use lingua_crawl::crawler::crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let request = CrawlRequest::new(vec!["python".into()], vec![], ObjectType::Repository)?;
/// let report = crawl(Config::default(), &request).await?;
/// println!("{} repositories", report.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: Config, request: &CrawlRequest) -> Result<CrawlReport, LinguaError> {
    Crawler::new(config)?.crawl(request).await
}
