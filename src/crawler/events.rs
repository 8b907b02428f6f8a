//! Diagnostic events emitted while crawling
//!
//! The crawler never writes to a global logger directly. It reports to an
//! injected [`CrawlObserver`]; [`TracingObserver`] forwards events to
//! `tracing`, and [`RecordingObserver`] keeps them for inspection in tests.

use crate::FetchError;
use std::sync::Mutex;

/// Something worth reporting during a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    /// The search query was built and is about to be fetched
    SearchStarted { url: String },

    /// A page fetch is about to be issued
    FetchAttempted { url: String, proxy: Option<String> },

    /// A page fetch failed
    FetchFailed { url: String, error: FetchError },

    /// A search result entry lacked an owner or a name
    CandidateSkipped { index: usize },

    /// A repository listed more than once was dropped by deduplication
    DuplicateCandidate { owner: String, name: String },

    /// Candidate extraction finished
    CandidatesExtracted { count: usize },

    /// A repository could not be enriched and is left out of the report
    RepositoryDropped { url: String, reason: String },

    /// A repository was enriched
    RepositoryEnriched { url: String, languages: usize },

    /// The whole crawl failed
    CrawlAborted { reason: String },

    /// The crawl finished; `dropped` repositories failed enrichment
    CrawlCompleted { enriched: usize, dropped: usize },
}

/// Receiver of crawl diagnostics
pub trait CrawlObserver: Send + Sync {
    fn on_event(&self, event: &CrawlEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn on_event(&self, event: &CrawlEvent) {
        match event {
            CrawlEvent::SearchStarted { url } => tracing::info!("Crawling URL: {}", url),
            CrawlEvent::FetchAttempted { url, proxy } => match proxy {
                Some(proxy) => tracing::debug!("Fetching {} via proxy {}", url, proxy),
                None => tracing::debug!("Fetching {}", url),
            },
            CrawlEvent::FetchFailed { url, error } => {
                tracing::warn!("Fetch failed for {}: {}", url, error)
            }
            CrawlEvent::CandidateSkipped { index } => {
                tracing::debug!("Skipping malformed search result at index {}", index)
            }
            CrawlEvent::DuplicateCandidate { owner, name } => {
                tracing::debug!("Skipping duplicate repository {}/{}", owner, name)
            }
            CrawlEvent::CandidatesExtracted { count } => {
                tracing::info!("Found {} repositories", count)
            }
            CrawlEvent::RepositoryDropped { url, reason } => {
                tracing::warn!("Dropping {}: {}", url, reason)
            }
            CrawlEvent::RepositoryEnriched { url, languages } => {
                tracing::debug!("Enriched {} ({} languages)", url, languages)
            }
            CrawlEvent::CrawlAborted { reason } => tracing::error!("Crawl aborted: {}", reason),
            CrawlEvent::CrawlCompleted { enriched, dropped } => tracing::info!(
                "Crawl completed: {} repositories enriched, {} dropped",
                enriched,
                dropped
            ),
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<CrawlEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl CrawlObserver for RecordingObserver {
    fn on_event(&self, event: &CrawlEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
