//! Crawler coordinator - main crawl orchestration logic
//!
//! One pass per request, nothing persisted between passes:
//! 1. Build the search URL
//! 2. Fetch the search response (the only fatal failure)
//! 3. Extract candidate repositories
//! 4. Enrich every candidate concurrently, each failure isolated
//! 5. Collect successes in completion order

use crate::config::Config;
use crate::crawler::enricher::RepositoryEnricher;
use crate::crawler::events::{CrawlEvent, CrawlObserver, TracingObserver};
use crate::crawler::extractor::{parse_search_response, partition_candidates, LanguageExtractor};
use crate::crawler::fetcher::{HttpFetcher, PacedFetcher, PageFetcher};
use crate::crawler::model::{CrawlReport, RepositoryRef};
use crate::crawler::proxy::select_proxy;
use crate::input::{CrawlRequest, ObjectType};
use crate::LinguaError;
use futures::{future, stream, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

/// Builds the search URL for a keyword query
///
/// Keywords are joined with `+` as given; an empty keyword list produces a
/// degenerate `q=` query rather than an error.
///
/// # Example
///
/// ```
/// use lingua_crawl::crawler::build_search_url;
/// use lingua_crawl::ObjectType;
///
/// let url = build_search_url("https://github.com", &["python", "asyncio"], ObjectType::Repository);
/// assert_eq!(url, "https://github.com/search?q=python+asyncio&type=repositories");
/// ```
pub fn build_search_url<S: AsRef<str>>(
    base_url: &str,
    keywords: &[S],
    object_type: ObjectType,
) -> String {
    let query = keywords
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("+");

    format!(
        "{}/search?q={}&type={}",
        base_url.trim_end_matches('/'),
        query,
        object_type.query_token()
    )
}

/// Main crawler structure
pub struct Crawler {
    config: Arc<Config>,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<LanguageExtractor>,
    observer: Arc<dyn CrawlObserver>,
}

impl Crawler {
    /// Creates a crawler fetching over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to crawl
    /// * `Err(LinguaError)` - Invalid selectors or HTTP client setup failure
    pub fn new(config: Config) -> Result<Self, LinguaError> {
        Self::with_proxies(config, &[])
    }

    /// Creates a crawler fetching over HTTP with clients for `pool` ready
    pub fn with_proxies(config: Config, pool: &[String]) -> Result<Self, LinguaError> {
        let config = Arc::new(config);
        let fetcher = HttpFetcher::with_proxies(config.clone(), pool)?;
        Self::build(config, Arc::new(fetcher))
    }

    /// Creates a crawler on top of any page fetcher
    ///
    /// The configured pacing delay is applied around `fetcher`.
    pub fn with_fetcher(
        config: Config,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, LinguaError> {
        Self::build(Arc::new(config), fetcher)
    }

    fn build(config: Arc<Config>, fetcher: Arc<dyn PageFetcher>) -> Result<Self, LinguaError> {
        let extractor = LanguageExtractor::from_config(&config.selectors)?;
        let delay = Duration::from_millis(config.crawler.pacing_delay_ms);

        Ok(Self {
            fetcher: Arc::new(PacedFetcher::new(fetcher, delay)),
            extractor: Arc::new(extractor),
            observer: Arc::new(TracingObserver),
            config,
        })
    }

    /// Replaces the default `tracing` observer
    pub fn with_observer(mut self, observer: Arc<dyn CrawlObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The search URL this crawler would fetch for `request`
    pub fn search_url(&self, request: &CrawlRequest) -> String {
        build_search_url(
            &self.config.crawler.base_url,
            request.keywords(),
            request.object_type(),
        )
    }

    /// Runs a complete crawl for one request
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Enriched repositories, possibly empty
    /// * `Err(LinguaError::SearchUnavailable)` - The search page could not be fetched
    /// * `Err(LinguaError::DeadlineExceeded)` - The configured crawl deadline passed
    pub async fn crawl(&self, request: &CrawlRequest) -> Result<CrawlReport, LinguaError> {
        let Some(millis) = self.config.crawler.crawl_deadline_ms else {
            return self.run(request).await;
        };

        match tokio::time::timeout(Duration::from_millis(millis), self.run(request)).await {
            Ok(result) => result,
            Err(_) => {
                let error = LinguaError::DeadlineExceeded { millis };
                self.observer.on_event(&CrawlEvent::CrawlAborted {
                    reason: error.to_string(),
                });
                Err(error)
            }
        }
    }

    async fn run(&self, request: &CrawlRequest) -> Result<CrawlReport, LinguaError> {
        let url = self.search_url(request);
        self.observer
            .on_event(&CrawlEvent::SearchStarted { url: url.clone() });

        let proxies: Arc<[String]> = if self.config.crawler.use_proxies {
            request.proxies().into()
        } else {
            Arc::from(Vec::new())
        };

        let proxy = select_proxy(&proxies);
        self.observer.on_event(&CrawlEvent::FetchAttempted {
            url: url.clone(),
            proxy: proxy.map(str::to_string),
        });

        let body = match self.fetcher.fetch(&url, proxy).await {
            Ok(body) => body,
            Err(source) => {
                self.observer.on_event(&CrawlEvent::FetchFailed {
                    url: url.clone(),
                    error: source.clone(),
                });
                let error = LinguaError::SearchUnavailable { url, source };
                self.observer.on_event(&CrawlEvent::CrawlAborted {
                    reason: error.to_string(),
                });
                return Err(error);
            }
        };

        let candidates = self.extract_candidates(&body);
        let total = candidates.len();

        let enricher = RepositoryEnricher::new(
            self.fetcher.clone(),
            self.extractor.clone(),
            self.observer.clone(),
            self.config.crawler.base_url.clone(),
            proxies,
        );

        let report: CrawlReport = stream::iter(candidates)
            .map(|candidate| enricher.enrich(candidate))
            .buffer_unordered(self.config.crawler.max_concurrent_enrichments.max(1))
            .filter_map(future::ready)
            .collect()
            .await;

        self.observer.on_event(&CrawlEvent::CrawlCompleted {
            enriched: report.len(),
            dropped: total - report.len(),
        });

        Ok(report)
    }

    /// Parses the search body and applies the duplicate policy
    fn extract_candidates(&self, body: &str) -> Vec<RepositoryRef> {
        let response = parse_search_response(body);
        let (mut candidates, skipped) = partition_candidates(&response);

        for index in skipped {
            self.observer
                .on_event(&CrawlEvent::CandidateSkipped { index });
        }

        if self.config.crawler.dedupe_candidates {
            let mut seen = HashSet::new();
            candidates.retain(|candidate| {
                let first = seen.insert(candidate.clone());
                if !first {
                    self.observer.on_event(&CrawlEvent::DuplicateCandidate {
                        owner: candidate.owner.clone(),
                        name: candidate.name.clone(),
                    });
                }
                first
            });
        }

        self.observer.on_event(&CrawlEvent::CandidatesExtracted {
            count: candidates.len(),
        });

        candidates
    }
}
