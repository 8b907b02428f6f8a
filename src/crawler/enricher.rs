//! Repository enrichment
//!
//! Fetches one repository page and turns it into an [`EnrichedRepository`].
//! Every failure is absorbed here: the result is simply absent, and the
//! reason goes to the observer.

use crate::crawler::events::{CrawlEvent, CrawlObserver};
use crate::crawler::extractor::LanguageExtractor;
use crate::crawler::fetcher::PageFetcher;
use crate::crawler::model::{EnrichedRepository, RepositoryRef};
use crate::crawler::proxy::select_proxy;
use std::sync::Arc;

/// Builds the page URL of a repository: `{base}/{owner}/{name}/`
pub fn repository_url(base_url: &str, repo: &RepositoryRef) -> String {
    format!(
        "{}/{}/{}/",
        base_url.trim_end_matches('/'),
        repo.owner,
        repo.name
    )
}

/// Enriches repositories with their language breakdown
#[derive(Clone)]
pub struct RepositoryEnricher {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<LanguageExtractor>,
    observer: Arc<dyn CrawlObserver>,
    base_url: String,
    proxies: Arc<[String]>,
}

impl RepositoryEnricher {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: Arc<LanguageExtractor>,
        observer: Arc<dyn CrawlObserver>,
        base_url: impl Into<String>,
        proxies: Arc<[String]>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            observer,
            base_url: base_url.into(),
            proxies,
        }
    }

    /// Fetches and parses one repository page
    ///
    /// Returns `None` when the page cannot be fetched or its markup is
    /// unusable; the repository is then left out of the report.
    pub async fn enrich(&self, repo: RepositoryRef) -> Option<EnrichedRepository> {
        let url = repository_url(&self.base_url, &repo);
        let proxy = select_proxy(&self.proxies);

        self.observer.on_event(&CrawlEvent::FetchAttempted {
            url: url.clone(),
            proxy: proxy.map(str::to_string),
        });

        let body = match self.fetcher.fetch(&url, proxy).await {
            Ok(body) => body,
            Err(error) => {
                let reason = error.to_string();
                self.observer
                    .on_event(&CrawlEvent::FetchFailed { url: url.clone(), error });
                self.observer
                    .on_event(&CrawlEvent::RepositoryDropped { url, reason });
                return None;
            }
        };

        let language_stats = match self.extractor.extract(&body) {
            Ok(stats) => stats,
            Err(error) => {
                self.observer.on_event(&CrawlEvent::RepositoryDropped {
                    url,
                    reason: format!("unusable page markup: {}", error),
                });
                return None;
            }
        };

        self.observer.on_event(&CrawlEvent::RepositoryEnriched {
            url: url.clone(),
            languages: language_stats.len(),
        });

        Some(EnrichedRepository {
            url,
            owner: repo.owner,
            language_stats,
        })
    }
}
