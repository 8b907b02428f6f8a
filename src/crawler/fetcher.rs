//! HTTP fetcher implementation
//!
//! This module handles all page retrievals for the crawler:
//! - Building HTTP clients with the crawler's user agent and timeout
//! - Routing a request through an egress proxy when one is selected
//! - Normalizing every failure into a [`FetchError`]
//! - Pacing: a fixed delay after every fetch, successful or not
//!
//! Nothing here retries. A failed fetch is reported once and the caller
//! decides what it costs.

use crate::config::Config;
use crate::crawler::proxy::proxy_url;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// One network retrieval of a page body
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url`, through `proxy` when given, and returns the body text
    async fn fetch(&self, url: &str, proxy: Option<&str>) -> Result<String, FetchError>;
}

#[async_trait]
impl<F: PageFetcher + ?Sized> PageFetcher for Arc<F> {
    async fn fetch(&self, url: &str, proxy: Option<&str>) -> Result<String, FetchError> {
        (**self).fetch(url, proxy).await
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The crawler configuration (timeout and user agent)
/// * `proxy` - Optional `host:port` proxy every request of this client goes through
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client (e.g. malformed proxy)
///
/// # Example
///
/// ```no_run
/// use lingua_crawl::config::Config;
/// use lingua_crawl::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default(), None).unwrap();
/// ```
pub fn build_http_client(config: &Config, proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        config.user_agent.crawler_name,
        config.user_agent.crawler_version,
        config.user_agent.contact_url
    );

    let mut builder = Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_millis(config.crawler.request_timeout_ms))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy_url(proxy))?);
    }

    builder.build()
}

/// Fetcher backed by reqwest
///
/// Holds a client for direct connections and one client per proxy. Clients
/// for a known pool are built up front; a proxy first seen on a call gets its
/// client built then and kept, so connections are pooled per proxy.
pub struct HttpFetcher {
    config: Arc<Config>,
    direct: Client,
    proxied: RwLock<HashMap<String, Client>>,
}

impl HttpFetcher {
    pub fn new(config: Arc<Config>) -> Result<Self, reqwest::Error> {
        Self::with_proxies(config, &[])
    }

    /// Creates a fetcher with clients for every entry of `pool` ready
    ///
    /// An entry that cannot be turned into a proxy is left out here; fetching
    /// through it fails with `FetchError::Transport`.
    pub fn with_proxies(config: Arc<Config>, pool: &[String]) -> Result<Self, reqwest::Error> {
        let direct = build_http_client(&config, None)?;
        let mut proxied = HashMap::new();

        if config.crawler.use_proxies {
            for proxy in pool {
                match build_http_client(&config, Some(proxy)) {
                    Ok(client) => {
                        proxied.insert(proxy.clone(), client);
                    }
                    Err(e) => tracing::warn!("Unusable proxy {}: {}", proxy, e),
                }
            }
        }

        Ok(Self {
            config,
            direct,
            proxied: RwLock::new(proxied),
        })
    }

    fn client_for(&self, url: &str, proxy: Option<&str>) -> Result<Client, FetchError> {
        let proxy = match proxy {
            Some(proxy) if self.config.crawler.use_proxies => proxy,
            _ => return Ok(self.direct.clone()),
        };

        if let Some(client) = self
            .proxied
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(proxy)
        {
            return Ok(client.clone());
        }

        let client =
            build_http_client(&self.config, Some(proxy)).map_err(|e| FetchError::Transport {
                url: url.to_string(),
                message: format!("unusable proxy {}: {}", proxy, e),
            })?;

        Ok(self
            .proxied
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(proxy.to_string())
            .or_insert(client)
            .clone())
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, proxy: Option<&str>) -> Result<String, FetchError> {
        let client = self.client_for(url, proxy)?;

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(body)
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = error.status() {
        FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Applies a fixed delay after every fetch of the wrapped fetcher
///
/// The delay runs once the inner fetch resolves, whatever its outcome, and
/// before the call returns. Under bounded fan-out the caller's concurrency
/// slot stays occupied for the delay; concurrent calls are not spaced
/// against each other.
pub struct PacedFetcher<F> {
    inner: F,
    delay: Duration,
}

impl<F: PageFetcher> PacedFetcher<F> {
    pub fn new(inner: F, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for PacedFetcher<F> {
    async fn fetch(&self, url: &str, proxy: Option<&str>) -> Result<String, FetchError> {
        let outcome = self.inner.fetch(url, proxy).await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        outcome
    }
}
