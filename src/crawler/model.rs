//! Records produced and consumed by the crawl pipeline

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A repository named by a search result, not yet enriched
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    pub owner: String,
    pub name: String,
}

impl RepositoryRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

/// Language name to display percentage, in page order
///
/// Percentages stay as the text shown on the page (`"42.3%"`). Inserting a
/// language twice keeps its first position and the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageStats(IndexMap<String, String>);

impl LanguageStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, language: impl Into<String>, percentage: impl Into<String>) {
        self.0.insert(language.into(), percentage.into());
    }

    pub fn get(&self, language: &str) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates `(language, percentage)` pairs in page order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LanguageStats {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut stats = Self::new();
        for (language, percentage) in iter {
            stats.insert(language, percentage);
        }
        stats
    }
}

/// A repository with its scraped language breakdown
///
/// Serialized as `{"url": .., "extra": {"owner": .., "language_stats": {..}}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "EnrichedRecord", from = "EnrichedRecord")]
pub struct EnrichedRepository {
    pub url: String,
    pub owner: String,
    pub language_stats: LanguageStats,
}

#[derive(Serialize, Deserialize)]
struct EnrichedRecord {
    url: String,
    extra: EnrichedExtra,
}

#[derive(Serialize, Deserialize)]
struct EnrichedExtra {
    owner: String,
    #[serde(default)]
    language_stats: LanguageStats,
}

impl From<EnrichedRepository> for EnrichedRecord {
    fn from(repo: EnrichedRepository) -> Self {
        Self {
            url: repo.url,
            extra: EnrichedExtra {
                owner: repo.owner,
                language_stats: repo.language_stats,
            },
        }
    }
}

impl From<EnrichedRecord> for EnrichedRepository {
    fn from(record: EnrichedRecord) -> Self {
        Self {
            url: record.url,
            owner: record.extra.owner,
            language_stats: record.extra.language_stats,
        }
    }
}

/// Successful enrichments in completion order
pub type CrawlReport = Vec<EnrichedRepository>;
