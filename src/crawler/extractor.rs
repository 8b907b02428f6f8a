//! Extraction of search candidates and language breakdowns
//!
//! Both extractors are tolerant: they never assume a node is present. A
//! malformed search entry is skipped, a page without a language section
//! yields empty stats. Only unusable input text is an error.

use crate::config::{compile_selector, SelectorConfig};
use crate::crawler::model::{LanguageStats, RepositoryRef};
use crate::{ConfigError, ValidationError};
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::sync::LazyLock;

/// JSON pointer to the result list in a search payload
const RESULTS_POINTER: &str = "/payload/results";

/// Turns a raw search response into a JSON value
///
/// The body is either the JSON payload itself or an HTML page embedding it in
/// a `<script type="application/json">` element. A body holding neither
/// yields `Value::Null`, which extracts to zero candidates.
pub fn parse_search_response(raw: &str) -> Value {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return value;
    }

    let document = Html::parse_document(raw);
    let Ok(script_selector) = Selector::parse(r#"script[type="application/json"]"#) else {
        return Value::Null;
    };

    document
        .select(&script_selector)
        .filter_map(|script| {
            let text = script.text().collect::<String>();
            serde_json::from_str::<Value>(text.trim()).ok()
        })
        .find(|value| value.pointer(RESULTS_POINTER).is_some())
        .unwrap_or(Value::Null)
}

/// Extracts the repositories named by a search response
///
/// Walks `payload.results[*].repo.repository` and reads `owner_login` and
/// `name`. Entries missing either are skipped; a missing result list is an
/// empty sequence.
///
/// # Example
///
/// ```
/// use lingua_crawl::crawler::extract_candidates;
/// use serde_json::json;
///
/// let response = json!({"payload": {"results": [
///     {"repo": {"repository": {"owner_login": "rust-lang", "name": "rust"}}},
///     {"repo": {}}
/// ]}});
/// let refs = extract_candidates(&response);
/// assert_eq!(refs.len(), 1);
/// assert_eq!(refs[0].name, "rust");
/// ```
pub fn extract_candidates(response: &Value) -> Vec<RepositoryRef> {
    partition_candidates(response).0
}

/// Like [`extract_candidates`], also returning the indices of skipped entries
pub fn partition_candidates(response: &Value) -> (Vec<RepositoryRef>, Vec<usize>) {
    let entries = response
        .pointer(RESULTS_POINTER)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut candidates = Vec::with_capacity(entries.len());
    let mut skipped = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        match repository_ref(entry) {
            Some(candidate) => candidates.push(candidate),
            None => skipped.push(index),
        }
    }

    (candidates, skipped)
}

fn repository_ref(entry: &Value) -> Option<RepositoryRef> {
    let repository = entry.pointer("/repo/repository")?;
    let owner = non_empty_str(repository.get("owner_login")?)?;
    let name = non_empty_str(repository.get("name")?)?;
    Some(RepositoryRef::new(owner, name))
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Compiled selectors locating the language breakdown on a repository page
#[derive(Debug, Clone)]
pub struct LanguageExtractor {
    section: Selector,
    item: Selector,
    language_name: Selector,
}

impl LanguageExtractor {
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            section: compile_selector(&config.section)?,
            item: compile_selector(&config.item)?,
            language_name: compile_selector(&config.language_name)?,
        })
    }

    /// Extracts `{language: percentage}` pairs from repository page markup
    ///
    /// The language panel is the last section matching the section selector.
    /// Within it, every item contributes one entry when it holds both a name
    /// element and, as that element's next sibling, a `span` with the
    /// percentage.
    ///
    /// # Errors
    ///
    /// `ValidationError::Empty` when the markup is empty or only whitespace.
    pub fn extract(&self, markup: &str) -> Result<LanguageStats, ValidationError> {
        if markup.trim().is_empty() {
            return Err(ValidationError::Empty);
        }

        let document = Html::parse_document(markup);

        let Some(section) = document.select(&self.section).last() else {
            return Ok(LanguageStats::new());
        };

        Ok(section
            .select(&self.item)
            .filter_map(|item| self.language_entry(item))
            .collect())
    }

    /// Byte-level entry point rejecting input that is not UTF-8 text
    pub fn extract_bytes(&self, markup: &[u8]) -> Result<LanguageStats, ValidationError> {
        self.extract(std::str::from_utf8(markup)?)
    }

    fn language_entry(&self, item: ElementRef<'_>) -> Option<(String, String)> {
        let name_element = item.select(&self.language_name).next()?;
        let name = element_text(name_element)?;

        let percentage_element = name_element.next_siblings().find_map(ElementRef::wrap)?;
        if percentage_element.value().name() != "span" {
            return None;
        }
        let percentage = element_text(percentage_element)?;

        Some((name, percentage))
    }
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Extractor for the default selectors, compiled on first use
static DEFAULT_EXTRACTOR: LazyLock<Result<LanguageExtractor, ConfigError>> =
    LazyLock::new(|| LanguageExtractor::from_config(&SelectorConfig::default()));

fn default_extractor() -> Result<&'static LanguageExtractor, ValidationError> {
    DEFAULT_EXTRACTOR
        .as_ref()
        .map_err(|e| ValidationError::Selectors(e.to_string()))
}

/// Extracts language stats with the default selectors
pub fn extract_language_stats(markup: &str) -> Result<LanguageStats, ValidationError> {
    default_extractor()?.extract(markup)
}

/// Byte-level variant of [`extract_language_stats`]
pub fn extract_language_stats_bytes(markup: &[u8]) -> Result<LanguageStats, ValidationError> {
    default_extractor()?.extract_bytes(markup)
}
