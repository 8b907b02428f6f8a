//! Top-level request handling
//!
//! A request is a JSON document of one of two shapes:
//! - a crawl request `{"keywords": [..], "proxies": [..], "type": ".."}`
//! - a passthrough array of results, each an object with a `url`, returned as is
//!
//! [`handle_input`] always answers with JSON: the report, the passthrough
//! array, or an `{"error": ..}` object.

use crate::crawler::{CrawlReport, Crawler};
use crate::output::ReportSink;
use crate::InputError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Kind of object searched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum ObjectType {
    Repository,
    Issue,
    Wiki,
}

impl ObjectType {
    /// Value of the `type` query parameter
    pub fn query_token(&self) -> &'static str {
        match self {
            ObjectType::Repository => "repositories",
            ObjectType::Issue => "issues",
            ObjectType::Wiki => "wikis",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectType::Repository => "Repositories",
            ObjectType::Issue => "Issues",
            ObjectType::Wiki => "Wikis",
        };
        f.write_str(name)
    }
}

impl FromStr for ObjectType {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "repositories" | "repository" => Ok(ObjectType::Repository),
            "issues" | "issue" => Ok(ObjectType::Issue),
            "wikis" | "wiki" => Ok(ObjectType::Wiki),
            other => Err(InputError::InvalidFormat(format!(
                "unknown type '{}', expected Repositories, Issues or Wikis",
                other
            ))),
        }
    }
}

impl From<ObjectType> for String {
    fn from(value: ObjectType) -> Self {
        value.to_string()
    }
}

/// A validated crawl request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlRequest {
    keywords: Vec<String>,
    proxies: Vec<String>,
    #[serde(rename = "type")]
    object_type: ObjectType,
}

#[derive(Deserialize)]
struct RawCrawlRequest {
    keywords: Vec<String>,
    proxies: Vec<String>,
    #[serde(rename = "type")]
    object_type: String,
}

impl CrawlRequest {
    /// Creates a request; `keywords` must not be empty
    pub fn new(
        keywords: Vec<String>,
        proxies: Vec<String>,
        object_type: ObjectType,
    ) -> Result<Self, InputError> {
        if keywords.is_empty() {
            return Err(InputError::InvalidFormat(
                "keywords must not be empty".to_string(),
            ));
        }

        Ok(Self {
            keywords,
            proxies,
            object_type,
        })
    }

    /// Builds a request from a whitespace-separated keyword line
    pub fn from_keyword_line(
        line: &str,
        object_type: ObjectType,
        proxies: Vec<String>,
    ) -> Result<Self, InputError> {
        let keywords = line.split_whitespace().map(str::to_string).collect();
        Self::new(keywords, proxies, object_type)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn proxies(&self) -> &[String] {
        &self.proxies
    }

    pub fn object_type(&self) -> ObjectType {
        self.object_type
    }
}

/// A parsed top-level request
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Crawl(CrawlRequest),
    Passthrough(Vec<Value>),
}

const REQUEST_KEYS: [&str; 3] = ["keywords", "proxies", "type"];

/// Parses the raw request text into one of the accepted shapes
pub fn parse_input(text: &str) -> Result<Input, InputError> {
    let value: Value = serde_json::from_str(text)?;

    match value {
        Value::Object(map) if REQUEST_KEYS.iter().all(|key| map.contains_key(*key)) => {
            let raw: RawCrawlRequest = serde_json::from_value(Value::Object(map))
                .map_err(|e| InputError::InvalidFormat(e.to_string()))?;
            let object_type = raw.object_type.parse()?;
            Ok(Input::Crawl(CrawlRequest::new(
                raw.keywords,
                raw.proxies,
                object_type,
            )?))
        }
        Value::Array(items) if items.iter().all(|item| item.get("url").is_some()) => {
            Ok(Input::Passthrough(items))
        }
        _ => Err(InputError::InvalidFormat(
            "expected a crawl request or an array of results".to_string(),
        )),
    }
}

/// Handles one raw request end to end and renders the JSON response
///
/// A crawl report is handed to `sink` when one is given; a sink failure is
/// logged and does not change the response. Errors never escape: they come
/// back as `{"error": ".."}`.
pub async fn handle_input(crawler: &Crawler, text: &str, sink: Option<&dyn ReportSink>) -> String {
    let response = match respond(crawler, text, sink).await {
        Ok(value) => value,
        Err(message) => {
            tracing::error!("{}", message);
            json!({ "error": message })
        }
    };

    serde_json::to_string_pretty(&response)
        .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
}

async fn respond(
    crawler: &Crawler,
    text: &str,
    sink: Option<&dyn ReportSink>,
) -> Result<Value, String> {
    let input = match parse_input(text) {
        Ok(input) => input,
        Err(InputError::InvalidJson(e)) => {
            tracing::debug!("Error decoding input JSON: {}", e);
            return Err("Invalid input JSON".to_string());
        }
        Err(e) => return Err(e.to_string()),
    };

    match input {
        Input::Passthrough(items) => Ok(Value::Array(items)),
        Input::Crawl(request) => {
            let report: CrawlReport = crawler
                .crawl(&request)
                .await
                .map_err(|e| format!("Crawl failed: {}", e))?;

            if let Some(sink) = sink {
                match sink.persist(&report) {
                    Ok(path) => tracing::info!("Saved report to {}", path.display()),
                    Err(e) => tracing::error!("Failed to save report: {}", e),
                }
            }

            serde_json::to_value(&report).map_err(|e| e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_parsing_is_case_insensitive() {
        assert_eq!("Repositories".parse::<ObjectType>().unwrap(), ObjectType::Repository);
        assert_eq!("ISSUES".parse::<ObjectType>().unwrap(), ObjectType::Issue);
        assert_eq!("wikis".parse::<ObjectType>().unwrap(), ObjectType::Wiki);
        assert_eq!("Wiki".parse::<ObjectType>().unwrap(), ObjectType::Wiki);
        assert!("Gists".parse::<ObjectType>().is_err());
    }

    #[test]
    fn test_object_type_tokens() {
        assert_eq!(ObjectType::Repository.query_token(), "repositories");
        assert_eq!(ObjectType::Issue.query_token(), "issues");
        assert_eq!(ObjectType::Wiki.query_token(), "wikis");
        assert_eq!(ObjectType::Issue.to_string(), "Issues");
    }

    #[test]
    fn test_parse_crawl_request() {
        let input = parse_input(
            r#"{"keywords": ["python", "asyncio"], "proxies": ["194.126.37.94:8080"], "type": "repositories"}"#,
        )
        .unwrap();

        match input {
            Input::Crawl(request) => {
                assert_eq!(request.keywords(), ["python", "asyncio"]);
                assert_eq!(request.proxies(), ["194.126.37.94:8080"]);
                assert_eq!(request.object_type(), ObjectType::Repository);
            }
            other => panic!("unexpected input: {:?}", other),
        }
    }

    #[test]
    fn test_parse_passthrough() {
        let input = parse_input(r#"[{"url": "https://github.com/test/repo"}]"#).unwrap();
        assert!(matches!(input, Input::Passthrough(items) if items.len() == 1));
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        for text in [
            "{}",
            r#"{"keywords": ["a"], "type": "Repositories"}"#,
            r#"[{"name": "no url"}]"#,
            r#""just a string""#,
            r#"{"keywords": [], "proxies": [], "type": "Repositories"}"#,
            r#"{"keywords": ["a"], "proxies": [], "type": "Gists"}"#,
            r#"{"keywords": "a", "proxies": [], "type": "Issues"}"#,
        ] {
            assert!(
                matches!(parse_input(text), Err(InputError::InvalidFormat(_))),
                "accepted {}",
                text
            );
        }
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse_input("invalid json"),
            Err(InputError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_from_keyword_line() {
        let request = CrawlRequest::from_keyword_line(
            "python  django rest",
            ObjectType::Issue,
            vec!["13.78.125.167:8080".to_string()],
        )
        .unwrap();
        assert_eq!(request.keywords(), ["python", "django", "rest"]);
        assert_eq!(request.object_type(), ObjectType::Issue);

        assert!(CrawlRequest::from_keyword_line("   ", ObjectType::Issue, vec![]).is_err());
    }

    #[test]
    fn test_request_serializes_to_input_shape() {
        let request = CrawlRequest::new(vec!["python".to_string()], vec![], ObjectType::Wiki).unwrap();
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({"keywords": ["python"], "proxies": [], "type": "Wikis"})
        );
        assert!(matches!(
            parse_input(&value.to_string()),
            Ok(Input::Crawl(parsed)) if parsed == request
        ));
    }
}
