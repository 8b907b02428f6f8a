//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the code-hosting site and run
//! the full request cycle end-to-end: search, enrichment, response rendering.

use lingua_crawl::config::Config;
use lingua_crawl::crawler::{CrawlEvent, Crawler, RecordingObserver};
use lingua_crawl::input::handle_input;
use lingua_crawl::output::{JsonFileSink, ReportSink};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.crawler.base_url = base_url.to_string();
    config.crawler.pacing_delay_ms = 10; // Very short for testing
    config.crawler.request_timeout_ms = 2000;
    config
}

fn search_payload(repos: &[(&str, &str)]) -> Value {
    let results: Vec<Value> = repos
        .iter()
        .map(|(owner, name)| json!({"repo": {"repository": {"owner_login": owner, "name": name}}}))
        .collect();
    json!({"payload": {"results": results}})
}

fn repo_page(languages: &[(&str, &str)]) -> String {
    let items: String = languages
        .iter()
        .map(|(lang, pct)| format!(r#"<li><span class="text-bold">{}</span><span>{}</span></li>"#, lang, pct))
        .collect();
    format!(
        r#"<html><body>
        <div class="BorderGrid-row"><h2>About</h2></div>
        <div class="BorderGrid-row"><h2>Languages</h2><ul>{}</ul></div>
        </body></html>"#,
        items
    )
}

async fn mount_search(server: &MockServer, q: &str, body: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", q))
        .and(query_param("type", "repositories"))
        .respond_with(body)
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page_path: &str, body: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(body)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_end_to_end_single_repository() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_search(
        &mock_server,
        "test",
        ResponseTemplate::new(200).set_body_json(search_payload(&[("u", "r")])),
    )
    .await;
    mount_page(
        &mock_server,
        "/u/r/",
        ResponseTemplate::new(200).set_body_string(repo_page(&[("Python", "100%")])),
    )
    .await;

    let crawler = Crawler::new(create_test_config(&base_url)).expect("Failed to create crawler");
    let response = handle_input(
        &crawler,
        r#"{"keywords":["test"],"proxies":[],"type":"Repositories"}"#,
        None,
    )
    .await;

    let output: Value = serde_json::from_str(&response).expect("response is JSON");
    assert_eq!(
        output,
        json!([{
            "url": format!("{}/u/r/", base_url),
            "extra": {"owner": "u", "language_stats": {"Python": "100%"}}
        }])
    );
}

#[tokio::test]
async fn test_failing_repository_is_dropped() {
    let mock_server = MockServer::start().await;

    mount_search(
        &mock_server,
        "python asyncio",
        ResponseTemplate::new(200)
            .set_body_json(search_payload(&[("userA", "repo1"), ("userB", "repo2"), ("userC", "repo3")])),
    )
    .await;
    mount_page(
        &mock_server,
        "/userA/repo1/",
        ResponseTemplate::new(200)
            .set_body_string(repo_page(&[("Python", "80.5%"), ("Shell", "19.5%")])),
    )
    .await;
    mount_page(&mock_server, "/userB/repo2/", ResponseTemplate::new(500)).await;
    mount_page(
        &mock_server,
        "/userC/repo3/",
        ResponseTemplate::new(200).set_body_string("   "),
    )
    .await;

    let observer = Arc::new(RecordingObserver::new());
    let crawler = Crawler::new(create_test_config(&mock_server.uri()))
        .expect("Failed to create crawler")
        .with_observer(observer.clone());

    let response = handle_input(
        &crawler,
        r#"{"keywords":["python","asyncio"],"proxies":[],"type":"repositories"}"#,
        None,
    )
    .await;

    let output: Value = serde_json::from_str(&response).unwrap();
    let entries = output.as_array().expect("report is an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["extra"]["owner"], "userA");

    let stats = entries[0]["extra"]["language_stats"].as_object().unwrap();
    let languages: Vec<&String> = stats.keys().collect();
    assert_eq!(languages, ["Python", "Shell"]);

    let dropped = observer
        .events()
        .into_iter()
        .filter(|e| matches!(e, CrawlEvent::RepositoryDropped { .. }))
        .count();
    assert_eq!(dropped, 2);
}

#[tokio::test]
async fn test_zero_results() {
    let mock_server = MockServer::start().await;
    mount_search(
        &mock_server,
        "nothing",
        ResponseTemplate::new(200).set_body_json(search_payload(&[])),
    )
    .await;

    let crawler = Crawler::new(create_test_config(&mock_server.uri())).unwrap();
    let response = handle_input(
        &crawler,
        r#"{"keywords":["nothing"],"proxies":[],"type":"Repositories"}"#,
        None,
    )
    .await;

    assert_eq!(serde_json::from_str::<Value>(&response).unwrap(), json!([]));
}

#[tokio::test]
async fn test_search_embedded_in_html() {
    let mock_server = MockServer::start().await;
    let page = format!(
        r#"<html><body><script type="application/json" data-target="react-app.embeddedData">{}</script></body></html>"#,
        search_payload(&[("octo", "cat")])
    );
    mount_search(
        &mock_server,
        "octo",
        ResponseTemplate::new(200).set_body_string(page),
    )
    .await;
    mount_page(
        &mock_server,
        "/octo/cat/",
        ResponseTemplate::new(200).set_body_string(repo_page(&[("Ruby", "42.0%")])),
    )
    .await;

    let crawler = Crawler::new(create_test_config(&mock_server.uri())).unwrap();
    let response = handle_input(
        &crawler,
        r#"{"keywords":["octo"],"proxies":[],"type":"Repositories"}"#,
        None,
    )
    .await;

    let output: Value = serde_json::from_str(&response).unwrap();
    assert_eq!(output[0]["extra"]["language_stats"]["Ruby"], "42.0%");
}

#[tokio::test]
async fn test_search_failure_is_error_payload() {
    let mock_server = MockServer::start().await;
    mount_search(&mock_server, "test", ResponseTemplate::new(503)).await;

    let crawler = Crawler::new(create_test_config(&mock_server.uri())).unwrap();
    let response = handle_input(
        &crawler,
        r#"{"keywords":["test"],"proxies":[],"type":"Repositories"}"#,
        None,
    )
    .await;

    let output: Value = serde_json::from_str(&response).unwrap();
    let message = output["error"].as_str().expect("error payload");
    assert!(message.starts_with("Crawl failed"), "got {}", message);
}

#[tokio::test]
async fn test_passthrough_round_trip() {
    let crawler = Crawler::new(create_test_config("http://127.0.0.1:1")).unwrap();
    let previous = json!([{
        "url": "https://github.com/atuldjadhav/DropBox-Cloud-Storage",
        "extra": {
            "owner": "atuldjadhav",
            "language_stats": {"CSS": "52.0%", "JavaScript": "47.2%", "HTML": "0.8%"}
        }
    }]);

    let response = handle_input(&crawler, &previous.to_string(), None).await;

    assert_eq!(response, serde_json::to_string_pretty(&previous).unwrap());
}

#[tokio::test]
async fn test_malformed_inputs_are_error_payloads() {
    let crawler = Crawler::new(create_test_config("http://127.0.0.1:1")).unwrap();

    let response = handle_input(&crawler, "invalid json", None).await;
    assert_eq!(
        serde_json::from_str::<Value>(&response).unwrap(),
        json!({"error": "Invalid input JSON"})
    );

    let response = handle_input(&crawler, "{}", None).await;
    let output: Value = serde_json::from_str(&response).unwrap();
    assert!(output["error"]
        .as_str()
        .unwrap()
        .starts_with("Invalid input format"));
}

#[tokio::test]
async fn test_report_is_persisted() {
    let mock_server = MockServer::start().await;
    mount_search(
        &mock_server,
        "save",
        ResponseTemplate::new(200).set_body_json(search_payload(&[("u", "r")])),
    )
    .await;
    mount_page(
        &mock_server,
        "/u/r/",
        ResponseTemplate::new(200).set_body_string(repo_page(&[("Go", "100.0%")])),
    )
    .await;

    let results_dir = tempfile::tempdir().unwrap();
    let sink = JsonFileSink::new(results_dir.path().join("output_results"));
    let crawler = Crawler::new(create_test_config(&mock_server.uri())).unwrap();

    let response = handle_input(
        &crawler,
        r#"{"keywords":["save"],"proxies":[],"type":"Repositories"}"#,
        Some(&sink as &dyn ReportSink),
    )
    .await;

    let files: Vec<_> = std::fs::read_dir(sink.dir())
        .expect("results directory created")
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(files.len(), 1);

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&files[0]).unwrap()).unwrap();
    assert_eq!(saved, serde_json::from_str::<Value>(&response).unwrap());
}
