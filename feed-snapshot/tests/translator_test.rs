mod common;

use common::{fast_translate_config, init_tracing, FakeTranslationClient};
use feed_snapshot::translator::join_segments;
use feed_snapshot::{
    AggregatorError, FeedItem, GoogleTranslateClient, Progress, Result, TranslateConfig,
    TranslationClient, Translator,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn item(title: &str, description: &str) -> FeedItem {
    FeedItem {
        title: title.to_string(),
        link: String::new(),
        description: description.to_string(),
        pub_date: String::new(),
        source: "Test".to_string(),
        title_translated: None,
        description_translated: None,
    }
}

/// Fails with `status` for the first `failures` calls, then succeeds.
struct ScriptedClient {
    status: u16,
    failures: usize,
    calls: AtomicUsize,
}

#[async_trait::async_trait]
impl TranslationClient for ScriptedClient {
    async fn translate_once(&self, text: &str, _target_lang: &str) -> Result<String> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            Err(AggregatorError::Status(self.status))
        } else {
            Ok(format!("ok:{}", text))
        }
    }
}

#[tokio::test]
async fn test_blank_text_skips_the_client() {
    init_tracing();
    let client = Arc::new(FakeTranslationClient::new(Duration::from_millis(1)));
    let translator = Translator::new(client.clone(), fast_translate_config("http://unused.invalid"));

    assert_eq!(translator.translate_text("").await, "");
    assert_eq!(translator.translate_text("   \n\t").await, "");
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn test_rate_limit_retries_then_gives_up() {
    init_tracing();
    let client = Arc::new(FakeTranslationClient::failing(429));
    let translator = Translator::new(client.clone(), fast_translate_config("http://unused.invalid"));

    assert_eq!(translator.translate_text("hello").await, "");
    assert_eq!(client.calls(), 3);
}

#[tokio::test]
async fn test_other_status_gives_up_immediately() {
    init_tracing();
    let client = Arc::new(FakeTranslationClient::failing(500));
    let translator = Translator::new(client.clone(), fast_translate_config("http://unused.invalid"));

    assert_eq!(translator.translate_text("hello").await, "");
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    init_tracing();
    let client = Arc::new(ScriptedClient {
        status: 429,
        failures: 2,
        calls: AtomicUsize::new(0),
    });
    let translator = Translator::new(client.clone(), fast_translate_config("http://unused.invalid"));

    assert_eq!(translator.translate_text("hello").await, "ok:hello");
    assert_eq!(client.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_progress_points_every_hundred_and_at_end() {
    init_tracing();
    let client = Arc::new(FakeTranslationClient::new(Duration::from_millis(0)));
    let translator = Translator::new(client.clone(), fast_translate_config("http://unused.invalid"));

    // 75 items with title and description make 150 fields.
    let mut items: Vec<FeedItem> = (0..75)
        .map(|i| item(&format!("title {}", i), &format!("body {}", i)))
        .collect();

    let report = translator.translate_all(items.iter_mut().collect()).await;

    assert_eq!(report.total, 150);
    assert_eq!(report.completed, 150);
    assert_eq!(report.progress_points, vec![100, 150]);
    assert_eq!(client.calls(), 150);
    assert_eq!(items[3].title_translated.as_deref(), Some("[zh-CN] TITLE 3"));
    assert_eq!(items[3].description_translated.as_deref(), Some("[zh-CN] BODY 3"));
}

#[tokio::test]
async fn test_empty_description_is_not_sent() {
    init_tracing();
    let client = Arc::new(FakeTranslationClient::new(Duration::from_millis(0)));
    let translator = Translator::new(client.clone(), fast_translate_config("http://unused.invalid"));

    let mut items = vec![item("only title", ""), item("both", "text")];
    let report = translator.translate_all(items.iter_mut().collect()).await;

    assert_eq!(report.total, 3);
    assert_eq!(client.calls(), 3);
    assert_eq!(items[0].description_translated.as_deref(), Some(""));
    assert_eq!(items[0].title_translated.as_deref(), Some("[zh-CN] ONLY TITLE"));
    assert_eq!(items[1].description_translated.as_deref(), Some("[zh-CN] TEXT"));
}

#[tokio::test]
async fn test_failed_fields_become_empty_strings() {
    init_tracing();
    let client = Arc::new(FakeTranslationClient::failing(403));
    let translator = Translator::new(client, fast_translate_config("http://unused.invalid"));

    let mut items = vec![item("a", "b")];
    let report = translator.translate_all(items.iter_mut().collect()).await;

    assert_eq!(report.completed, 2);
    assert_eq!(items[0].title_translated.as_deref(), Some(""));
    assert_eq!(items[0].description_translated.as_deref(), Some(""));
}

#[tokio::test]
async fn test_translation_pool_is_bounded() {
    init_tracing();
    let client = Arc::new(FakeTranslationClient::new(Duration::from_millis(5)));
    let config = TranslateConfig {
        concurrency: 3,
        ..fast_translate_config("http://unused.invalid")
    };
    let translator = Translator::new(client.clone(), config);

    let mut items: Vec<FeedItem> = (0..10).map(|i| item(&format!("t{}", i), "d")).collect();
    translator.translate_all(items.iter_mut().collect()).await;

    assert_eq!(client.calls(), 20);
    assert_eq!(client.peak(), 3);
}

#[tokio::test]
async fn test_google_client_joins_segments() -> Result<()> {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/translate_a/single"))
        .and(query_param("client", "gtx"))
        .and(query_param("sl", "auto"))
        .and(query_param("tl", "fr"))
        .and(query_param("dt", "t"))
        .and(query_param("q", "Hello world. Bye & thanks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            [["Bonjour le monde. ", "Hello world. ", null], ["Au revoir et merci", "Bye & thanks", null]],
            null,
            "en"
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let config = fast_translate_config(&format!("{}/translate_a/single", server.uri()));
    let client = GoogleTranslateClient::new(&config)?;

    let translated = client.translate_once("Hello world. Bye & thanks", "fr").await?;
    assert_eq!(translated, "Bonjour le monde. Au revoir et merci");
    server.verify().await;
    Ok(())
}

#[tokio::test]
async fn test_google_client_reports_status() -> Result<()> {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let config = fast_translate_config(&server.uri());
    let client = GoogleTranslateClient::new(&config)?;

    match client.translate_once("hi", "de").await {
        Err(AggregatorError::Status(429)) => {}
        other => panic!("expected status 429, got {:?}", other),
    }
    Ok(())
}

#[test]
fn test_join_segments_rejects_unexpected_shape() {
    assert!(join_segments(&json!({"error": "nope"})).is_err());
    assert_eq!(join_segments(&json!([[]])).unwrap(), "");
}

#[test]
fn test_progress_marks_points() {
    let progress = Progress::new(5, 2);
    let points: Vec<Option<usize>> = (0..5).map(|_| progress.tick()).collect();
    assert_eq!(points, vec![None, Some(2), None, Some(4), Some(5)]);
    assert_eq!(progress.completed(), 5);
    assert_eq!(progress.total(), 5);
}
