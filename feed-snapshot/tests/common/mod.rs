#![allow(dead_code)]

// Shared fixtures for the integration tests
pub use feed_snapshot::{
    AggregatorError, FeedClient, FetchConfig, Result, TranslateConfig, TranslationClient,
};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Fetch settings with millisecond backoff so retry tests stay fast.
pub fn fast_fetch_config() -> FetchConfig {
    FetchConfig {
        timeout: Duration::from_secs(5),
        retry_base_delay: Duration::from_millis(10),
        ..FetchConfig::default()
    }
}

pub fn fast_translate_config(endpoint: &str) -> TranslateConfig {
    TranslateConfig {
        endpoint: endpoint.to_string(),
        timeout: Duration::from_secs(5),
        retry_base_delay: Duration::from_millis(5),
        ..TranslateConfig::default()
    }
}

/// RSS 2.0 document with `count` items. Item `i` is published on
/// 2024-01-(i+1) unless `dated` is false.
pub fn rss_document(title: &str, count: usize, dated: bool) -> String {
    let mut items = String::new();
    for i in 0..count {
        let date = if dated {
            format!("<pubDate>{:02} Jan 2024 10:00:00 +0000</pubDate>", (i % 28) + 1)
        } else {
            String::new()
        };
        items.push_str(&format!(
            "<item><title>{title} item {i}</title><link>https://example.com/{title}/{i}</link>\
             <description>Summary of {title} item {i}</description>{date}</item>"
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>{title}</title><link>https://example.com/</link>
<description>Test feed</description>{items}</channel></rss>"#
    )
}

pub fn rss_with_description(description: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>Long</title><link>https://example.com/</link>
<description>Test feed</description>
<item><title>Long one</title><link>https://example.com/long</link>
<description>{description}</description>
<pubDate>Mon, 01 Jan 2024 00:00:00 +0000</pubDate></item>
</channel></rss>"#
    )
}

#[derive(Clone)]
pub enum FakeResponse {
    Feed(String),
    Fail(String),
}

#[derive(Default)]
struct FakeFeedState {
    active_total: usize,
    peak_total: usize,
    active_by_domain: HashMap<String, usize>,
    peak_by_domain: HashMap<String, usize>,
    attempts: HashMap<String, usize>,
}

/// In-process feed transport that records how many requests overlap,
/// globally and per host.
pub struct FakeFeedClient {
    responses: HashMap<String, FakeResponse>,
    latency: Duration,
    state: Mutex<FakeFeedState>,
}

impl FakeFeedClient {
    pub fn new(latency: Duration) -> Self {
        Self {
            responses: HashMap::new(),
            latency,
            state: Mutex::new(FakeFeedState::default()),
        }
    }

    pub fn with(mut self, url: &str, response: FakeResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn peak_total(&self) -> usize {
        self.state.lock().unwrap().peak_total
    }

    pub fn peak_for(&self, domain: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .peak_by_domain
            .get(domain)
            .copied()
            .unwrap_or(0)
    }

    pub fn attempts_for(&self, url: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .attempts
            .get(url)
            .copied()
            .unwrap_or(0)
    }
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

#[async_trait]
impl FeedClient for FakeFeedClient {
    async fn fetch_xml(&self, url: &str) -> Result<String> {
        let domain = host_of(url);
        {
            let mut state = self.state.lock().unwrap();
            *state.attempts.entry(url.to_string()).or_insert(0) += 1;
            state.active_total += 1;
            state.peak_total = state.peak_total.max(state.active_total);
            let active = {
                let entry = state.active_by_domain.entry(domain.clone()).or_insert(0);
                *entry += 1;
                *entry
            };
            let peak = state.peak_by_domain.entry(domain.clone()).or_insert(0);
            *peak = (*peak).max(active);
        }

        tokio::time::sleep(self.latency).await;

        {
            let mut state = self.state.lock().unwrap();
            state.active_total -= 1;
            if let Some(active) = state.active_by_domain.get_mut(&domain) {
                *active -= 1;
            }
        }

        match self.responses.get(url) {
            Some(FakeResponse::Feed(body)) => Ok(body.clone()),
            Some(FakeResponse::Fail(message)) => Err(AggregatorError::General(message.clone())),
            None => Err(AggregatorError::Status(404)),
        }
    }
}

/// Translation transport that uppercases text and tracks call overlap.
pub struct FakeTranslationClient {
    latency: Duration,
    fail_with: Option<u16>,
    state: Mutex<(usize, usize, usize)>,
}

impl FakeTranslationClient {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fail_with: None,
            state: Mutex::new((0, 0, 0)),
        }
    }

    pub fn failing(status: u16) -> Self {
        Self {
            latency: Duration::from_millis(1),
            fail_with: Some(status),
            state: Mutex::new((0, 0, 0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.state.lock().unwrap().2
    }

    pub fn peak(&self) -> usize {
        self.state.lock().unwrap().1
    }
}

#[async_trait]
impl TranslationClient for FakeTranslationClient {
    async fn translate_once(&self, text: &str, target_lang: &str) -> Result<String> {
        {
            let mut state = self.state.lock().unwrap();
            state.0 += 1;
            state.1 = state.1.max(state.0);
            state.2 += 1;
        }

        tokio::time::sleep(self.latency).await;

        self.state.lock().unwrap().0 -= 1;

        match self.fail_with {
            Some(code) => Err(AggregatorError::Status(code)),
            None => Ok(format!("[{}] {}", target_lang, text.to_uppercase())),
        }
    }
}
