use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const CONCURRENCY: usize = 10;
pub const DOMAIN_CONCURRENCY: usize = 3;
pub const TIMEOUT: Duration = Duration::from_millis(30_000);
pub const MAX_RETRIES: u32 = 2;
pub const RETRY_BASE_DELAY: Duration = Duration::from_millis(2_000);
pub const MAX_ITEMS_PER_FEED: usize = 20;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

pub const TRANSLATE_CONCURRENCY: usize = 10;
pub const TRANSLATE_TIMEOUT: Duration = Duration::from_millis(10_000);
pub const TRANSLATE_RETRIES: u32 = 2;
pub const TRANSLATE_BASE_DELAY: Duration = Duration::from_millis(1_000);
pub const TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
pub const DEFAULT_TARGET_LANG: &str = "zh-CN";

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const FEED_ACCEPT: &str = "application/rss+xml, application/xml, text/xml, application/atom+xml, */*";

/// A named feed URL from the sources file. Identity is the url.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub key: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Root of the input sources file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesFile {
    pub categories: Vec<Category>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_translated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_translated: Option<String>,
}

/// Outcome of fetching one source. `error` set means `items` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchResult {
    pub source_name: String,
    pub items: Vec<FeedItem>,
    pub error: Option<String>,
}

impl FetchResult {
    pub fn success(source_name: &str, items: Vec<FeedItem>) -> Self {
        Self {
            source_name: source_name.to_string(),
            items,
            error: None,
        }
    }

    pub fn failure(source_name: &str, error: String) -> Self {
        Self {
            source_name: source_name.to_string(),
            items: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    pub name: String,
    pub key: String,
    pub item_count: usize,
    pub items: Vec<FeedItem>,
}

impl CategoryResult {
    pub fn new(category: &Category, items: Vec<FeedItem>) -> Self {
        Self {
            name: category.name.clone(),
            key: category.key.clone(),
            item_count: items.len(),
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub categories: Vec<CategoryResult>,
    pub fetched_at: String,
}

impl Snapshot {
    pub fn new(categories: Vec<CategoryResult>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            categories,
            fetched_at: fetched_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn total_items(&self) -> usize {
        self.categories.iter().map(|c| c.item_count).sum()
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub accept: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub concurrency: usize,
    pub domain_concurrency: usize,
    pub max_items_per_feed: usize,
    pub max_description_chars: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: USER_AGENT.to_string(),
            accept: FEED_ACCEPT.to_string(),
            timeout: TIMEOUT,
            max_retries: MAX_RETRIES,
            retry_base_delay: RETRY_BASE_DELAY,
            concurrency: CONCURRENCY,
            domain_concurrency: DOMAIN_CONCURRENCY,
            max_items_per_feed: MAX_ITEMS_PER_FEED,
            max_description_chars: MAX_DESCRIPTION_CHARS,
            max_redirects: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslateConfig {
    pub endpoint: String,
    pub target_lang: String,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_base_delay: Duration,
    pub concurrency: usize,
    pub progress_every: usize,
}

impl Default for TranslateConfig {
    fn default() -> Self {
        Self {
            endpoint: TRANSLATE_ENDPOINT.to_string(),
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            timeout: TRANSLATE_TIMEOUT,
            max_retries: TRANSLATE_RETRIES,
            retry_base_delay: TRANSLATE_BASE_DELAY,
            concurrency: TRANSLATE_CONCURRENCY,
            progress_every: 100,
        }
    }
}

/// Message fragments that mark a fetch failure as transient.
pub const TRANSIENT_SIGNATURES: &[&str] = &[
    "timed out",
    "ECONNRESET",
    "connection reset",
    "ETIMEDOUT",
    "ECONNREFUSED",
    "connection refused",
    "socket disconnected",
    "Status code 429",
    "Status code 503",
    "fetch failed",
];

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("fetch failed: {0}")]
    Network(String),

    #[error("Status code {0}")]
    Status(u16),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to persist snapshot: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("General error: {0}")]
    General(String),
}

impl AggregatorError {
    /// Sorts a request failure into timeout, connection-level failure or
    /// anything else, so the message carries a transient signature when
    /// one applies.
    pub fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AggregatorError::Timeout
        } else if err.is_connect() || err.is_request() {
            AggregatorError::Network(err.to_string())
        } else if let Some(status) = err.status() {
            AggregatorError::Status(status.as_u16())
        } else {
            AggregatorError::Http(err)
        }
    }

    pub fn is_retryable(&self) -> bool {
        is_retryable_message(&self.to_string())
    }
}

pub fn is_retryable_message(message: &str) -> bool {
    TRANSIENT_SIGNATURES.iter().any(|sig| message.contains(sig))
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
