use crate::domain_limiter::DomainLimiter;
use crate::parser::FeedParser;
use crate::rss_utils::retry::doubling_schedule;
use crate::rss_utils::url::extract_domain;
use crate::traits::FeedClient;
use crate::types::{AggregatorError, FeedItem, FetchConfig, FetchResult, Result, Source};
use async_trait::async_trait;
use backoff::backoff::Backoff;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// reqwest-backed feed transport with the fixed feed header set.
pub struct HttpFeedClient {
    client: Client,
}

impl HttpFeedClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let accept = HeaderValue::from_str(&config.accept)
            .map_err(|e| AggregatorError::General(format!("Invalid Accept header: {}", e)))?;
        headers.insert(ACCEPT, accept);

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedClient for HttpFeedClient {
    async fn fetch_xml(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(AggregatorError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::Status(status.as_u16()));
        }

        response.text().await.map_err(AggregatorError::from_request)
    }
}

/// Fetch-with-retry for a single source, gated per domain.
pub struct Fetcher {
    client: Arc<dyn FeedClient>,
    limiter: Arc<DomainLimiter>,
    parser: FeedParser,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(client: Arc<dyn FeedClient>, limiter: Arc<DomainLimiter>, config: FetchConfig) -> Self {
        Self {
            client,
            limiter,
            parser: FeedParser::from_config(&config),
            config,
        }
    }

    pub fn limiter(&self) -> &Arc<DomainLimiter> {
        &self.limiter
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Never fails: terminal errors are recorded in the returned result.
    pub async fn fetch_feed(&self, source: &Source) -> FetchResult {
        let domain = extract_domain(&source.url);
        let mut schedule =
            doubling_schedule(self.config.retry_base_delay, self.config.max_retries);
        let mut attempt: u32 = 0;

        loop {
            if attempt > 0 {
                let delay = schedule
                    .next_backoff()
                    .unwrap_or(self.config.retry_base_delay);
                warn!(
                    "Attempt {} failed for {}, retrying in {:?}",
                    attempt, source.name, delay
                );
                tokio::time::sleep(delay).await;
            }

            match self.attempt(source, &domain).await {
                Ok(items) => {
                    debug!("Fetched {} items from {}", items.len(), source.name);
                    return FetchResult::success(&source.name, items);
                }
                Err(e) => {
                    let message = e.to_string();
                    if !e.is_retryable() || attempt >= self.config.max_retries {
                        if attempt > 0 {
                            error!(
                                "Failed: {} (after {} attempts): {}",
                                source.name,
                                attempt + 1,
                                message
                            );
                        } else {
                            error!("Failed: {}: {}", source.name, message);
                        }
                        return FetchResult::failure(&source.name, message);
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt(&self, source: &Source, domain: &str) -> Result<Vec<FeedItem>> {
        let permit = self.limiter.acquire(domain).await?;
        let fetched = self.client.fetch_xml(&source.url).await;
        self.limiter.release(permit);

        let content = fetched?;
        self.parser.parse_items(&content, source)
    }
}
