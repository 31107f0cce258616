use crate::rss_utils::retry::doubling_schedule;
use crate::runner::BoundedRunner;
use crate::traits::TranslationClient;
use crate::types::{AggregatorError, FeedItem, Result, TranslateConfig};
use async_trait::async_trait;
use backoff::backoff::Backoff;
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

/// Client for the public `translate_a/single` endpoint.
pub struct GoogleTranslateClient {
    client: Client,
    endpoint: String,
}

impl GoogleTranslateClient {
    pub fn new(config: &TranslateConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl TranslationClient for GoogleTranslateClient {
    async fn translate_once(&self, text: &str, target_lang: &str) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(AggregatorError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::Status(status.as_u16()));
        }

        let body: Value = response.json().await.map_err(AggregatorError::from_request)?;
        join_segments(&body)
    }
}

/// Concatenate `body[0][i][0]` over every segment `i`.
pub fn join_segments(body: &Value) -> Result<String> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| AggregatorError::Translation("response has no segment list".to_string()))?;

    Ok(segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect())
}

/// Completion counter that marks a reporting point every `every`
/// completions and on the last one.
pub struct Progress {
    total: usize,
    every: usize,
    completed: AtomicUsize,
}

impl Progress {
    pub fn new(total: usize, every: usize) -> Self {
        Self {
            total,
            every: every.max(1),
            completed: AtomicUsize::new(0),
        }
    }

    /// Record one completion. Returns the completed count when it is a
    /// reporting point.
    pub fn tick(&self) -> Option<usize> {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        if done % self.every == 0 || done == self.total {
            Some(done)
        } else {
            None
        }
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReport {
    pub total: usize,
    pub completed: usize,
    pub progress_points: Vec<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Title,
    Description,
}

struct FieldJob {
    index: usize,
    field: Field,
    text: String,
}

/// Translates item titles and descriptions through its own bounded pool.
pub struct Translator {
    client: Arc<dyn TranslationClient>,
    config: TranslateConfig,
}

impl Translator {
    pub fn new(client: Arc<dyn TranslationClient>, config: TranslateConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &TranslateConfig {
        &self.config
    }

    /// Translate one field. Always resolves: any failure becomes `""`.
    pub async fn translate_text(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        let max_retries = self.config.max_retries;
        let mut schedule = doubling_schedule(self.config.retry_base_delay, max_retries);

        for attempt in 0..=max_retries {
            if attempt > 0 {
                let delay = schedule
                    .next_backoff()
                    .unwrap_or(self.config.retry_base_delay);
                tokio::time::sleep(delay).await;
            }

            match self
                .client
                .translate_once(text, &self.config.target_lang)
                .await
            {
                Ok(translated) => return translated,
                Err(AggregatorError::Status(429)) => {
                    debug!("Translation rate limited (attempt {})", attempt + 1);
                }
                Err(AggregatorError::Status(code)) => {
                    debug!("Translation rejected with status {}", code);
                    return String::new();
                }
                Err(e) => {
                    debug!("Translation attempt {} failed: {}", attempt + 1, e);
                }
            }
        }

        String::new()
    }

    /// Translate every title and every non-empty description of `items`.
    ///
    /// Field tasks only read their source text. Results come back on one
    /// channel per field kind and are written onto the items after every task
    /// has settled.
    pub async fn translate_all(&self, mut items: Vec<&mut FeedItem>) -> TranslationReport {
        let mut jobs = Vec::new();
        for (index, item) in items.iter_mut().enumerate() {
            jobs.push(FieldJob {
                index,
                field: Field::Title,
                text: item.title.clone(),
            });
            if item.description.is_empty() {
                item.description_translated = Some(String::new());
            } else {
                jobs.push(FieldJob {
                    index,
                    field: Field::Description,
                    text: item.description.clone(),
                });
            }
        }

        let total = jobs.len();
        info!(
            "Translating {} items to {} ({} texts)...",
            items.len(),
            self.config.target_lang,
            total
        );

        let (title_tx, mut title_rx) = mpsc::unbounded_channel::<(usize, String)>();
        let (description_tx, mut description_rx) = mpsc::unbounded_channel::<(usize, String)>();
        let progress = Progress::new(total, self.config.progress_every);
        let points = Mutex::new(Vec::new());

        let this = self;
        let progress_ref = &progress;
        let points_ref = &points;
        let tasks: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let tx = match job.field {
                    Field::Title => title_tx.clone(),
                    Field::Description => description_tx.clone(),
                };
                move || async move {
                    let translated = this.translate_text(&job.text).await;
                    // Receivers outlive every task.
                    let _ = tx.send((job.index, translated));
                    if let Some(done) = progress_ref.tick() {
                        info!("Translation progress: {}/{}", done, total);
                        points_ref.lock().await.push(done);
                    }
                }
            })
            .collect();

        BoundedRunner::new(self.config.concurrency).run(tasks).await;
        drop(title_tx);
        drop(description_tx);

        while let Some((index, translated)) = title_rx.recv().await {
            if let Some(item) = items.get_mut(index) {
                item.title_translated = Some(translated);
            }
        }
        while let Some((index, translated)) = description_rx.recv().await {
            if let Some(item) = items.get_mut(index) {
                item.description_translated = Some(translated);
            }
        }

        info!("Translation finished.");

        TranslationReport {
            total,
            completed: progress.completed(),
            progress_points: points.into_inner(),
        }
    }
}
