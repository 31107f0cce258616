use crate::fetcher::Fetcher;
use crate::rss_utils::time::sort_key_millis;
use crate::runner::BoundedRunner;
use crate::translator::{TranslationReport, Translator};
use crate::types::{Category, CategoryResult, FeedItem, FetchResult, Snapshot};
use chrono::Utc;
use tracing::info;

/// Items and error count for one category run.
#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub result: CategoryResult,
    pub errors: usize,
}

/// Everything one invocation produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub snapshot: Snapshot,
    pub total_items: usize,
    pub total_errors: usize,
    pub translation: Option<TranslationReport>,
}

/// Sort newest first. Missing or unparsable dates count as the epoch, so
/// they end up last; ties keep their original order.
pub fn sort_by_pub_date_desc(items: &mut [FeedItem]) {
    items.sort_by_cached_key(|item| std::cmp::Reverse(sort_key_millis(&item.pub_date)));
}

/// Split fetch results into the merged item list and the failure count.
pub fn merge_results(results: Vec<FetchResult>) -> (Vec<FeedItem>, usize) {
    let mut items = Vec::new();
    let mut errors = 0;

    for result in results {
        if result.is_success() {
            items.extend(result.items);
        } else {
            errors += 1;
        }
    }

    (items, errors)
}

/// Drives fetching category by category, then translation, into a snapshot.
pub struct SnapshotPipeline {
    fetcher: Fetcher,
    translator: Option<Translator>,
}

impl SnapshotPipeline {
    pub fn new(fetcher: Fetcher, translator: Option<Translator>) -> Self {
        Self {
            fetcher,
            translator,
        }
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// Fetch every source of `category` through the global pool.
    ///
    /// Per-domain limiter state is cleared first, so domain limits only hold
    /// within this category.
    pub async fn fetch_category(&self, category: &Category) -> CategoryOutcome {
        info!(
            "Fetching category: {} ({} sources)",
            category.name,
            category.sources.len()
        );

        self.fetcher.limiter().reset().await;

        let fetcher = &self.fetcher;
        let tasks: Vec<_> = category
            .sources
            .iter()
            .map(|source| move || fetcher.fetch_feed(source))
            .collect();

        let results = BoundedRunner::new(self.fetcher.config().concurrency)
            .run(tasks)
            .await;

        let (mut items, errors) = merge_results(results);
        sort_by_pub_date_desc(&mut items);

        info!("✓ {}: {} items", category.name, items.len());

        CategoryOutcome {
            result: CategoryResult::new(category, items),
            errors,
        }
    }

    /// Fetch all categories in order, skipping empty ones, then translate
    /// the collected items in place.
    pub async fn run(&self, categories: &[Category]) -> RunReport {
        let fetched_at = Utc::now();
        let mut results = Vec::new();
        let mut total_errors = 0;

        for category in categories {
            if category.sources.is_empty() {
                continue;
            }
            let outcome = self.fetch_category(category).await;
            total_errors += outcome.errors;
            results.push(outcome.result);
        }

        let mut snapshot = Snapshot::new(results, fetched_at);
        let total_items = snapshot.total_items();

        let translation = match &self.translator {
            Some(translator) => {
                let items: Vec<&mut FeedItem> = snapshot
                    .categories
                    .iter_mut()
                    .flat_map(|c| c.items.iter_mut())
                    .collect();
                Some(translator.translate_all(items).await)
            }
            None => None,
        };

        RunReport {
            snapshot,
            total_items,
            total_errors,
            translation,
        }
    }
}
