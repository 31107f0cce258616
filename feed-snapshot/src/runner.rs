use futures::future::join_all;
use std::future::Future;
use tokio::sync::Mutex;
use tracing::debug;

/// Fixed-size worker pool over an ordered list of deferred operations.
///
/// Workers are futures joined on the calling task, not spawned tasks, so
/// operations interleave cooperatively and may borrow from the caller.
#[derive(Debug, Clone, Copy)]
pub struct BoundedRunner {
    limit: usize,
}

impl BoundedRunner {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Workers started for a batch of `tasks` operations.
    pub fn worker_count(&self, tasks: usize) -> usize {
        self.limit.min(tasks)
    }

    /// Run every operation with at most `limit` in flight and return the
    /// results in input order, whatever order they completed in.
    pub async fn run<F, Fut, T>(&self, tasks: Vec<F>) -> Vec<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let total = tasks.len();
        if total == 0 {
            return Vec::new();
        }

        let workers = self.worker_count(total);
        debug!("Running {} operations on {} workers", total, workers);

        let queue = Mutex::new(tasks.into_iter().enumerate());
        let queue = &queue;

        let worker_futures = (0..workers).map(|_| async move {
            let mut finished = Vec::new();
            loop {
                let next = queue.lock().await.next();
                let Some((index, task)) = next else {
                    break;
                };
                finished.push((index, task().await));
            }
            finished
        });

        let mut results: Vec<(usize, T)> = join_all(worker_futures)
            .await
            .into_iter()
            .flatten()
            .collect();
        results.sort_by_key(|(index, _)| *index);

        results.into_iter().map(|(_, result)| result).collect()
    }
}
