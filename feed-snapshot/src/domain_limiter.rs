use crate::types::{AggregatorError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, RwLock, Semaphore};
use tracing::debug;

/// Per-hostname admission control.
///
/// Each domain gets a fair (FIFO) semaphore with `per_domain` slots, created
/// on first use. `reset` drops every domain's state, so limits only hold
/// between two resets.
pub struct DomainLimiter {
    per_domain: usize,
    domains: RwLock<HashMap<String, Arc<Semaphore>>>,
}

/// A reserved slot for one domain. Dropping it frees the slot and admits the
/// longest-waiting caller, if any.
#[derive(Debug)]
pub struct DomainPermit {
    domain: String,
    _permit: OwnedSemaphorePermit,
}

impl DomainPermit {
    pub fn domain(&self) -> &str {
        &self.domain
    }
}

impl DomainLimiter {
    pub fn new(per_domain: usize) -> Self {
        Self {
            per_domain: per_domain.max(1),
            domains: RwLock::new(HashMap::new()),
        }
    }

    pub fn per_domain(&self) -> usize {
        self.per_domain
    }

    async fn semaphore(&self, domain: &str) -> Arc<Semaphore> {
        {
            let domains = self.domains.read().await;
            if let Some(sem) = domains.get(domain) {
                return sem.clone();
            }
        }

        let mut domains = self.domains.write().await;
        domains
            .entry(domain.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_domain)))
            .clone()
    }

    /// Wait until the domain has a free slot, then take it.
    pub async fn acquire(&self, domain: &str) -> Result<DomainPermit> {
        let sem = self.semaphore(domain).await;
        if sem.available_permits() == 0 {
            debug!("Domain {} saturated, queueing request", domain);
        }

        let permit = sem
            .acquire_owned()
            .await
            .map_err(|_| AggregatorError::General(format!("Domain limiter closed for {}", domain)))?;

        Ok(DomainPermit {
            domain: domain.to_string(),
            _permit: permit,
        })
    }

    /// Give a slot back. Equivalent to dropping the permit.
    pub fn release(&self, permit: DomainPermit) {
        debug!("Releasing slot for {}", permit.domain());
        drop(permit);
    }

    /// Number of slots currently held for `domain`.
    pub async fn running(&self, domain: &str) -> usize {
        let domains = self.domains.read().await;
        domains
            .get(domain)
            .map(|sem| self.per_domain - sem.available_permits())
            .unwrap_or(0)
    }

    /// Forget all per-domain state. Permits still held keep their old
    /// semaphore alive but no longer count against the fresh one.
    pub async fn reset(&self) {
        let mut domains = self.domains.write().await;
        domains.clear();
    }

    pub async fn tracked_domains(&self) -> usize {
        self.domains.read().await.len()
    }
}
