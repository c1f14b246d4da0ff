// crates/serve/src/cache.rs

use async_trait::async_trait;
use domain::item::PoolKind;
use parking_lot::RwLock;
use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use crate::pool::{ContentPool, PoolError, RawRecord};

struct Batch {
    fetched_at: Instant,
    /// Size that was asked for when this batch was fetched.
    requested: usize,
    records: Arc<Vec<RawRecord>>,
}

impl Batch {
    /// A batch answers `first` if it was fetched at least that large, or if
    /// the pool came back short (nothing more to get).
    fn covers(&self, first: usize) -> bool {
        first <= self.requested || self.records.len() < self.requested
    }
}

/// Revalidating wrapper around any pool.
///
/// The last batch is kept for `ttl`. A request that fits inside it is served
/// from memory; a larger one, or one after expiry, goes to the inner pool and
/// replaces the batch. A fetch that lands after a larger one still fresh in
/// the slot does not replace it. Failed fetches leave the cache untouched.
pub struct CachedPool<P> {
    inner: P,
    ttl: Duration,
    slot: RwLock<Option<Batch>>,
}

impl<P: ContentPool> CachedPool<P> {
    pub fn new(inner: P, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            slot: RwLock::new(None),
        }
    }

    fn cached(&self, first: usize) -> Option<Vec<RawRecord>> {
        let guard = self.slot.read();
        let batch = guard.as_ref()?;
        if batch.fetched_at.elapsed() >= self.ttl || !batch.covers(first) {
            return None;
        }
        Some(batch.records.iter().take(first).cloned().collect())
    }

    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}

#[async_trait]
impl<P: ContentPool> ContentPool for CachedPool<P> {
    fn kind(&self) -> PoolKind {
        self.inner.kind()
    }

    async fn fetch(&self, first: usize) -> Result<Vec<RawRecord>, PoolError> {
        if let Some(hit) = self.cached(first) {
            tracing::trace!(pool = %self.kind(), first, "pool cache hit");
            return Ok(hit);
        }

        let records = Arc::new(self.inner.fetch(first).await?);
        let out = records.as_ref().clone();

        let mut slot = self.slot.write();
        let keep_current = slot
            .as_ref()
            .is_some_and(|b| b.fetched_at.elapsed() < self.ttl && b.requested > first);
        if !keep_current {
            *slot = Some(Batch {
                fetched_at: Instant::now(),
                requested: first,
                records,
            });
        }

        Ok(out)
    }
}
