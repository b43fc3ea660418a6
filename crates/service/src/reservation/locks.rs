use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type SlotKey = (String, NaiveDate);

/// Async mutexes keyed by `(resource_id, date)`.
///
/// Entries are created on demand and removed once the last holder lets go,
/// so the map only grows with the number of concurrently contended days.
#[derive(Default)]
pub struct SlotLocks {
    inner: DashMap<SlotKey, Arc<Mutex<()>>>,
}

pub struct SlotGuard<'a> {
    locks: &'a SlotLocks,
    key: SlotKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl SlotLocks {
    pub fn new() -> Self { Self::default() }

    pub async fn acquire(&self, resource_id: &str, date: NaiveDate) -> SlotGuard<'_> {
        let key = (resource_id.to_string(), date);
        let lock = self.inner.entry(key.clone()).or_default().clone();
        let guard = lock.lock_owned().await;
        SlotGuard { locks: self, key, guard: Some(guard) }
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize { self.inner.len() }

    pub fn is_empty(&self) -> bool { self.inner.is_empty() }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        // only the map still references it: nobody holds or waits
        self.locks.inner.remove_if(&self.key, |_, lock| Arc::strong_count(lock) == 1);
    }
}
