use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::domain::{HistoryBuffer, MetricId, MetricSample};
use crate::ports::MetricStore;

/// In-memory rolling history, one locked buffer per registered series
pub struct MemoryHistoryStore {
    buffers: HashMap<MetricId, RwLock<HistoryBuffer>>,
    capacity: usize,
}

impl MemoryHistoryStore {
    pub fn new<I>(ids: I, capacity: usize) -> Self
    where
        I: IntoIterator<Item = MetricId>,
    {
        let buffers = ids
            .into_iter()
            .map(|id| (id, RwLock::new(HistoryBuffer::new(capacity))))
            .collect();

        Self {
            buffers,
            capacity: capacity.max(1),
        }
    }

    fn read(lock: &RwLock<HistoryBuffer>) -> RwLockReadGuard<'_, HistoryBuffer> {
        // A panicked writer cannot leave a buffer half-updated, keep serving it
        lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(lock: &RwLock<HistoryBuffer>) -> RwLockWriteGuard<'_, HistoryBuffer> {
        lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MetricStore for MemoryHistoryStore {
    fn append(&self, id: &MetricId, sample: MetricSample) {
        match self.buffers.get(id) {
            Some(lock) => {
                let mut buffer = Self::write(lock);
                buffer.push(sample);
                trace!("{} holds {}/{} samples", id, buffer.len(), buffer.capacity());
            }
            None => debug!("Dropping sample for unregistered series {}", id),
        }
    }

    fn snapshot(&self, id: &MetricId) -> Vec<MetricSample> {
        self.buffers
            .get(id)
            .map(|lock| Self::read(lock).to_vec())
            .unwrap_or_default()
    }

    fn latest(&self, id: &MetricId) -> Option<MetricSample> {
        self.buffers
            .get(id)
            .and_then(|lock| Self::read(lock).latest().cloned())
    }

    fn contains(&self, id: &MetricId) -> bool {
        self.buffers.contains_key(id)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MetricKind;
    use chrono::Utc;
    use std::sync::Arc;

    fn id(name: &str) -> MetricId {
        MetricId::from(name)
    }

    fn sample(value: f64) -> MetricSample {
        MetricSample::new(MetricKind::CounterSnapshot, value, Utc::now())
    }

    #[test]
    fn test_series_are_independent() {
        let store = MemoryHistoryStore::new(vec![id("a"), id("b")], 3);
        store.append(&id("a"), sample(1.0));
        store.append(&id("a"), sample(2.0));
        store.append(&id("b"), sample(9.0));

        assert_eq!(store.snapshot(&id("a")).len(), 2);
        assert_eq!(store.latest(&id("b")).map(|s| s.value), Some(9.0));
    }

    #[test]
    fn test_capacity_bounds_every_series() {
        let store = MemoryHistoryStore::new(vec![id("a")], 20);
        for i in 0..57 {
            store.append(&id("a"), sample(i as f64));
        }

        let history = store.snapshot(&id("a"));
        assert_eq!(history.len(), 20);
        assert_eq!(history.first().map(|s| s.value), Some(37.0));
        assert_eq!(history.last().map(|s| s.value), Some(56.0));
    }

    #[test]
    fn test_unknown_series_is_ignored() {
        let store = MemoryHistoryStore::new(vec![id("a")], 5);
        store.append(&id("missing"), sample(1.0));

        assert!(!store.contains(&id("missing")));
        assert!(store.snapshot(&id("missing")).is_empty());
        assert!(store.latest(&id("missing")).is_none());
    }

    #[test]
    fn test_snapshot_is_detached_from_later_appends() {
        let store = MemoryHistoryStore::new(vec![id("a")], 5);
        store.append(&id("a"), sample(1.0));

        let before = store.snapshot(&id("a"));
        store.append(&id("a"), sample(2.0));

        assert_eq!(before.len(), 1);
        assert_eq!(store.snapshot(&id("a")).len(), 2);
    }

    #[test]
    fn test_concurrent_appends_stay_bounded() {
        let store = Arc::new(MemoryHistoryStore::new(vec![id("a")], 10));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        store.append(&id("a"), sample((t * 100 + i) as f64));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.snapshot(&id("a")).len(), 10);
    }
}
