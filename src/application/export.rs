use std::sync::Arc;
use std::time::Duration;

use crate::domain::{MetricDefinition, MetricId, MetricKind, MetricSample};
use crate::ports::MetricStore;

/// Snapshot of one series for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct MetricHistory {
    pub id: MetricId,
    pub kind: MetricKind,
    pub title: String,
    pub unit: &'static str,
    pub samples: Vec<MetricSample>,
}

impl MetricHistory {
    pub fn current(&self) -> Option<&MetricSample> {
        self.samples.last()
    }
}

/// Read-only access to current values and histories
pub struct MetricExporter {
    store: Arc<dyn MetricStore>,
    definitions: Vec<MetricDefinition>,
    refresh_interval: Duration,
}

impl MetricExporter {
    pub fn new(
        store: Arc<dyn MetricStore>,
        definitions: Vec<MetricDefinition>,
        refresh_interval: Duration,
    ) -> Self {
        Self {
            store,
            definitions,
            refresh_interval,
        }
    }

    /// Latest sample of a series, `None` before its first tick
    pub fn current(&self, id: &MetricId) -> Option<MetricSample> {
        self.store.latest(id)
    }

    /// Full history of a series, `None` if the series is not registered
    pub fn history(&self, id: &MetricId) -> Option<MetricHistory> {
        self.definitions
            .iter()
            .find(|d| &d.id == id)
            .map(|definition| self.snapshot(definition))
    }

    /// Every series in registration order
    pub fn dashboard(&self) -> Vec<MetricHistory> {
        self.definitions
            .iter()
            .map(|definition| self.snapshot(definition))
            .collect()
    }

    /// Whether the series has a history buffer
    pub fn is_registered(&self, id: &MetricId) -> bool {
        self.store.contains(id)
    }

    pub fn series(&self) -> &[MetricDefinition] {
        &self.definitions
    }

    /// How often the presentation layer should poll
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    fn snapshot(&self, definition: &MetricDefinition) -> MetricHistory {
        let kind = definition.kind();
        MetricHistory {
            id: definition.id.clone(),
            kind,
            title: definition.title().to_string(),
            unit: kind.unit(),
            samples: self.store.snapshot(&definition.id),
        }
    }
}
