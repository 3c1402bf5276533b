use crate::domain::{MetricId, MetricSample};

/// Port for the per-series rolling history
pub trait MetricStore: Send + Sync {
    /// Append a sample, evicting the oldest one when the series is full
    fn append(&self, id: &MetricId, sample: MetricSample);

    /// Owned copy of a series, oldest first. Empty for unknown series.
    fn snapshot(&self, id: &MetricId) -> Vec<MetricSample>;

    /// Most recent sample of a series
    fn latest(&self, id: &MetricId) -> Option<MetricSample>;

    /// Whether the series has a buffer
    fn contains(&self, id: &MetricId) -> bool;

    /// Maximum number of samples kept per series
    fn capacity(&self) -> usize;
}
