use std::sync::Mutex;

/// Member counts shared between merge workers.
pub struct MergeMetrics {
    inner: Mutex<MetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub merged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl MergeMetrics {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_merged(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.merged += 1;
        }
    }

    /// An input left out on purpose: excluded, not raw, or undecodable.
    pub fn record_skipped(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.skipped += 1;
        }
    }

    pub fn record_failed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.failed += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MergeMetrics {
    fn default() -> Self {
        Self::new()
    }
}
