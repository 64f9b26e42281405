pub mod log;
pub mod metrics;

pub use log::MergeLogger;
pub use metrics::{MergeMetrics, MetricsSnapshot};
