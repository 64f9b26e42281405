use log::{debug, info, warn};

/// Prefixes every line of one merge call with a context label, usually the
/// archive or output name.
#[derive(Debug, Clone)]
pub struct MergeLogger {
    context: String,
}

impl MergeLogger {
    pub fn new(context: impl Into<String>) -> Self {
        Self {
            context: context.into(),
        }
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.context, message);
    }

    pub fn detail(&self, message: &str) {
        debug!("[{}] {}", self.context, message);
    }

    pub fn skipped(&self, message: &str) {
        warn!("[{}] {}", self.context, message);
    }
}

impl Default for MergeLogger {
    fn default() -> Self {
        Self::new("merge")
    }
}
