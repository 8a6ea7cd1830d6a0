//! Progress log injected into the orchestrator and the organization job.
//!
//! The pipeline never writes to a global logger directly for progress lines;
//! it calls [`ProgressLog::log`] on whatever implementation it was handed.
//! [`TracingProgressLog`] forwards to `tracing`, and [`BatchLog`] prefixes each
//! line with the correlation id of the batch being processed.
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

/// A sink for human-readable progress lines.
pub trait ProgressLog: Send + Sync {
    fn log(&self, message: &str);
}

/// Forwards progress lines to `tracing` at `INFO`.
#[derive(Debug, Clone, Default)]
pub struct TracingProgressLog;

impl ProgressLog for TracingProgressLog {
    fn log(&self, message: &str) {
        info!(target: "org_reshape::progress", "{}", message);
    }
}

/// Prefixes every line with a batch correlation id.
pub struct BatchLog {
    batch_id: Uuid,
    inner: Arc<dyn ProgressLog>,
}

impl BatchLog {
    /// Wraps `inner` with a fresh random correlation id.
    pub fn new(inner: Arc<dyn ProgressLog>) -> Self {
        Self::with_id(Uuid::new_v4(), inner)
    }

    pub fn with_id(batch_id: Uuid, inner: Arc<dyn ProgressLog>) -> Self {
        Self { batch_id, inner }
    }

    pub fn batch_id(&self) -> Uuid {
        self.batch_id
    }
}

impl ProgressLog for BatchLog {
    fn log(&self, message: &str) {
        self.inner.log(&format!("[{}] {}", self.batch_id, message));
    }
}
