use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Counters for workflow commands and file uploads
#[derive(Debug, Default)]
pub struct WorkflowMetrics {
    pub commands_applied: AtomicU64,
    pub commands_ignored: AtomicU64,
    pub uploads_committed: AtomicU64,
    pub upload_failures: AtomicU64,
}

impl WorkflowMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_applied(&self) {
        self.commands_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_ignored(&self) {
        self.commands_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload_committed(&self) {
        self.uploads_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_upload_failure(&self) {
        self.upload_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> WorkflowStats {
        WorkflowStats {
            commands_applied: self.commands_applied.load(Ordering::Relaxed),
            commands_ignored: self.commands_ignored.load(Ordering::Relaxed),
            uploads_committed: self.uploads_committed.load(Ordering::Relaxed),
            upload_failures: self.upload_failures.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            commands_applied = stats.commands_applied,
            commands_ignored = stats.commands_ignored,
            uploads_committed = stats.uploads_committed,
            upload_failures = stats.upload_failures,
            "Workflow metrics"
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowStats {
    pub commands_applied: u64,
    pub commands_ignored: u64,
    pub uploads_committed: u64,
    pub upload_failures: u64,
}

/// Global metrics instance
static WORKFLOW_METRICS: std::sync::LazyLock<WorkflowMetrics> =
    std::sync::LazyLock::new(WorkflowMetrics::new);

pub fn workflow_metrics() -> &'static WorkflowMetrics {
    &WORKFLOW_METRICS
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = WorkflowMetrics::new();
        metrics.record_applied();
        metrics.record_applied();
        metrics.record_ignored();
        metrics.record_upload_failure();

        let stats = metrics.get_stats();
        assert_eq!(stats.commands_applied, 2);
        assert_eq!(stats.commands_ignored, 1);
        assert_eq!(stats.uploads_committed, 0);
        assert_eq!(stats.upload_failures, 1);
    }
}
