// Seams the workflow depends on, injectable for tests

use chrono::{DateTime, Utc};

use super::commands::WorkflowCommand;
use super::types::WorkflowSnapshot;

/// Time source for timeline stamps and delivery deadlines.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Receives every snapshot that replaced the previous one.
pub trait SnapshotObserver: Send + Sync {
    fn snapshot_changed(&self, snapshot: &WorkflowSnapshot, command: Option<&WorkflowCommand>);
}
