use std::sync::Arc;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::debug;

use crate::observability::workflow_metrics;
use crate::telemetry::{create_command_span, generate_correlation_id};
use crate::workflows::{
    LabelRequest, RequestWorkflow, SnapshotObserver, TransitionResult, WorkflowCommand,
    WorkflowSnapshot,
};

/// Application state: the current snapshot plus whoever wants to hear about changes.
///
/// Commands run one at a time through `dispatch`, which computes the whole
/// next snapshot and swaps it in before notifying observers.
pub struct AppState {
    workflow: RequestWorkflow,
    snapshot: WorkflowSnapshot,
    observers: Vec<Arc<dyn SnapshotObserver>>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("workflow", &self.workflow)
            .field("current_department", &self.snapshot.current_department)
            .field("requests", &self.snapshot.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl AppState {
    pub fn new(workflow: RequestWorkflow, snapshot: WorkflowSnapshot) -> Self {
        Self {
            workflow,
            snapshot,
            observers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, observer: Arc<dyn SnapshotObserver>) {
        self.observers.push(observer);
    }

    pub fn snapshot(&self) -> &WorkflowSnapshot {
        &self.snapshot
    }

    pub fn dispatch(&mut self, command: WorkflowCommand) -> TransitionResult {
        let correlation_id = generate_correlation_id();
        let span = create_command_span(command.name(), command.request_id(), &correlation_id);
        let _enter = span.enter();

        let transition = self.workflow.apply(&self.snapshot, &command);
        let metrics = workflow_metrics();
        if transition.result.is_applied() {
            metrics.record_applied();
        } else {
            metrics.record_ignored();
        }

        if transition.snapshot == self.snapshot {
            debug!(command = command.name(), "Snapshot unchanged, observers not notified");
            return transition.result;
        }

        self.snapshot = transition.snapshot;
        self.notify(Some(&command));
        transition.result
    }

    /// Install a snapshot that arrived from elsewhere, e.g. a remote subscription.
    pub fn replace_snapshot(&mut self, snapshot: WorkflowSnapshot) {
        if snapshot == self.snapshot {
            return;
        }
        self.snapshot = snapshot;
        self.notify(None);
    }

    /// Install the request list published by the document store, keeping the
    /// selected department. Returns whether anything changed.
    pub fn replace_requests(&mut self, requests: Vec<LabelRequest>) -> bool {
        let before = self.snapshot.len();
        let snapshot = WorkflowSnapshot {
            current_department: self.snapshot.current_department,
            requests,
        };
        if snapshot == self.snapshot {
            return false;
        }
        debug!(before, after = snapshot.len(), "Remote request list installed");
        self.replace_snapshot(snapshot);
        true
    }

    /// Apply whatever the document store feed has delivered since the last
    /// call. Only the newest list matters; lagged lists are skipped.
    pub fn drain_remote_changes(
        &mut self,
        feed: &mut broadcast::Receiver<Vec<LabelRequest>>,
    ) -> bool {
        let mut latest = None;
        loop {
            match feed.try_recv() {
                Ok(requests) => latest = Some(requests),
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "Remote feed lagged, waiting for a newer list");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        latest.is_some_and(|requests| self.replace_requests(requests))
    }

    pub fn into_snapshot(self) -> WorkflowSnapshot {
        self.snapshot
    }

    fn notify(&self, command: Option<&WorkflowCommand>) {
        for observer in &self.observers {
            observer.snapshot_changed(&self.snapshot, command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::mocks::{draft, MockClock, RecordingObserver};
    use crate::workflows::Department;

    fn state() -> AppState {
        let workflow = RequestWorkflow::new(Arc::new(MockClock::new()));
        AppState::new(workflow, WorkflowSnapshot::default())
    }

    #[test]
    fn test_dispatch_notifies_observers_on_change() {
        let mut state = state();
        let observer = Arc::new(RecordingObserver::new());
        state.subscribe(observer.clone());

        let result = state.dispatch(WorkflowCommand::AddRequest { draft: draft("L1") });

        assert!(result.is_applied());
        assert_eq!(state.snapshot().len(), 3);
        assert_eq!(
            observer.notifications(),
            vec![(3, Some("add-request".to_string()))]
        );
    }

    #[test]
    fn test_ignored_command_keeps_snapshot_and_stays_silent() {
        let mut state = state();
        let observer = Arc::new(RecordingObserver::new());
        state.subscribe(observer.clone());

        let result = state.dispatch(WorkflowCommand::MarkLabelReceived {
            request_id: "nope".to_string(),
        });

        assert!(!result.is_applied());
        assert!(state.snapshot().is_empty());
        assert!(observer.notifications().is_empty());
    }

    #[test]
    fn test_selecting_same_department_is_silent() {
        let mut state = state();
        let observer = Arc::new(RecordingObserver::new());
        state.subscribe(observer.clone());

        state.dispatch(WorkflowCommand::SetCurrentDepartment {
            department: Department::Marketing,
        });
        assert!(observer.notifications().is_empty());

        state.dispatch(WorkflowCommand::SetCurrentDepartment {
            department: Department::Printer2,
        });
        assert_eq!(state.snapshot().current_department, Department::Printer2);
        assert_eq!(observer.notifications().len(), 1);
    }

    #[test]
    fn test_replace_snapshot_notifies_without_command() {
        let mut state = state();
        let observer = Arc::new(RecordingObserver::new());
        state.subscribe(observer.clone());

        let mut remote = WorkflowSnapshot::default();
        remote.current_department = Department::Purchasing;
        state.replace_snapshot(remote.clone());
        state.replace_snapshot(remote);

        assert_eq!(observer.notifications(), vec![(0, None)]);
    }

    #[test]
    fn test_remote_requests_keep_selected_department() {
        let mut state = state();
        state.dispatch(WorkflowCommand::SetCurrentDepartment {
            department: Department::Regulatory,
        });
        let remote = {
            let mut other = self::state();
            other.dispatch(WorkflowCommand::AddRequest { draft: draft("REMOTE") });
            other.into_snapshot().requests
        };

        assert!(state.replace_requests(remote.clone()));
        assert!(!state.replace_requests(remote));
        assert_eq!(state.snapshot().current_department, Department::Regulatory);
        assert_eq!(state.snapshot().len(), 3);
    }

    #[test]
    fn test_feed_applies_only_newest_list() {
        let mut state = state();
        let observer = Arc::new(RecordingObserver::new());
        state.subscribe(observer.clone());
        let (sender, mut feed) = broadcast::channel(4);

        assert!(!state.drain_remote_changes(&mut feed));

        let mut remote = self::state();
        remote.dispatch(WorkflowCommand::AddRequest { draft: draft("A") });
        sender.send(remote.snapshot().requests.clone()).unwrap();
        remote.dispatch(WorkflowCommand::AddRequest { draft: draft("B") });
        sender.send(remote.snapshot().requests.clone()).unwrap();

        assert!(state.drain_remote_changes(&mut feed));
        assert_eq!(state.snapshot().requests, remote.snapshot().requests);
        assert_eq!(observer.notifications(), vec![(6, None)]);
    }
}
