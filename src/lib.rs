// Labelflow Library - label request approval workflow
// This exposes the core components for testing and integration

pub mod app_state;
pub mod cli;
pub mod config;
pub mod fs;
pub mod observability;
pub mod persistence;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use app_state::AppState;
pub use config::LabelflowConfig;
pub use fs::{FileSystemOperations, StandardFileSystem};
pub use observability::{workflow_metrics, OperationTimer, WorkflowMetrics, WorkflowStats};
pub use persistence::{
    commit_pending_files, publish_snapshot, pull_snapshot, BlobStore, FileDocumentStore,
    FileSystemBlobStore, LocalSnapshotStore, PersistenceError, RequestRepository, SnapshotStore,
};
pub use telemetry::{create_command_span, generate_correlation_id, init_telemetry};
pub use workflows::{
    available_actions, department_view, label_group, Approver, Clock, Department, LabelRequest,
    RequestStatus, RequestWorkflow, SnapshotObserver, SystemClock, Transition, TransitionResult,
    WorkflowCommand, WorkflowSnapshot,
};
