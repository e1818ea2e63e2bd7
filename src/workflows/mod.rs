// Label request workflow
//
// Pure transition logic over immutable snapshots, plus the seams (clock,
// observers) and read-only views built on top of it.

pub mod commands;
pub mod state_machine;
pub mod traits;
pub mod types;
pub mod views;

#[cfg(test)]
pub mod mocks;


pub use commands::{FileUpload, NewQuotation, RequestDraft, WorkflowCommand};
pub use state_machine::{RequestWorkflow, Transition, TransitionResult};
pub use traits::{Clock, SnapshotObserver, SystemClock};
pub use types::{
    Approver, Company, Department, FileKind, FileLocation, FileRecord, FileStatus, LabelRequest,
    ParseError, PaymentMethod, PrintApprovals, ProductStatus, Quotation, QuotationStatus,
    RequestStatus, RollDirection, Severity, TimelineEvent, WorkflowSnapshot,
};
pub use views::{available_actions, department_view, label_group, AvailableAction};
