// Request workflow transitions
//
// Each command reads the previous snapshot and produces a whole new one.
// A logical request is materialized as one copy per department sharing a
// label code, so every transition locates its source copy by id and then
// applies the change to every copy in that label group.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use super::commands::{FileUpload, NewQuotation, RequestDraft, WorkflowCommand};
use super::traits::{Clock, SystemClock};
use super::types::{
    Approver, Department, FileKind, FileLocation, FileRecord, FileStatus, LabelRequest,
    PrintApprovals, Quotation, QuotationStatus, RequestStatus, Severity, TimelineEvent,
    WorkflowSnapshot,
};

pub const DEFAULT_DELIVERY_WINDOW_DAYS: i64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    Applied {
        label_code: Option<String>,
        copies_touched: usize,
    },
    Ignored {
        reason: String,
    },
}

impl TransitionResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, TransitionResult::Applied { .. })
    }

    fn ignored(reason: impl Into<String>) -> Self {
        TransitionResult::Ignored {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transition {
    pub snapshot: WorkflowSnapshot,
    pub result: TransitionResult,
}

impl Transition {
    fn unchanged(snapshot: &WorkflowSnapshot, result: TransitionResult) -> Self {
        Self {
            snapshot: snapshot.clone(),
            result,
        }
    }

    fn lookup_miss(snapshot: &WorkflowSnapshot, request_id: &str) -> Self {
        Self::unchanged(
            snapshot,
            TransitionResult::ignored(format!("no request with id {request_id}")),
        )
    }
}

pub struct RequestWorkflow {
    clock: Arc<dyn Clock>,
    delivery_window: Duration,
}

impl std::fmt::Debug for RequestWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestWorkflow")
            .field("delivery_window_days", &self.delivery_window.num_days())
            .finish()
    }
}

impl Default for RequestWorkflow {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RequestWorkflow {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            delivery_window: Duration::days(DEFAULT_DELIVERY_WINDOW_DAYS),
        }
    }

    pub fn with_delivery_window_days(mut self, days: u32) -> Self {
        self.delivery_window = Duration::days(i64::from(days));
        self
    }

    pub fn delivery_window(&self) -> Duration {
        self.delivery_window
    }

    /// Compute the snapshot that follows `snapshot` once `command` is applied.
    ///
    /// Never fails: a command whose target copy does not exist yields the
    /// unchanged snapshot and `TransitionResult::Ignored`.
    pub fn apply(&self, snapshot: &WorkflowSnapshot, command: &WorkflowCommand) -> Transition {
        let now = self.clock.now();

        let transition = match command {
            WorkflowCommand::SetCurrentDepartment { department } => {
                let mut next = snapshot.clone();
                next.current_department = *department;
                Transition {
                    snapshot: next,
                    result: TransitionResult::Applied {
                        label_code: None,
                        copies_touched: 0,
                    },
                }
            }
            WorkflowCommand::AddRequest { draft } => self.add_request(snapshot, draft, now),
            WorkflowCommand::AddQuotation {
                request_id,
                quotation,
            } => self.add_quotation(snapshot, request_id, quotation, now),
            WorkflowCommand::ApproveQuotation {
                request_id,
                quotation_id,
            } => self.approve_quotation(snapshot, request_id, quotation_id, now),
            WorkflowCommand::SendToPrinter {
                request_id,
                printer,
            } => self.send_to_printer(snapshot, request_id, *printer, now),
            WorkflowCommand::SubmitPrint { request_id, file } => {
                self.submit_print(snapshot, request_id, file, now)
            }
            WorkflowCommand::SubmitCorrectedFile { request_id, file } => {
                self.submit_corrected_file(snapshot, request_id, file, now)
            }
            WorkflowCommand::SubmitNewPrint { request_id, file } => {
                self.submit_new_print(snapshot, request_id, file, now)
            }
            WorkflowCommand::ApprovePrint {
                request_id,
                approver,
            } => self.approve_print(snapshot, request_id, *approver, now),
            WorkflowCommand::RejectPrint {
                request_id,
                approver,
                reason,
            } => self.reject_print(snapshot, request_id, *approver, reason, now),
            WorkflowCommand::MarkLabelReceived { request_id } => {
                self.mark_label_received(snapshot, request_id, now)
            }
        };

        match &transition.result {
            TransitionResult::Applied {
                label_code,
                copies_touched,
            } => info!(
                command = command.name(),
                label_code = label_code.as_deref(),
                copies_touched = %copies_touched,
                "Workflow command applied"
            ),
            TransitionResult::Ignored { reason } => warn!(
                command = command.name(),
                request_id = command.request_id(),
                reason = %reason,
                "Workflow command ignored"
            ),
        }

        transition
    }

    /// Apply `update` to every copy sharing the source copy's label code.
    fn update_group<F>(
        &self,
        snapshot: &WorkflowSnapshot,
        request_id: &str,
        mut update: F,
    ) -> Transition
    where
        F: FnMut(&mut LabelRequest),
    {
        let Some(label_code) = snapshot.find(request_id).map(|r| r.label_code.clone()) else {
            return Transition::lookup_miss(snapshot, request_id);
        };

        let mut next = snapshot.clone();
        let mut copies_touched = 0;
        for request in next
            .requests
            .iter_mut()
            .filter(|r| r.label_code == label_code)
        {
            update(request);
            copies_touched += 1;
        }

        Transition {
            snapshot: next,
            result: TransitionResult::Applied {
                label_code: Some(label_code),
                copies_touched,
            },
        }
    }

    fn add_request(
        &self,
        snapshot: &WorkflowSnapshot,
        draft: &RequestDraft,
        now: DateTime<Utc>,
    ) -> Transition {
        let mut files = Vec::new();
        if !draft.file_link.is_empty() {
            files.push(FileRecord::new(
                FileLocation::Committed {
                    url: draft.file_link.clone(),
                },
                FileKind::OriginalLink,
                Department::Marketing,
                1,
                now,
            ));
        }
        if let Some(upload) = &draft.file_upload {
            files.push(FileRecord::new(
                pending(upload),
                FileKind::OriginalUpload,
                Department::Marketing,
                1,
                now,
            ));
        }

        let template = LabelRequest {
            id: String::new(),
            label_code: draft.label_code.clone(),
            request_date: draft.request_date.clone(),
            label_name: draft.label_name.clone(),
            unit_quantity: draft.unit_quantity,
            dimensions: draft.dimensions.clone(),
            company: draft.company,
            file_link: draft.file_link.clone(),
            purchasing_send_date: draft.purchasing_send_date.clone(),
            product_status: draft.product_status,
            finishing: draft.finishing.clone(),
            observation: draft.observation.clone(),
            status: RequestStatus::ForwardedToPurchasing,
            department: Department::Marketing,
            timeline: Vec::new(),
            files,
            quotations: Vec::new(),
            selected_printer: None,
            print_approvals: None,
            print_rejection_reason: None,
            approval_date: None,
            delivery_deadline: None,
            received_date: None,
            created_at: now,
        };

        let mut next = snapshot.clone();
        let copies: Vec<LabelRequest> = Department::INITIAL
            .iter()
            .map(|department| seed_copy(&template, *department, now))
            .collect();
        next.requests.splice(0..0, copies);

        Transition {
            snapshot: next,
            result: TransitionResult::Applied {
                label_code: Some(draft.label_code.clone()),
                copies_touched: Department::INITIAL.len(),
            },
        }
    }

    fn add_quotation(
        &self,
        snapshot: &WorkflowSnapshot,
        request_id: &str,
        terms: &NewQuotation,
        now: DateTime<Utc>,
    ) -> Transition {
        let quotation = Quotation {
            id: Uuid::new_v4().to_string(),
            request_id: request_id.to_string(),
            order_request_date: terms.order_request_date.clone(),
            product_code: terms.product_code.clone(),
            product_name: terms.product_name.clone(),
            company: terms.company,
            printer: terms.printer.clone(),
            printer_send_date: terms.printer_send_date.clone(),
            unit_price: terms.unit_price,
            payment_terms: terms.payment_terms,
            print_preview: terms.print_preview.clone(),
            payment_method: terms.payment_method,
            delivery_time: terms.delivery_time.clone(),
            roll_direction: terms.roll_direction,
            status: QuotationStatus::Pending,
            created_at: now,
        };

        self.update_group(snapshot, request_id, |request| {
            request.quotations.push(quotation.clone());
            request.timeline.push(TimelineEvent::new(
                format!("Quotation added for {}", quotation.printer),
                Severity::Info,
                request.department,
                now,
            ));
        })
    }

    fn approve_quotation(
        &self,
        snapshot: &WorkflowSnapshot,
        request_id: &str,
        quotation_id: &str,
        now: DateTime<Utc>,
    ) -> Transition {
        let Some(source) = snapshot.find(request_id) else {
            return Transition::lookup_miss(snapshot, request_id);
        };
        if !source.quotations.iter().any(|q| q.id == quotation_id) {
            return Transition::unchanged(
                snapshot,
                TransitionResult::ignored(format!(
                    "request {request_id} has no quotation {quotation_id}"
                )),
            );
        }

        // Other quotations keep their status; approving several is allowed.
        self.update_group(snapshot, request_id, |request| {
            for quotation in request.quotations.iter_mut().filter(|q| q.id == quotation_id) {
                quotation.status = QuotationStatus::Approved;
            }
            request.timeline.push(TimelineEvent::new(
                "Quotation approved",
                Severity::Success,
                request.department,
                now,
            ));
        })
    }

    fn send_to_printer(
        &self,
        snapshot: &WorkflowSnapshot,
        request_id: &str,
        printer: Department,
        now: DateTime<Utc>,
    ) -> Transition {
        let mut transition = self.update_group(snapshot, request_id, |request| {
            request.selected_printer = Some(printer);
            request.timeline.push(TimelineEvent::new(
                format!("Request sent to {printer}"),
                Severity::Info,
                request.department,
                now,
            ));
        });

        if let TransitionResult::Applied { copies_touched, .. } = &mut transition.result {
            // Seeded from the source copy as it was before this command.
            if let Some(source) = snapshot.find(request_id) {
                let mut printer_copy = seed_copy(source, printer, now);
                printer_copy.selected_printer = Some(printer);
                printer_copy.created_at = now;
                transition.snapshot.requests.insert(0, printer_copy);
                *copies_touched += 1;
            }
        }

        transition
    }

    fn submit_print(
        &self,
        snapshot: &WorkflowSnapshot,
        request_id: &str,
        upload: &FileUpload,
        now: DateTime<Utc>,
    ) -> Transition {
        let Some(source) = snapshot.find(request_id) else {
            return Transition::lookup_miss(snapshot, request_id);
        };
        // Prints are always version 1, resubmissions go through new-print.
        let file = FileRecord::new(pending(upload), FileKind::Print, source.department, 1, now);
        let author = source.department;

        self.update_group(snapshot, request_id, |request| {
            request.status = RequestStatus::AwaitingPrintApproval;
            request.print_approvals = Some(PrintApprovals::default());
            // A new approval round starts without the previous round's deadline.
            request.approval_date = None;
            request.delivery_deadline = None;
            request.files.push(file.clone());
            request.timeline.push(TimelineEvent::new(
                "Print submitted for approval",
                Severity::Info,
                author,
                now,
            ));
        })
    }

    fn submit_corrected_file(
        &self,
        snapshot: &WorkflowSnapshot,
        request_id: &str,
        upload: &FileUpload,
        now: DateTime<Utc>,
    ) -> Transition {
        let Some(source) = snapshot.find(request_id) else {
            return Transition::lookup_miss(snapshot, request_id);
        };
        let file = FileRecord::new(
            pending(upload),
            FileKind::MarketingCorrection,
            Department::Marketing,
            source.next_version(FileKind::MarketingCorrection),
            now,
        );

        self.update_group(snapshot, request_id, |request| {
            request.status = RequestStatus::AwaitingNewPrint;
            request.files.push(file.clone());
            request.timeline.push(TimelineEvent::new(
                "Corrected file sent to printer",
                Severity::Info,
                Department::Marketing,
                now,
            ));
        })
    }

    fn submit_new_print(
        &self,
        snapshot: &WorkflowSnapshot,
        request_id: &str,
        upload: &FileUpload,
        now: DateTime<Utc>,
    ) -> Transition {
        let Some(source) = snapshot.find(request_id) else {
            return Transition::lookup_miss(snapshot, request_id);
        };
        let file = FileRecord::new(
            pending(upload),
            FileKind::NewPrint,
            source.department,
            source.next_version(FileKind::NewPrint),
            now,
        );
        let author = source.department;

        self.update_group(snapshot, request_id, |request| {
            request.status = RequestStatus::AwaitingPrintApproval;
            request.print_approvals = Some(PrintApprovals::default());
            // A new approval round starts without the previous round's deadline.
            request.approval_date = None;
            request.delivery_deadline = None;
            request.files.push(file.clone());
            request.timeline.push(TimelineEvent::new(
                "New print submitted for approval",
                Severity::Info,
                author,
                now,
            ));
        })
    }

    fn approve_print(
        &self,
        snapshot: &WorkflowSnapshot,
        request_id: &str,
        approver: Approver,
        now: DateTime<Utc>,
    ) -> Transition {
        let deadline = now + self.delivery_window;

        self.update_group(snapshot, request_id, |request| {
            let mut approvals = request.print_approvals.unwrap_or_default();
            approvals.grant(approver);
            request.print_approvals = Some(approvals);

            let final_approval = approvals.is_complete();
            if final_approval {
                request.status = RequestStatus::PrintApproved;
                request.approval_date = Some(now);
                request.delivery_deadline = Some(deadline);
                mark_prints(request, FileStatus::PrintApproved);
            }

            let suffix = if final_approval { " - final approval" } else { "" };
            request.timeline.push(TimelineEvent::new(
                format!("Print approved by {approver}{suffix}"),
                Severity::Success,
                approver.department(),
                now,
            ));
        })
    }

    fn reject_print(
        &self,
        snapshot: &WorkflowSnapshot,
        request_id: &str,
        approver: Approver,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Transition {
        self.update_group(snapshot, request_id, |request| {
            request.status = RequestStatus::PrintRejected;
            request.print_approvals = Some(PrintApprovals::default());
            request.print_rejection_reason = Some(reason.to_string());
            mark_prints(request, FileStatus::PrintRejected);
            request.timeline.push(TimelineEvent::new(
                format!("Print rejected by {approver}. Reason: {reason}"),
                Severity::Error,
                approver.department(),
                now,
            ));
        })
    }

    fn mark_label_received(
        &self,
        snapshot: &WorkflowSnapshot,
        request_id: &str,
        now: DateTime<Utc>,
    ) -> Transition {
        self.update_group(snapshot, request_id, |request| {
            // Without a deadline the delivery cannot be late.
            let late = request.delivery_deadline.is_some_and(|deadline| deadline < now);
            let (status, severity, description) = if late {
                (RequestStatus::LabelDeliveredLate, Severity::Error, "Label received late")
            } else {
                (RequestStatus::LabelDeliveredOnTime, Severity::Success, "Label received on time")
            };

            request.status = status;
            request.received_date = Some(now);
            request.timeline.push(TimelineEvent::new(
                description,
                severity,
                request.department,
                now,
            ));
        })
    }
}

fn pending(upload: &FileUpload) -> FileLocation {
    FileLocation::Pending {
        local_ref: upload.local_ref.clone(),
    }
}

fn mark_prints(request: &mut LabelRequest, status: FileStatus) {
    for file in request.files.iter_mut().filter(|f| f.kind.is_print()) {
        file.status = Some(status);
    }
}

/// A fresh department copy: new id, initial status and a single seed entry.
fn seed_copy(template: &LabelRequest, department: Department, now: DateTime<Utc>) -> LabelRequest {
    let description = if department == Department::Marketing {
        "Request created"
    } else {
        "Request received from marketing"
    };

    LabelRequest {
        id: Uuid::new_v4().to_string(),
        department,
        status: RequestStatus::ForwardedToPurchasing,
        timeline: vec![TimelineEvent::new(description, Severity::Info, department, now)],
        ..template.clone()
    }
}
