//! End-to-end walks of a label request through every department, driven
//! through `AppState` the way the CLI drives it.

use chrono::Duration;
use labelflow::workflows::{FileKind, FileStatus, QuotationStatus};
use labelflow::{
    available_actions, department_view, label_group, AppState, Approver, Clock, Department,
    RequestStatus, RequestWorkflow, TransitionResult, WorkflowCommand, WorkflowSnapshot,
};
use std::sync::Arc;

mod fixtures;
use fixtures::{draft, quotation, upload, ManualClock};

fn app(clock: &ManualClock) -> AppState {
    AppState::new(
        RequestWorkflow::new(Arc::new(clock.clone())),
        WorkflowSnapshot::default(),
    )
}

fn copy_id(state: &AppState, department: Department) -> String {
    department_view(state.snapshot(), department)
        .next()
        .map(|r| r.id.clone())
        .expect("department copy exists")
}

/// Runs a request up to the point where the printer has submitted a proof.
fn request_with_print(state: &mut AppState, label_code: &str) -> String {
    state.dispatch(WorkflowCommand::AddRequest {
        draft: draft(label_code),
    });
    let purchasing = copy_id(state, Department::Purchasing);

    state.dispatch(WorkflowCommand::AddQuotation {
        request_id: purchasing.clone(),
        quotation: quotation("Gráfica Norte", 0.12),
    });
    let quotation_id = state.snapshot().find(&purchasing).unwrap().quotations[0]
        .id
        .clone();
    state.dispatch(WorkflowCommand::ApproveQuotation {
        request_id: purchasing.clone(),
        quotation_id,
    });
    state.dispatch(WorkflowCommand::SendToPrinter {
        request_id: purchasing,
        printer: Department::Printer2,
    });

    let printer = copy_id(state, Department::Printer2);
    state.dispatch(WorkflowCommand::SubmitPrint {
        request_id: printer.clone(),
        file: upload("/tmp/proof-v1.pdf"),
    });
    printer
}

#[test]
fn test_happy_path_delivers_on_time() {
    let clock = ManualClock::new();
    let mut state = app(&clock);
    let printer = request_with_print(&mut state, "SH-300");

    assert_eq!(label_group(state.snapshot(), "SH-300").count(), 4);
    assert!(label_group(state.snapshot(), "SH-300")
        .all(|r| r.status == RequestStatus::AwaitingPrintApproval));

    clock.advance(Duration::hours(2));
    state.dispatch(WorkflowCommand::ApprovePrint {
        request_id: copy_id(&state, Department::Marketing),
        approver: Approver::Marketing,
    });
    let result = state.dispatch(WorkflowCommand::ApprovePrint {
        request_id: copy_id(&state, Department::Regulatory),
        approver: Approver::Regulatory,
    });
    assert_eq!(
        result,
        TransitionResult::Applied {
            label_code: Some("SH-300".to_string()),
            copies_touched: 4,
        }
    );

    let approved_at = clock.now();
    for request in label_group(state.snapshot(), "SH-300") {
        assert_eq!(request.status, RequestStatus::PrintApproved);
        assert_eq!(request.approval_date, Some(approved_at));
        assert_eq!(request.delivery_deadline, Some(approved_at + Duration::days(15)));
        let print = request.files_of_kind(FileKind::Print).next().unwrap();
        assert_eq!(print.status, Some(FileStatus::PrintApproved));
    }

    clock.advance(Duration::days(10));
    state.dispatch(WorkflowCommand::MarkLabelReceived { request_id: printer });
    for request in label_group(state.snapshot(), "SH-300") {
        assert_eq!(request.status, RequestStatus::LabelDeliveredOnTime);
        assert!(request.status.is_terminal());
        assert_eq!(request.received_date, Some(clock.now()));
    }
}

#[test]
fn test_late_delivery_is_flagged() {
    let clock = ManualClock::new();
    let mut state = app(&clock);
    let printer = request_with_print(&mut state, "LATE");

    for approver in [Approver::Regulatory, Approver::Marketing] {
        state.dispatch(WorkflowCommand::ApprovePrint {
            request_id: printer.clone(),
            approver,
        });
    }

    clock.advance(Duration::days(16));
    state.dispatch(WorkflowCommand::MarkLabelReceived {
        request_id: copy_id(&state, Department::Marketing),
    });

    let marketing = state.snapshot().find(&copy_id(&state, Department::Marketing)).unwrap();
    assert_eq!(marketing.status, RequestStatus::LabelDeliveredLate);
    assert_eq!(
        marketing.timeline.last().map(|e| e.description.as_str()),
        Some("Label received late")
    );
}

#[test]
fn test_rejection_cycle_versions_files() {
    let clock = ManualClock::new();
    let mut state = app(&clock);
    let printer = request_with_print(&mut state, "CYCLE");
    let marketing = copy_id(&state, Department::Marketing);

    state.dispatch(WorkflowCommand::ApprovePrint {
        request_id: marketing.clone(),
        approver: Approver::Marketing,
    });
    state.dispatch(WorkflowCommand::RejectPrint {
        request_id: marketing.clone(),
        approver: Approver::Regulatory,
        reason: "Allergen warning missing".to_string(),
    });

    let rejected = state.snapshot().find(&marketing).unwrap();
    assert_eq!(rejected.status, RequestStatus::PrintRejected);
    let approvals = rejected.print_approvals.unwrap();
    assert!(!approvals.marketing && !approvals.regulatory);
    assert_eq!(
        rejected.print_rejection_reason.as_deref(),
        Some("Allergen warning missing")
    );
    assert_eq!(
        available_actions(rejected),
        vec![labelflow::workflows::AvailableAction::SubmitCorrectedFile]
    );

    state.dispatch(WorkflowCommand::SubmitCorrectedFile {
        request_id: marketing.clone(),
        file: upload("/tmp/artwork-v2.pdf"),
    });
    assert_eq!(
        state.snapshot().find(&printer).unwrap().status,
        RequestStatus::AwaitingNewPrint
    );

    for path in ["/tmp/proof-v2.pdf", "/tmp/proof-v3.pdf"] {
        state.dispatch(WorkflowCommand::SubmitNewPrint {
            request_id: printer.clone(),
            file: upload(path),
        });
    }

    let printer_copy = state.snapshot().find(&printer).unwrap();
    let versions: Vec<u32> = printer_copy
        .files_of_kind(FileKind::NewPrint)
        .map(|f| f.version)
        .collect();
    assert_eq!(versions, vec![1, 2]);
    assert_eq!(
        printer_copy
            .files_of_kind(FileKind::MarketingCorrection)
            .next()
            .map(|f| f.version),
        Some(1)
    );
    assert_eq!(printer_copy.status, RequestStatus::AwaitingPrintApproval);
    assert_eq!(printer_copy.print_approvals.map(|a| a.is_complete()), Some(false));
}

#[test]
fn test_requests_with_other_codes_are_untouched() {
    let clock = ManualClock::new();
    let mut state = app(&clock);
    state.dispatch(WorkflowCommand::AddRequest { draft: draft("OTHER") });
    let before: Vec<_> = label_group(state.snapshot(), "OTHER").cloned().collect();

    request_with_print(&mut state, "MAIN");

    let after: Vec<_> = label_group(state.snapshot(), "OTHER").cloned().collect();
    assert_eq!(before, after);
    assert_eq!(state.snapshot().len(), 7);
}

#[test]
fn test_quotations_are_shared_and_approval_is_not_exclusive() {
    let clock = ManualClock::new();
    let mut state = app(&clock);
    state.dispatch(WorkflowCommand::AddRequest { draft: draft("Q") });
    let purchasing = copy_id(&state, Department::Purchasing);

    for (printer, price) in [("Norte", 0.10), ("Sul", 0.09)] {
        state.dispatch(WorkflowCommand::AddQuotation {
            request_id: purchasing.clone(),
            quotation: quotation(printer, price),
        });
    }
    let ids: Vec<String> = state.snapshot().find(&purchasing).unwrap().quotations
        .iter()
        .map(|q| q.id.clone())
        .collect();
    for id in &ids {
        state.dispatch(WorkflowCommand::ApproveQuotation {
            request_id: purchasing.clone(),
            quotation_id: id.clone(),
        });
    }

    for request in label_group(state.snapshot(), "Q") {
        let quoted: Vec<&str> = request.quotations.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(quoted, ids.iter().map(String::as_str).collect::<Vec<_>>());
        assert!(request
            .quotations
            .iter()
            .all(|q| q.status == QuotationStatus::Approved));
    }
}

#[test]
fn test_unknown_request_is_ignored_without_change() {
    let clock = ManualClock::new();
    let mut state = app(&clock);
    request_with_print(&mut state, "KEEP");
    let before = state.snapshot().clone();

    let result = state.dispatch(WorkflowCommand::ApprovePrint {
        request_id: "does-not-exist".to_string(),
        approver: Approver::Marketing,
    });

    assert!(!result.is_applied());
    assert_eq!(state.snapshot(), &before);
}
