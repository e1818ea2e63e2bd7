// Derived read-only views over a snapshot

use serde::Serialize;
use std::fmt;

use super::types::{Department, LabelRequest, QuotationStatus, RequestStatus, WorkflowSnapshot};

/// Actions a department can take on its copy of a request.
///
/// Advisory only: the workflow accepts any command regardless of these rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvailableAction {
    AddQuotation,
    SelectPrinter,
    SubmitPrint,
    SubmitNewPrint,
    ApprovePrint,
    RejectPrint,
    SubmitCorrectedFile,
}

impl AvailableAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailableAction::AddQuotation => "add-quotation",
            AvailableAction::SelectPrinter => "select-printer",
            AvailableAction::SubmitPrint => "submit-print",
            AvailableAction::SubmitNewPrint => "submit-new-print",
            AvailableAction::ApprovePrint => "approve-print",
            AvailableAction::RejectPrint => "reject-print",
            AvailableAction::SubmitCorrectedFile => "submit-corrected-file",
        }
    }
}

impl fmt::Display for AvailableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Copies owned by `department`, in collection order.
pub fn department_view(
    snapshot: &WorkflowSnapshot,
    department: Department,
) -> impl Iterator<Item = &LabelRequest> {
    snapshot
        .requests
        .iter()
        .filter(move |r| r.department == department)
}

/// Every department copy of one logical request.
pub fn label_group<'a>(
    snapshot: &'a WorkflowSnapshot,
    label_code: &'a str,
) -> impl Iterator<Item = &'a LabelRequest> {
    snapshot
        .requests
        .iter()
        .filter(move |r| r.label_code == label_code)
}

pub fn available_actions(request: &LabelRequest) -> Vec<AvailableAction> {
    let mut actions = Vec::new();

    match request.department {
        Department::Purchasing if request.selected_printer.is_none() => {
            actions.push(AvailableAction::AddQuotation);
            if request
                .quotations
                .iter()
                .any(|q| q.status == QuotationStatus::Approved)
            {
                actions.push(AvailableAction::SelectPrinter);
            }
        }
        department if department.is_printer() => {
            if request.status == RequestStatus::AwaitingNewPrint {
                actions.push(AvailableAction::SubmitNewPrint);
            } else {
                actions.push(AvailableAction::SubmitPrint);
            }
        }
        _ => {}
    }

    if matches!(
        request.department,
        Department::Marketing | Department::Regulatory
    ) && request.status == RequestStatus::AwaitingPrintApproval
    {
        actions.push(AvailableAction::ApprovePrint);
        actions.push(AvailableAction::RejectPrint);
    }

    if request.department == Department::Marketing
        && request.status == RequestStatus::PrintRejected
    {
        actions.push(AvailableAction::SubmitCorrectedFile);
    }

    actions
}
