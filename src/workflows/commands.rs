// Commands accepted by the request workflow

use serde::{Deserialize, Serialize};

use super::types::{Approver, Company, Department, PaymentMethod, ProductStatus, RollDirection};

/// What marketing fills in when asking for a new label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDraft {
    pub label_code: String,
    pub request_date: String,
    pub label_name: String,
    pub unit_quantity: u32,
    pub dimensions: String,
    pub company: Company,
    /// Link to the artwork, empty when none was given.
    #[serde(default)]
    pub file_link: String,
    #[serde(default)]
    pub file_upload: Option<FileUpload>,
    pub purchasing_send_date: String,
    pub product_status: ProductStatus,
    #[serde(default)]
    pub finishing: String,
    #[serde(default)]
    pub observation: String,
}

/// A file handed to the workflow before its bytes reach the blob store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUpload {
    pub local_ref: String,
}

impl FileUpload {
    pub fn new(local_ref: impl Into<String>) -> Self {
        Self {
            local_ref: local_ref.into(),
        }
    }
}

/// Commercial terms purchasing collects from a printer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuotation {
    pub order_request_date: String,
    pub product_code: String,
    pub product_name: String,
    pub company: Company,
    pub printer: String,
    pub printer_send_date: String,
    pub unit_price: f64,
    pub payment_terms: u32,
    #[serde(default)]
    pub print_preview: String,
    pub payment_method: PaymentMethod,
    pub delivery_time: String,
    pub roll_direction: RollDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum WorkflowCommand {
    SetCurrentDepartment {
        department: Department,
    },
    AddRequest {
        draft: RequestDraft,
    },
    AddQuotation {
        request_id: String,
        quotation: NewQuotation,
    },
    ApproveQuotation {
        request_id: String,
        quotation_id: String,
    },
    SendToPrinter {
        request_id: String,
        printer: Department,
    },
    SubmitPrint {
        request_id: String,
        file: FileUpload,
    },
    SubmitCorrectedFile {
        request_id: String,
        file: FileUpload,
    },
    SubmitNewPrint {
        request_id: String,
        file: FileUpload,
    },
    ApprovePrint {
        request_id: String,
        approver: Approver,
    },
    RejectPrint {
        request_id: String,
        approver: Approver,
        reason: String,
    },
    MarkLabelReceived {
        request_id: String,
    },
}

impl WorkflowCommand {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowCommand::SetCurrentDepartment { .. } => "set-current-department",
            WorkflowCommand::AddRequest { .. } => "add-request",
            WorkflowCommand::AddQuotation { .. } => "add-quotation",
            WorkflowCommand::ApproveQuotation { .. } => "approve-quotation",
            WorkflowCommand::SendToPrinter { .. } => "send-to-printer",
            WorkflowCommand::SubmitPrint { .. } => "submit-print",
            WorkflowCommand::SubmitCorrectedFile { .. } => "submit-corrected-file",
            WorkflowCommand::SubmitNewPrint { .. } => "submit-new-print",
            WorkflowCommand::ApprovePrint { .. } => "approve-print",
            WorkflowCommand::RejectPrint { .. } => "reject-print",
            WorkflowCommand::MarkLabelReceived { .. } => "mark-label-received",
        }
    }

    /// The request copy the command targets, if it targets one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            WorkflowCommand::SetCurrentDepartment { .. } | WorkflowCommand::AddRequest { .. } => {
                None
            }
            WorkflowCommand::AddQuotation { request_id, .. }
            | WorkflowCommand::ApproveQuotation { request_id, .. }
            | WorkflowCommand::SendToPrinter { request_id, .. }
            | WorkflowCommand::SubmitPrint { request_id, .. }
            | WorkflowCommand::SubmitCorrectedFile { request_id, .. }
            | WorkflowCommand::SubmitNewPrint { request_id, .. }
            | WorkflowCommand::ApprovePrint { request_id, .. }
            | WorkflowCommand::RejectPrint { request_id, .. }
            | WorkflowCommand::MarkLabelReceived { request_id } => Some(request_id),
        }
    }
}
