// Core data types for the label request workflow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown department: {0}")]
    UnknownDepartment(String),
    #[error("Unknown company: {0}")]
    UnknownCompany(String),
    #[error("Unknown product status: {0}")]
    UnknownProductStatus(String),
    #[error("Unknown payment method: {0}")]
    UnknownPaymentMethod(String),
    #[error("Unknown roll direction: {0}")]
    UnknownRollDirection(String),
}

/// A workflow actor. Every request copy belongs to exactly one department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Department {
    Marketing,
    Regulatory,
    Purchasing,
    Printer1,
    Printer2,
    Printer3,
    Printer4,
    Printer5,
    System,
}

impl Department {
    pub const PRINTERS: [Department; 5] = [
        Department::Printer1,
        Department::Printer2,
        Department::Printer3,
        Department::Printer4,
        Department::Printer5,
    ];

    /// Departments that receive a copy when marketing creates a request.
    pub const INITIAL: [Department; 3] = [
        Department::Marketing,
        Department::Purchasing,
        Department::Regulatory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Marketing => "marketing",
            Department::Regulatory => "regulatory",
            Department::Purchasing => "purchasing",
            Department::Printer1 => "printer1",
            Department::Printer2 => "printer2",
            Department::Printer3 => "printer3",
            Department::Printer4 => "printer4",
            Department::Printer5 => "printer5",
            Department::System => "system",
        }
    }

    pub fn is_printer(&self) -> bool {
        Self::PRINTERS.contains(self)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "marketing" => Ok(Department::Marketing),
            "regulatory" => Ok(Department::Regulatory),
            "purchasing" => Ok(Department::Purchasing),
            "printer1" => Ok(Department::Printer1),
            "printer2" => Ok(Department::Printer2),
            "printer3" => Ok(Department::Printer3),
            "printer4" => Ok(Department::Printer4),
            "printer5" => Ok(Department::Printer5),
            "system" => Ok(Department::System),
            other => Err(ParseError::UnknownDepartment(other.to_string())),
        }
    }
}

/// The only two departments whose sign-off a print needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Approver {
    Marketing,
    Regulatory,
}

impl Approver {
    pub fn department(&self) -> Department {
        match self {
            Approver::Marketing => Department::Marketing,
            Approver::Regulatory => Department::Regulatory,
        }
    }
}

impl fmt::Display for Approver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.department().fmt(f)
    }
}

impl TryFrom<Department> for Approver {
    type Error = ParseError;

    fn try_from(department: Department) -> Result<Self, Self::Error> {
        match department {
            Department::Marketing => Ok(Approver::Marketing),
            Department::Regulatory => Ok(Approver::Regulatory),
            other => Err(ParseError::UnknownDepartment(format!(
                "{other} cannot approve prints"
            ))),
        }
    }
}

impl FromStr for Approver {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Approver::try_from(s.parse::<Department>()?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestStatus {
    ForwardedToPurchasing,
    AwaitingPrintApproval,
    PrintApproved,
    PrintRejected,
    AwaitingNewPrint,
    /// Part of the stored vocabulary; no command produces it.
    LabelApproved,
    LabelDeliveredOnTime,
    LabelDeliveredLate,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::LabelDeliveredOnTime | RequestStatus::LabelDeliveredLate
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::ForwardedToPurchasing => "forwarded-to-purchasing",
            RequestStatus::AwaitingPrintApproval => "awaiting-print-approval",
            RequestStatus::PrintApproved => "print-approved",
            RequestStatus::PrintRejected => "print-rejected",
            RequestStatus::AwaitingNewPrint => "awaiting-new-print",
            RequestStatus::LabelApproved => "label-approved",
            RequestStatus::LabelDeliveredOnTime => "label-delivered-on-time",
            RequestStatus::LabelDeliveredLate => "label-delivered-late",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Company {
    Global,
    Akron,
    ThirdParty,
    Others,
}

impl FromStr for Company {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Company::Global),
            "akron" => Ok(Company::Akron),
            "third-party" => Ok(Company::ThirdParty),
            "others" => Ok(Company::Others),
            other => Err(ParseError::UnknownCompany(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductStatus {
    New,
    Priority,
    Launch,
    Repeat,
    Reprocess,
}

impl FromStr for ProductStatus {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(ProductStatus::New),
            "priority" => Ok(ProductStatus::Priority),
            "launch" => Ok(ProductStatus::Launch),
            "repeat" => Ok(ProductStatus::Repeat),
            "reprocess" => Ok(ProductStatus::Reprocess),
            other => Err(ParseError::UnknownProductStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Pix,
    BankSlip,
    CreditCard,
}

impl FromStr for PaymentMethod {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pix" => Ok(PaymentMethod::Pix),
            "bank-slip" => Ok(PaymentMethod::BankSlip),
            "credit-card" => Ok(PaymentMethod::CreditCard),
            other => Err(ParseError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RollDirection {
    Round,
    Square,
    Carton,
}

impl FromStr for RollDirection {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "round" => Ok(RollDirection::Round),
            "square" => Ok(RollDirection::Square),
            "carton" => Ok(RollDirection::Carton),
            other => Err(ParseError::UnknownRollDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileKind {
    OriginalLink,
    OriginalUpload,
    MarketingCorrection,
    Print,
    NewPrint,
}

impl FileKind {
    /// Proof prints, the files a print approval or rejection applies to.
    pub fn is_print(&self) -> bool {
        matches!(self, FileKind::Print | FileKind::NewPrint)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileStatus {
    PrintApproved,
    PrintRejected,
}

/// Where the bytes of a file live.
///
/// Uploads start out `Pending` with a reference to local content and become
/// `Committed` once the blob store has accepted them. Links supplied by the
/// requester are committed from the start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum FileLocation {
    Pending {
        #[serde(rename = "localRef")]
        local_ref: String,
    },
    Committed {
        url: String,
    },
}

impl FileLocation {
    pub fn url(&self) -> &str {
        match self {
            FileLocation::Pending { local_ref } => local_ref,
            FileLocation::Committed { url } => url,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, FileLocation::Pending { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub location: FileLocation,
    pub date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: FileKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FileStatus>,
    pub department: Department,
    pub version: u32,
}

impl FileRecord {
    pub fn new(
        location: FileLocation,
        kind: FileKind,
        department: Department,
        version: u32,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            location,
            date,
            kind,
            status: None,
            department,
            version,
        }
    }

    pub fn url(&self) -> &str {
        self.location.url()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuotationStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub id: String,
    pub request_id: String,
    pub order_request_date: String,
    pub product_code: String,
    pub product_name: String,
    pub company: Company,
    pub printer: String,
    pub printer_send_date: String,
    pub unit_price: f64,
    /// Payment terms in days.
    pub payment_terms: u32,
    pub print_preview: String,
    pub payment_method: PaymentMethod,
    pub delivery_time: String,
    pub roll_direction: RollDirection,
    pub status: QuotationStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: String,
    pub date: DateTime<Utc>,
    pub description: String,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub department: Department,
}

impl TimelineEvent {
    pub fn new(
        description: impl Into<String>,
        severity: Severity,
        department: Department,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            date,
            description: description.into(),
            severity,
            department,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintApprovals {
    pub marketing: bool,
    pub regulatory: bool,
}

impl PrintApprovals {
    pub fn grant(&mut self, approver: Approver) {
        match approver {
            Approver::Marketing => self.marketing = true,
            Approver::Regulatory => self.regulatory = true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.marketing && self.regulatory
    }
}

/// One department's copy of a logical label request.
///
/// Copies of the same request share `label_code`; every mutating command
/// keeps their business fields in sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRequest {
    pub id: String,
    pub label_code: String,
    pub request_date: String,
    pub label_name: String,
    pub unit_quantity: u32,
    pub dimensions: String,
    pub company: Company,
    #[serde(default)]
    pub file_link: String,
    pub purchasing_send_date: String,
    pub product_status: ProductStatus,
    #[serde(default)]
    pub finishing: String,
    #[serde(default)]
    pub observation: String,
    pub status: RequestStatus,
    pub department: Department,
    pub timeline: Vec<TimelineEvent>,
    pub files: Vec<FileRecord>,
    #[serde(default)]
    pub quotations: Vec<Quotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_printer: Option<Department>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_approvals: Option<PrintApprovals>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub print_rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LabelRequest {
    pub fn files_of_kind(&self, kind: FileKind) -> impl Iterator<Item = &FileRecord> {
        self.files.iter().filter(move |f| f.kind == kind)
    }

    /// Version the next file of `kind` gets: one past the number already attached.
    pub fn next_version(&self, kind: FileKind) -> u32 {
        self.files_of_kind(kind).count() as u32 + 1
    }

    pub fn approved_quotation(&self) -> Option<&Quotation> {
        self.quotations
            .iter()
            .find(|q| q.status == QuotationStatus::Approved)
    }

    pub fn has_pending_files(&self) -> bool {
        self.files.iter().any(|f| f.location.is_pending())
    }
}

/// The whole collection plus the department selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSnapshot {
    pub current_department: Department,
    pub requests: Vec<LabelRequest>,
}

impl Default for WorkflowSnapshot {
    fn default() -> Self {
        Self {
            current_department: Department::Marketing,
            requests: Vec::new(),
        }
    }
}

impl WorkflowSnapshot {
    pub fn find(&self, request_id: &str) -> Option<&LabelRequest> {
        self.requests.iter().find(|r| r.id == request_id)
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_department_round_trips_through_str() {
        for department in Department::PRINTERS
            .iter()
            .chain(Department::INITIAL.iter())
        {
            let parsed: Department = department.as_str().parse().unwrap();
            assert_eq!(&parsed, department);
        }
        assert!(matches!(
            "warehouse".parse::<Department>(),
            Err(ParseError::UnknownDepartment(_))
        ));
    }

    #[test]
    fn test_only_marketing_and_regulatory_approve() {
        assert_eq!("regulatory".parse::<Approver>().unwrap(), Approver::Regulatory);
        assert!("purchasing".parse::<Approver>().is_err());
        assert!(Approver::try_from(Department::Printer2).is_err());
    }

    #[test]
    fn test_wire_names_are_kebab_case() {
        let json = serde_json::to_string(&RequestStatus::LabelDeliveredOnTime).unwrap();
        assert_eq!(json, "\"label-delivered-on-time\"");

        let json = serde_json::to_string(&FileKind::MarketingCorrection).unwrap();
        assert_eq!(json, "\"marketing-correction\"");

        let location = FileLocation::Pending {
            local_ref: "/tmp/proof.pdf".to_string(),
        };
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["state"], "pending");
        assert_eq!(json["localRef"], "/tmp/proof.pdf");
    }

    #[test]
    fn test_print_approvals_need_both_flags() {
        let mut approvals = PrintApprovals::default();
        approvals.grant(Approver::Regulatory);
        assert!(!approvals.is_complete());
        approvals.grant(Approver::Marketing);
        assert!(approvals.is_complete());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(RequestStatus::LabelDeliveredLate.is_terminal());
        assert!(RequestStatus::LabelDeliveredOnTime.is_terminal());
        assert!(!RequestStatus::PrintApproved.is_terminal());
    }
}
