// Test doubles for the workflow seams

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};

use super::commands::{FileUpload, NewQuotation, RequestDraft, WorkflowCommand};
use super::traits::{Clock, SnapshotObserver};
use super::types::{Company, PaymentMethod, ProductStatus, RollDirection, WorkflowSnapshot};

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::at(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
    }

    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Observer that records what it was told.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    notifications: Mutex<Vec<(usize, Option<String>)>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// (collection length, command name) per notification.
    pub fn notifications(&self) -> Vec<(usize, Option<String>)> {
        self.notifications.lock().unwrap().clone()
    }
}

impl SnapshotObserver for RecordingObserver {
    fn snapshot_changed(&self, snapshot: &WorkflowSnapshot, command: Option<&WorkflowCommand>) {
        self.notifications
            .lock()
            .unwrap()
            .push((snapshot.len(), command.map(|c| c.name().to_string())));
    }
}

pub fn draft(label_code: &str) -> RequestDraft {
    RequestDraft {
        label_code: label_code.to_string(),
        request_date: "2024-03-01".to_string(),
        label_name: format!("Label {label_code}"),
        unit_quantity: 5000,
        dimensions: "100x50mm".to_string(),
        company: Company::Global,
        file_link: "http://x/a.pdf".to_string(),
        file_upload: None,
        purchasing_send_date: "2024-03-02".to_string(),
        product_status: ProductStatus::New,
        finishing: "matte".to_string(),
        observation: String::new(),
    }
}

pub fn quotation(printer: &str) -> NewQuotation {
    NewQuotation {
        order_request_date: "2024-03-03".to_string(),
        product_code: "P-100".to_string(),
        product_name: "Shampoo 300ml".to_string(),
        company: Company::Global,
        printer: printer.to_string(),
        printer_send_date: "2024-03-04".to_string(),
        unit_price: 0.12,
        payment_terms: 30,
        print_preview: String::new(),
        payment_method: PaymentMethod::BankSlip,
        delivery_time: "10 days".to_string(),
        roll_direction: RollDirection::Round,
    }
}

pub fn upload(name: &str) -> FileUpload {
    FileUpload::new(format!("/tmp/uploads/{name}"))
}
