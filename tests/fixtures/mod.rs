//! Shared fixtures for the integration tests: a controllable clock and
//! ready-made drafts and quotations.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use labelflow::workflows::{
    Company, FileUpload, NewQuotation, PaymentMethod, ProductStatus, RequestDraft, RollDirection,
};
use labelflow::Clock;
use std::sync::{Arc, Mutex};

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(
                Utc.with_ymd_and_hms(2024, 5, 6, 8, 30, 0).unwrap(),
            )),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

pub fn draft(label_code: &str) -> RequestDraft {
    RequestDraft {
        label_code: label_code.to_string(),
        request_date: "2024-05-06".to_string(),
        label_name: format!("Label {label_code}"),
        unit_quantity: 5000,
        dimensions: "10x15cm".to_string(),
        company: Company::Global,
        file_link: "https://drive.example/artwork.pdf".to_string(),
        file_upload: None,
        purchasing_send_date: "2024-05-07".to_string(),
        product_status: ProductStatus::New,
        finishing: "matte".to_string(),
        observation: String::new(),
    }
}

pub fn quotation(printer: &str, unit_price: f64) -> NewQuotation {
    NewQuotation {
        order_request_date: "2024-05-08".to_string(),
        product_code: "P-100".to_string(),
        product_name: "Shampoo 300ml".to_string(),
        company: Company::Global,
        printer: printer.to_string(),
        printer_send_date: "2024-05-09".to_string(),
        unit_price,
        payment_terms: 30,
        print_preview: String::new(),
        payment_method: PaymentMethod::BankSlip,
        delivery_time: "10 days".to_string(),
        roll_direction: RollDirection::Round,
    }
}

pub fn upload(path: &str) -> FileUpload {
    FileUpload::new(path)
}
