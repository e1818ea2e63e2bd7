use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::workflows::{Approver, Company, Department, PaymentMethod, ProductStatus, RollDirection};

pub mod commands;

#[derive(Parser)]
#[command(name = "labelflow")]
#[command(about = "Label approval workflow across marketing, purchasing, regulatory and printers")]
#[command(long_about = "Labelflow tracks label requests as they move between departments: \
                       quotations, printer selection, proof approval and delivery. Start with \
                       'labelflow add-request' and follow each copy with 'labelflow list'.")]
pub struct Cli {
    /// Configuration file to use instead of labelflow.toml
    #[arg(long, global = true, help = "Load configuration from this TOML file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new label request with one copy per initial department
    AddRequest {
        #[arg(long, help = "Internal code shared by every copy of the label")]
        label_code: String,
        #[arg(long, help = "Human readable label name")]
        label_name: String,
        #[arg(long, help = "Date the request was made")]
        request_date: String,
        #[arg(long, help = "Number of units to print")]
        unit_quantity: u32,
        #[arg(long, help = "Label dimensions, e.g. 10x15cm")]
        dimensions: String,
        #[arg(long, help = "global, akron, third-party or others")]
        company: Company,
        #[arg(long, help = "Date the request goes to purchasing")]
        purchasing_send_date: String,
        #[arg(long, help = "new, priority, launch, repeat or reprocess")]
        product_status: ProductStatus,
        #[arg(long, default_value = "", help = "Link to the artwork")]
        file_link: String,
        #[arg(long, help = "Local artwork file, uploaded on the next sync")]
        file: Option<PathBuf>,
        #[arg(long, default_value = "")]
        finishing: String,
        #[arg(long, default_value = "")]
        observation: String,
    },
    /// Record a printer quotation on every copy of a request
    AddQuotation {
        /// Any copy of the request
        request_id: String,
        #[arg(long)]
        printer: String,
        #[arg(long)]
        unit_price: f64,
        #[arg(long, help = "Payment terms in days")]
        payment_terms: u32,
        #[arg(long, help = "pix, bank-slip or credit-card")]
        payment_method: PaymentMethod,
        #[arg(long, help = "round, square or carton")]
        roll_direction: RollDirection,
        #[arg(long)]
        delivery_time: String,
        #[arg(long)]
        order_request_date: String,
        #[arg(long)]
        printer_send_date: String,
        #[arg(long)]
        product_code: String,
        #[arg(long)]
        product_name: String,
        #[arg(long, help = "Company the quotation is issued for")]
        company: Company,
        #[arg(long, default_value = "")]
        print_preview: String,
    },
    /// Approve one of a request's quotations
    ApproveQuotation {
        request_id: String,
        quotation_id: String,
    },
    /// Hand a request to a printer, creating the printer's copy
    SendToPrinter {
        request_id: String,
        #[arg(long, help = "printer1 through printer5")]
        printer: Department,
    },
    /// Submit the first proof print
    SubmitPrint {
        request_id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Submit a corrected artwork file after a rejection
    SubmitCorrection {
        request_id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Submit a new proof print after a correction
    SubmitNewPrint {
        request_id: String,
        #[arg(long)]
        file: PathBuf,
    },
    /// Approve the current proof print on behalf of marketing or regulatory
    ApprovePrint {
        request_id: String,
        #[arg(long, help = "marketing or regulatory")]
        approver: Approver,
    },
    /// Reject the current proof print
    RejectPrint {
        request_id: String,
        #[arg(long, help = "marketing or regulatory")]
        approver: Approver,
        #[arg(long, help = "Why the print was rejected (required)")]
        reason: String,
    },
    /// Confirm the printed labels arrived
    MarkReceived { request_id: String },
    /// Select the department you are working as
    SetDepartment { department: Department },
    /// Show the requests visible to a department
    List {
        /// Department to list, defaults to the selected one
        #[arg(long)]
        department: Option<Department>,
        /// Print the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Upload pending files and publish every copy to the document store
    Sync,
}
