use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::app_state::AppState;
use crate::cli::{Cli, Commands};
use crate::config::LabelflowConfig;
use crate::fs::StandardFileSystem;
use crate::persistence::{LocalSnapshotStore, SnapshotStore};
use crate::telemetry::init_telemetry;
use crate::workflows::{
    FileUpload, NewQuotation, RequestDraft, RequestWorkflow, SnapshotObserver, SystemClock,
    TransitionResult, WorkflowCommand, WorkflowSnapshot,
};

pub mod list;
pub mod print;
pub mod purchasing;
pub mod request;
pub mod sync;

/// A loaded snapshot plus the store it is written back to
pub struct Session {
    pub config: LabelflowConfig,
    store: LocalSnapshotStore,
    pub state: AppState,
}

impl Session {
    pub async fn open(config: LabelflowConfig) -> Result<Self> {
        let store = LocalSnapshotStore::new(
            Arc::new(StandardFileSystem),
            &config.storage.data_dir,
            &config.storage.storage_key,
        )
        .with_default_department(config.workflow.default_department);

        let snapshot = store
            .load()
            .await
            .with_context(|| format!("failed to load {}", store.snapshot_path().display()))?;

        let workflow = RequestWorkflow::new(Arc::new(SystemClock))
            .with_delivery_window_days(config.workflow.delivery_window_days);
        let mut state = AppState::new(workflow, snapshot);
        state.subscribe(Arc::new(TimelineEcho));

        Ok(Self {
            config,
            store,
            state,
        })
    }

    /// Dispatch a command and persist the result when it changed anything.
    pub async fn dispatch(&mut self, command: WorkflowCommand) -> Result<TransitionResult> {
        let result = self.state.dispatch(command);
        if result.is_applied() {
            self.save().await?;
        }
        Ok(result)
    }

    pub async fn save(&self) -> Result<()> {
        self.store.save(self.state.snapshot()).await?;
        Ok(())
    }
}

/// Prints the newest timeline entry of the request a command touched.
struct TimelineEcho;

impl SnapshotObserver for TimelineEcho {
    fn snapshot_changed(&self, snapshot: &WorkflowSnapshot, command: Option<&WorkflowCommand>) {
        // Replacements from sync carry no command and stay quiet.
        let Some(command) = command else {
            return;
        };
        let request = match command {
            // New copies are prepended with the marketing copy first.
            WorkflowCommand::AddRequest { .. } => snapshot.requests.first(),
            _ => command.request_id().and_then(|id| snapshot.find(id)),
        };
        let Some(request) = request else {
            return;
        };
        if let Some(event) = request.timeline.last() {
            println!("   📝 [{}] {}", event.department, event.description);
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<LabelflowConfig> {
    LabelflowConfig::load_env_file()?;
    match path {
        Some(path) => LabelflowConfig::load_from_file(path)
            .with_context(|| format!("failed to read config {}", path.display())),
        None => LabelflowConfig::load(),
    }
}

/// Turn a local path into a pending upload, failing early if it is unreadable.
pub fn local_upload(path: &Path) -> Result<FileUpload> {
    let absolute: PathBuf = std::fs::canonicalize(path)
        .with_context(|| format!("cannot read file {}", path.display()))?;
    Ok(FileUpload::new(absolute.to_string_lossy()))
}

pub fn report(result: &TransitionResult) {
    match result {
        TransitionResult::Applied {
            label_code,
            copies_touched,
        } => {
            match label_code {
                Some(code) => println!("✅ Applied to {copies_touched} copies of {code}"),
                None => println!("✅ Applied"),
            }
        }
        TransitionResult::Ignored { reason } => {
            println!("⚠️  Ignored: {reason}");
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        show_how_to_get_started();
        return Ok(());
    };

    let config = load_config(cli.config.as_deref())?;
    init_telemetry(&config.observability)?;
    info!(data_dir = ?config.storage.data_dir, "Configuration loaded");

    let mut session = Session::open(config).await?;

    match command {
        Commands::AddRequest {
            label_code,
            label_name,
            request_date,
            unit_quantity,
            dimensions,
            company,
            purchasing_send_date,
            product_status,
            file_link,
            file,
            finishing,
            observation,
        } => {
            let file_upload = file.as_deref().map(local_upload).transpose()?;
            request::AddRequestCommand {
                draft: RequestDraft {
                    label_code,
                    request_date,
                    label_name,
                    unit_quantity,
                    dimensions,
                    company,
                    file_link,
                    file_upload,
                    purchasing_send_date,
                    product_status,
                    finishing,
                    observation,
                },
            }
            .execute(&mut session)
            .await
        }
        Commands::AddQuotation {
            request_id,
            printer,
            unit_price,
            payment_terms,
            payment_method,
            roll_direction,
            delivery_time,
            order_request_date,
            printer_send_date,
            product_code,
            product_name,
            company,
            print_preview,
        } => {
            let quotation = NewQuotation {
                order_request_date,
                product_code,
                product_name,
                company,
                printer,
                printer_send_date,
                unit_price,
                payment_terms,
                print_preview,
                payment_method,
                delivery_time,
                roll_direction,
            };
            purchasing::add_quotation(&mut session, request_id, quotation).await
        }
        Commands::ApproveQuotation {
            request_id,
            quotation_id,
        } => purchasing::approve_quotation(&mut session, request_id, quotation_id).await,
        Commands::SendToPrinter {
            request_id,
            printer,
        } => purchasing::send_to_printer(&mut session, request_id, printer).await,
        Commands::SubmitPrint { request_id, file } => {
            print::submit(&mut session, print::Submission::Print, request_id, &file).await
        }
        Commands::SubmitCorrection { request_id, file } => {
            print::submit(&mut session, print::Submission::Correction, request_id, &file).await
        }
        Commands::SubmitNewPrint { request_id, file } => {
            print::submit(&mut session, print::Submission::NewPrint, request_id, &file).await
        }
        Commands::ApprovePrint {
            request_id,
            approver,
        } => print::approve(&mut session, request_id, approver).await,
        Commands::RejectPrint {
            request_id,
            approver,
            reason,
        } => print::reject(&mut session, request_id, approver, reason).await,
        Commands::MarkReceived { request_id } => {
            print::mark_received(&mut session, request_id).await
        }
        Commands::SetDepartment { department } => {
            list::set_department(&mut session, department).await
        }
        Commands::List { department, json } => {
            list::ListCommand { department, json }.execute(session.state.snapshot())
        }
        Commands::Sync => sync::SyncCommand.execute(&mut session).await,
    }
}

pub fn show_how_to_get_started() {
    println!("🏷️  Labelflow - label approval workflow");
    println!();
    println!("Marketing:");
    println!("  labelflow add-request ...         # Ask for a new label");
    println!("  labelflow approve-print <id> --approver marketing");
    println!();
    println!("Purchasing:");
    println!("  labelflow add-quotation <id> ...  # Record a printer quotation");
    println!("  labelflow send-to-printer <id> --printer printer1");
    println!();
    println!("Everyone:");
    println!("  labelflow list                    # Requests for your department");
    println!("  labelflow sync                    # Upload files and publish");
}
