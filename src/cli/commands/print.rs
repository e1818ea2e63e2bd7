use anyhow::Result;
use std::path::Path;

use super::{local_upload, report, Session};
use crate::workflows::{Approver, WorkflowCommand};

/// Which kind of file is being handed in
#[derive(Debug, Clone, Copy)]
pub enum Submission {
    Print,
    Correction,
    NewPrint,
}

pub async fn submit(
    session: &mut Session,
    submission: Submission,
    request_id: String,
    path: &Path,
) -> Result<()> {
    let file = local_upload(path)?;
    let command = match submission {
        Submission::Print => WorkflowCommand::SubmitPrint { request_id, file },
        Submission::Correction => WorkflowCommand::SubmitCorrectedFile { request_id, file },
        Submission::NewPrint => WorkflowCommand::SubmitNewPrint { request_id, file },
    };

    println!("📤 Submitting {}...", path.display());
    let result = session.dispatch(command).await?;
    report(&result);
    if result.is_applied() {
        println!("   💡 Run 'labelflow sync' to upload the file");
    }
    Ok(())
}

pub async fn approve(session: &mut Session, request_id: String, approver: Approver) -> Result<()> {
    let result = session
        .dispatch(WorkflowCommand::ApprovePrint {
            request_id: request_id.clone(),
            approver,
        })
        .await?;
    report(&result);

    if let Some(request) = session.state.snapshot().find(&request_id) {
        if let Some(deadline) = request.delivery_deadline {
            println!("   📅 Delivery due {}", deadline.format("%Y-%m-%d"));
        }
    }
    Ok(())
}

pub async fn reject(
    session: &mut Session,
    request_id: String,
    approver: Approver,
    reason: String,
) -> Result<()> {
    let reason = reason.trim().to_string();
    if reason.is_empty() {
        anyhow::bail!("a rejection needs a reason");
    }

    let result = session
        .dispatch(WorkflowCommand::RejectPrint {
            request_id,
            approver,
            reason,
        })
        .await?;
    report(&result);
    Ok(())
}

pub async fn mark_received(session: &mut Session, request_id: String) -> Result<()> {
    let result = session
        .dispatch(WorkflowCommand::MarkLabelReceived {
            request_id: request_id.clone(),
        })
        .await?;
    report(&result);

    if let Some(request) = session.state.snapshot().find(&request_id) {
        println!("   Status: {}", request.status);
    }
    Ok(())
}
