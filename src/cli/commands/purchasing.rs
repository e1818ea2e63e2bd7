use anyhow::Result;

use super::{report, Session};
use crate::workflows::{Department, NewQuotation, WorkflowCommand};

pub async fn add_quotation(
    session: &mut Session,
    request_id: String,
    quotation: NewQuotation,
) -> Result<()> {
    println!("💰 Recording quotation from {}...", quotation.printer);
    let result = session
        .dispatch(WorkflowCommand::AddQuotation {
            request_id: request_id.clone(),
            quotation,
        })
        .await?;
    report(&result);

    if let Some(latest) = session
        .state
        .snapshot()
        .find(&request_id)
        .and_then(|r| r.quotations.last())
    {
        println!("   Quotation id: {}", latest.id);
    }
    Ok(())
}

pub async fn approve_quotation(
    session: &mut Session,
    request_id: String,
    quotation_id: String,
) -> Result<()> {
    let result = session
        .dispatch(WorkflowCommand::ApproveQuotation {
            request_id,
            quotation_id,
        })
        .await?;
    report(&result);
    Ok(())
}

pub async fn send_to_printer(
    session: &mut Session,
    request_id: String,
    printer: Department,
) -> Result<()> {
    if !printer.is_printer() {
        anyhow::bail!("{printer} is not a printer");
    }

    println!("🖨️  Sending request to {printer}...");
    let result = session
        .dispatch(WorkflowCommand::SendToPrinter {
            request_id,
            printer,
        })
        .await?;
    report(&result);

    if result.is_applied() {
        if let Some(copy) = session.state.snapshot().requests.first() {
            println!("   {printer} copy: {}", copy.id);
        }
    }
    Ok(())
}
