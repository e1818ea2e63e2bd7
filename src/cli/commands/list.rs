use anyhow::Result;

use super::{report, Session};
use crate::workflows::{available_actions, department_view, Department, WorkflowCommand, WorkflowSnapshot};

pub struct ListCommand {
    pub department: Option<Department>,
    pub json: bool,
}

impl ListCommand {
    pub fn execute(&self, snapshot: &WorkflowSnapshot) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(snapshot)?);
            return Ok(());
        }

        let department = self.department.unwrap_or(snapshot.current_department);
        let requests: Vec<_> = department_view(snapshot, department).collect();

        println!("📋 {department}: {} requests", requests.len());
        if requests.is_empty() {
            return Ok(());
        }
        println!();

        for request in requests {
            println!("   {} {} ({})", request.label_code, request.label_name, request.id);
            println!("      Status: {}", request.status);
            if let Some(printer) = request.selected_printer {
                println!("      Printer: {printer}");
            }
            if let Some(approvals) = request.print_approvals {
                println!(
                    "      Approvals: marketing {} / regulatory {}",
                    mark(approvals.marketing),
                    mark(approvals.regulatory)
                );
            }
            if let Some(deadline) = request.delivery_deadline {
                println!("      Delivery due: {}", deadline.format("%Y-%m-%d"));
            }
            if request.has_pending_files() {
                println!("      ⏳ Files waiting for sync");
            }

            let actions = available_actions(request);
            if !actions.is_empty() {
                let names: Vec<&str> = actions.iter().map(|a| a.as_str()).collect();
                println!("      Next: {}", names.join(", "));
            }
        }
        Ok(())
    }
}

fn mark(granted: bool) -> &'static str {
    if granted {
        "✅"
    } else {
        "…"
    }
}

pub async fn set_department(session: &mut Session, department: Department) -> Result<()> {
    let result = session
        .dispatch(WorkflowCommand::SetCurrentDepartment { department })
        .await?;
    report(&result);
    println!("   Working as {department}");
    Ok(())
}
