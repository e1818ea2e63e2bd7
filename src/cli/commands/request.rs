use anyhow::Result;

use super::{report, Session};
use crate::workflows::{department_view, Department, RequestDraft, WorkflowCommand};

pub struct AddRequestCommand {
    pub draft: RequestDraft,
}

impl AddRequestCommand {
    pub async fn execute(self, session: &mut Session) -> Result<()> {
        println!("🏷️  Creating request for label {}...", self.draft.label_code);

        let result = session
            .dispatch(WorkflowCommand::AddRequest { draft: self.draft })
            .await?;
        report(&result);

        if result.is_applied() {
            for department in Department::INITIAL {
                if let Some(copy) = department_view(session.state.snapshot(), department).next() {
                    println!("   {:<11} {}", department.as_str(), copy.id);
                }
            }
        }
        Ok(())
    }
}
