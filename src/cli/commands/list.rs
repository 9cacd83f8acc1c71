//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;

    match orchestrator.store().list().await {
        Ok(plans) => {
            if plans.is_empty() {
                Output::info("No roadmaps saved yet. Use 'planetary plan <goal> --save' to create one.");
            } else {
                Output::header(&format!("Saved Roadmaps ({})", plans.len()));
                println!();

                for plan in &plans {
                    Output::roadmap_line(plan);
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list roadmaps: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
