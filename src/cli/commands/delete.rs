//! Delete command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::{Context, Result};
use uuid::Uuid;

/// Run the delete command.
pub async fn run_delete(id: &str, settings: Settings) -> Result<()> {
    let id = Uuid::parse_str(id).with_context(|| format!("Invalid roadmap id: {}", id))?;
    let orchestrator = Orchestrator::new(&settings)?;

    orchestrator.store().delete(id).await?;
    Output::success(&format!("Deleted roadmap {}", id));

    Ok(())
}
