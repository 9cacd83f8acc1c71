//! Show command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::{Context, Result};
use uuid::Uuid;

/// Run the show command.
pub async fn run_show(id: &str, settings: Settings) -> Result<()> {
    let id = Uuid::parse_str(id).with_context(|| format!("Invalid roadmap id: {}", id))?;
    let orchestrator = Orchestrator::new(&settings)?;

    let plan = orchestrator.store().get(id).await?;
    Output::roadmap(&plan);
    println!();

    Ok(())
}
