//! Plan command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::{Orchestrator, PlanResponse};
use anyhow::Result;

/// Run the plan command.
pub async fn run_plan(query: &str, json: bool, save: bool, settings: Settings) -> Result<()> {
    let orchestrator = Orchestrator::new(&settings)?;

    if save {
        let spinner = Output::spinner("Planning and saving roadmap...");
        let result = orchestrator.create_roadmap(query).await;
        spinner.finish_and_clear();

        let saved = result?;
        if json {
            println!("{}", serde_json::to_string_pretty(&saved)?);
        } else {
            Output::roadmap(&saved);
            println!();
            Output::success(&format!("Saved roadmap {}", saved.id));
        }
        return Ok(());
    }

    let spinner = Output::spinner("Planning...");
    let result = orchestrator.plan(query).await;
    spinner.finish_and_clear();
    let outcome = result?;

    if json {
        let response = PlanResponse {
            final_answer: outcome.final_answer,
        };
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    match &outcome.final_answer {
        Some(plan) => {
            Output::plan(plan);
            println!();
            Output::kv("Sub-tasks", &plan.sub_task_count().to_string());
            Output::kv("Model turns", &outcome.model_turns.to_string());
            Output::kv("Searches", &outcome.tool_calls.to_string());
        }
        None => {
            Output::warning("The model finished without producing a plan. Try rephrasing the goal.");
        }
    }

    Ok(())
}
