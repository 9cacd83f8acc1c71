//! Request handling for Planetary.
//!
//! Wires settings into the planner and the roadmap store, and turns one inbound
//! query into one planner run.

use crate::agent::{Planner, ToolRegistry, WebSearchTool};
use crate::config::{Prompts, Settings};
use crate::error::{PlanetaryError, Result};
use crate::llm::{LanguageModel, OpenAICompatModel};
use crate::plan::Plan;
use crate::search::{DuckDuckGoSearch, SearchProvider};
use crate::store::{validate_roadmap, MemoryPlanStore, PlanStore, SavedPlan, SqlitePlanStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Inbound planning query.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    pub query: String,
}

/// Planner result. `final_answer` serializes as `null` on degenerate convergence.
#[derive(Debug, Clone, Serialize)]
pub struct PlanResponse {
    pub final_answer: Option<Plan>,
}

/// Summary of one planner run, for CLI display.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub final_answer: Option<Plan>,
    pub model_turns: usize,
    pub tool_calls: usize,
}

/// Coordinates planning requests and saved roadmaps.
pub struct Orchestrator {
    planner: Planner,
    store: Arc<dyn PlanStore>,
}

impl Orchestrator {
    /// Create an orchestrator from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        info!(
            "Using model {} at {}",
            settings.llm.model,
            settings.llm.api_base()
        );
        let model: Arc<dyn LanguageModel> = Arc::new(OpenAICompatModel::from_settings(&settings.llm)?);
        let search: Arc<dyn SearchProvider> = Arc::new(DuckDuckGoSearch::from_settings(&settings.search)?);

        let store: Arc<dyn PlanStore> = match settings.store.provider.as_str() {
            "memory" => Arc::new(MemoryPlanStore::new()),
            "sqlite" => Arc::new(SqlitePlanStore::new(&settings.sqlite_path())?),
            other => {
                return Err(PlanetaryError::Config(format!(
                    "Unknown store provider: {} (expected sqlite or memory)",
                    other
                )))
            }
        };

        let planner = Planner::new(model, Arc::new(default_tools(search, settings)))
            .with_prompts(prompts)
            .with_max_turns(settings.agent.max_turns);

        Ok(Self { planner, store })
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(planner: Planner, store: Arc<dyn PlanStore>) -> Self {
        Self { planner, store }
    }

    /// Get a reference to the roadmap store.
    pub fn store(&self) -> Arc<dyn PlanStore> {
        self.store.clone()
    }

    /// Run the planner for one query.
    #[instrument(skip(self, request), fields(query = %request.query))]
    pub async fn handle(&self, request: &PlanRequest) -> Result<PlanResponse> {
        let outcome = self.plan(&request.query).await?;
        Ok(PlanResponse {
            final_answer: outcome.final_answer,
        })
    }

    /// Run the planner and keep run statistics.
    pub async fn plan(&self, query: &str) -> Result<PlanOutcome> {
        let query = validate_query(query)?;
        let state = self.planner.run(query).await?;

        let model_turns = state.model_turns();
        let tool_calls = state.tool_calls();
        info!(model_turns, tool_calls, answered = state.final_answer().is_some(), "planning finished");

        Ok(PlanOutcome {
            final_answer: state.into_final_answer(),
            model_turns,
            tool_calls,
        })
    }

    /// Generate a plan, check it has tasks, and save it as a roadmap.
    #[instrument(skip(self))]
    pub async fn create_roadmap(&self, query: &str) -> Result<SavedPlan> {
        let outcome = self.plan(query).await?;
        let plan = validate_roadmap(outcome.final_answer.as_ref())?;

        let saved = SavedPlan::from_plan(plan, query.trim());
        self.store.insert(&saved).await?;
        info!(id = %saved.id, "Roadmap saved");
        Ok(saved)
    }
}

/// The tool set the planning prompt describes.
pub fn default_tools(search: Arc<dyn SearchProvider>, settings: &Settings) -> ToolRegistry {
    ToolRegistry::new(Duration::from_secs(settings.search.timeout_secs))
        .register(Arc::new(WebSearchTool::new(search)))
}

fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(PlanetaryError::InvalidInput("query must not be empty".to_string()));
    }
    Ok(trimmed)
}
