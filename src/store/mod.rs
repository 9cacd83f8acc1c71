//! Saved roadmaps.
//!
//! A roadmap is a generated [`Plan`] plus progress flags, kept so users can
//! revisit and tick off tasks. Conversation state is never stored here.

mod memory;
mod sqlite;

pub use memory::MemoryPlanStore;
pub use sqlite::SqlitePlanStore;

use crate::error::{PlanetaryError, Result};
use crate::plan::Plan;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored roadmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedPlan {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub tasks_list: Vec<SavedTask>,
    /// The query the plan was generated from.
    pub original_prompt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedTask {
    pub title: String,
    #[serde(default)]
    pub task_description: String,
    #[serde(default)]
    pub sub_tasks: Vec<SavedAction>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedAction {
    pub action_title: String,
    #[serde(default)]
    pub action_description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Replacement content for an existing roadmap.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanUpdate {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks_list: Vec<SavedTask>,
    #[serde(default)]
    pub original_prompt: Option<String>,
}

impl SavedPlan {
    /// Build a fresh roadmap from a generated plan. Nothing starts completed.
    pub fn from_plan(plan: &Plan, original_prompt: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: plan.title.clone(),
            description: plan.description.clone(),
            tasks_list: plan
                .task_list
                .iter()
                .map(|task| SavedTask {
                    title: task.task_title.clone(),
                    task_description: task.task_description.clone(),
                    sub_tasks: task
                        .actions()
                        .into_iter()
                        .map(|a| SavedAction {
                            action_title: a.title,
                            action_description: a.description,
                            completed: false,
                        })
                        .collect(),
                    completed: false,
                })
                .collect(),
            original_prompt: Some(original_prompt.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update in place and bump `updated_at`.
    pub fn apply(&mut self, update: PlanUpdate) -> Result<()> {
        if update.title.trim().is_empty() {
            return Err(PlanetaryError::InvalidInput("title must not be empty".to_string()));
        }
        self.title = update.title;
        self.description = update.description;
        self.tasks_list = update.tasks_list;
        self.original_prompt = update.original_prompt;
        self.updated_at = Utc::now().max(self.created_at);
        Ok(())
    }

    /// Fraction of completed tasks, 0.0 for an empty roadmap.
    pub fn progress(&self) -> f32 {
        if self.tasks_list.is_empty() {
            return 0.0;
        }
        let done = self.tasks_list.iter().filter(|t| t.completed).count();
        done as f32 / self.tasks_list.len() as f32
    }
}

/// Check that a generated plan is worth saving.
pub fn validate_roadmap(plan: Option<&Plan>) -> Result<&Plan> {
    match plan {
        Some(plan) if plan.has_tasks() => Ok(plan),
        _ => Err(PlanetaryError::InvalidInput(
            "planner did not return a valid roadmap".to_string(),
        )),
    }
}

/// Trait for roadmap store implementations.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Store a new roadmap.
    async fn insert(&self, plan: &SavedPlan) -> Result<()>;

    /// All roadmaps, newest first.
    async fn list(&self) -> Result<Vec<SavedPlan>>;

    /// Fetch one roadmap; `NotFound` when missing.
    async fn get(&self, id: Uuid) -> Result<SavedPlan>;

    /// Replace a roadmap's content; `NotFound` when missing.
    async fn update(&self, id: Uuid, update: PlanUpdate) -> Result<SavedPlan>;

    /// Remove a roadmap; `NotFound` when missing.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

fn not_found(id: Uuid) -> PlanetaryError {
    PlanetaryError::NotFound(format!("plan {}", id))
}
