//! Configuration module for Planetary.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{PlannerPrompts, Prompts};
pub use settings::{
    AgentSettings, GeneralSettings, LlmSettings, PromptSettings, SearchSettings,
    ServerSettings, Settings, StoreSettings, LLM_HOST_ENV,
};
