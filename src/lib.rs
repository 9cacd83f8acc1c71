//! Planetary - conversational planning agent
//!
//! Turns a free-form goal ("plan a 3-day trip to Ooty", "learn DSA to crack
//! interviews") into a structured roadmap: a title, a description, and an ordered
//! list of tasks with sub-tasks.
//!
//! # Overview
//!
//! A local language model (Ollama's OpenAI-compatible API by default) is asked
//! to reply with JSON. Each reply either requests a web search or carries the
//! final plan. Search results are fed back into the conversation until the model
//! answers.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `llm` - Language model abstraction and the OpenAI-compatible backend
//! - `search` - Web search providers
//! - `agent` - The tool-call loop: prompt rendering, reply parsing, tool dispatch
//! - `plan` - The plan shape returned to callers
//! - `store` - Saved roadmaps
//! - `orchestrator` - Request handling
//!
//! # Example
//!
//! ```rust,no_run
//! use planetary::config::Settings;
//! use planetary::orchestrator::{Orchestrator, PlanRequest};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(&settings)?;
//!
//!     let request = PlanRequest {
//!         query: "I want to learn DSA to crack interviews".to_string(),
//!     };
//!     let response = orchestrator.handle(&request).await?;
//!     println!("{}", serde_json::to_string_pretty(&response)?);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod plan;
pub mod search;
pub mod store;

pub use error::{PlanetaryError, Result};
