//! Planning agent.
//!
//! The planner alternates between asking the language model for either a tool
//! call or a final plan, and running the requested tool, until the model
//! produces a plan or a reply it cannot act on.

mod events;
mod parser;
mod prompt;
mod runner;
mod state;
mod tools;

pub use events::{LoopEvent, LoopObserver, TracingObserver};
pub use parser::{extract_json_span, parse_reply, ModelReply, ToolInvocation};
pub use prompt::PlanningPrompt;
pub use runner::{Planner, DEFAULT_MAX_TURNS};
pub use state::{LoopState, Phase, ToolOutcome, Turn};
pub use tools::{Tool, ToolParameter, ToolRegistry, WebSearchTool, WEB_SEARCH_TOOL};
