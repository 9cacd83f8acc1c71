//! Rendering of the planning prompt.

use super::state::{LoopState, ToolOutcome, Turn};
use crate::config::Prompts;
use crate::llm::{PromptMessage, Role};
use serde_json::json;
use std::collections::HashMap;

/// Turns the loop state into the messages sent to the model.
#[derive(Debug, Clone, Default)]
pub struct PlanningPrompt {
    prompts: Prompts,
}

impl PlanningPrompt {
    pub fn new(prompts: Prompts) -> Self {
        Self { prompts }
    }

    /// Render the system instruction, the turn log, and the user's input.
    ///
    /// The input is repeated as the last message whenever the log does not
    /// already end with it, so the goal stays next to the newest tool output.
    pub fn render(&self, tool_catalog: &str, state: &LoopState) -> Vec<PromptMessage> {
        let mut vars = HashMap::new();
        vars.insert("tools".to_string(), tool_catalog.to_string());
        let system = self
            .prompts
            .render_with_custom(&self.prompts.planner.system, &vars);

        let mut messages = Vec::with_capacity(state.turns().len() + 2);
        messages.push(PromptMessage::new(Role::System, system));
        messages.extend(state.turns().iter().map(|turn| self.render_turn(turn)));

        if !matches!(state.turns().last(), Some(Turn::User(_))) {
            messages.push(PromptMessage::new(Role::User, self.render_user(state.input())));
        }

        messages
    }

    fn render_user(&self, input: &str) -> String {
        let mut vars = HashMap::new();
        vars.insert("input".to_string(), input.to_string());
        self.prompts.render_with_custom(&self.prompts.planner.user, &vars)
    }

    fn render_turn(&self, turn: &Turn) -> PromptMessage {
        match turn {
            Turn::User(text) => PromptMessage::new(Role::User, self.render_user(text)),
            Turn::Assistant(raw) => PromptMessage::new(Role::Assistant, raw.clone()),
            Turn::ToolResult {
                call_id,
                tool_name,
                outcome,
            } => {
                let body = match outcome {
                    ToolOutcome::Output(output) => json!({
                        "tool_call_id": call_id,
                        "tool_name": tool_name,
                        "output": output,
                    }),
                    ToolOutcome::Error(error) => json!({
                        "tool_call_id": call_id,
                        "tool_name": tool_name,
                        "error": error,
                    }),
                };
                PromptMessage::new(Role::Tool, body.to_string())
            }
        }
    }
}
