//! Per-request loop state.

use super::parser::{ModelReply, ToolInvocation};
use crate::error::{PlanetaryError, Result};
use crate::plan::Plan;

/// Where the loop stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingModel,
    AwaitingTool,
    Done,
}

/// Result of one tool invocation as recorded in the log.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Output(String),
    /// Error text shown to the model, e.g. `Error: Tool 'x' not found.`
    Error(String),
}

impl ToolOutcome {
    pub fn text(&self) -> &str {
        match self {
            ToolOutcome::Output(s) | ToolOutcome::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ToolOutcome::Error(_))
    }
}

/// One append-only conversation log entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Turn {
    User(String),
    Assistant(String),
    ToolResult {
        call_id: String,
        tool_name: String,
        outcome: ToolOutcome,
    },
}

impl Turn {
    pub fn kind(&self) -> &'static str {
        match self {
            Turn::User(_) => "user",
            Turn::Assistant(_) => "assistant",
            Turn::ToolResult { .. } => "tool_result",
        }
    }
}

/// State of a single planning request. Created per request and dropped afterwards.
#[derive(Debug)]
pub struct LoopState {
    input: String,
    turns: Vec<Turn>,
    pending: Vec<ToolInvocation>,
    tool_outputs: Vec<ToolOutcome>,
    final_answer: Option<Plan>,
    phase: Phase,
    model_turns: usize,
    max_turns: usize,
}

impl LoopState {
    /// Seed the state with the user's input as the first turn.
    pub fn new(input: &str, max_turns: usize) -> Self {
        Self {
            input: input.to_string(),
            turns: vec![Turn::User(input.to_string())],
            pending: Vec::new(),
            tool_outputs: Vec::new(),
            final_answer: None,
            phase: Phase::AwaitingModel,
            model_turns: 0,
            max_turns,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending(&self) -> &[ToolInvocation] {
        &self.pending
    }

    pub fn tool_outputs(&self) -> &[ToolOutcome] {
        &self.tool_outputs
    }

    pub fn final_answer(&self) -> Option<&Plan> {
        self.final_answer.as_ref()
    }

    pub fn into_final_answer(self) -> Option<Plan> {
        self.final_answer
    }

    /// Number of model calls made so far.
    pub fn model_turns(&self) -> usize {
        self.model_turns
    }

    /// Number of tool results recorded so far.
    pub fn tool_calls(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| matches!(t, Turn::ToolResult { .. }))
            .count()
    }

    /// Count a new model call, failing once the turn budget is spent.
    pub fn begin_model_turn(&mut self) -> Result<usize> {
        debug_assert_eq!(self.phase, Phase::AwaitingModel);
        if self.model_turns >= self.max_turns {
            return Err(PlanetaryError::TurnLimitExceeded(self.max_turns));
        }
        self.model_turns += 1;
        Ok(self.model_turns)
    }

    /// Record a model reply and move to the next phase.
    pub fn record_model_reply(&mut self, raw: String, reply: ModelReply) -> Phase {
        debug_assert_eq!(self.phase, Phase::AwaitingModel);
        self.turns.push(Turn::Assistant(raw));

        self.phase = match reply {
            ModelReply::ToolCallRequested(invocation) => {
                self.pending = vec![invocation];
                Phase::AwaitingTool
            }
            ModelReply::FinalAnswerReady(plan) => {
                self.pending.clear();
                self.final_answer = Some(plan);
                Phase::Done
            }
            ModelReply::Unparseable => {
                self.pending.clear();
                Phase::Done
            }
        };
        self.phase
    }

    /// Hand the pending invocations to the caller for execution.
    pub fn take_pending(&mut self) -> Vec<ToolInvocation> {
        debug_assert_eq!(self.phase, Phase::AwaitingTool);
        self.tool_outputs.clear();
        std::mem::take(&mut self.pending)
    }

    /// Append one tool result turn.
    pub fn record_tool_result(&mut self, invocation: ToolInvocation, outcome: ToolOutcome) {
        self.tool_outputs.push(outcome.clone());
        self.turns.push(Turn::ToolResult {
            call_id: invocation.call_id,
            tool_name: invocation.tool_name,
            outcome,
        });
    }

    /// Return to the model phase after all pending tools ran.
    pub fn finish_tool_phase(&mut self) {
        debug_assert_eq!(self.phase, Phase::AwaitingTool);
        self.phase = Phase::AwaitingModel;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn invocation() -> ToolInvocation {
        ToolInvocation {
            call_id: "c1".to_string(),
            tool_name: "webSearchTool".to_string(),
            arguments: Map::new(),
        }
    }

    #[test]
    fn test_new_state_is_seeded_with_user_turn() {
        let state = LoopState::new("plan a trip", 3);
        assert_eq!(state.phase(), Phase::AwaitingModel);
        assert_eq!(state.turns(), &[Turn::User("plan a trip".to_string())]);
        assert!(state.final_answer().is_none());
    }

    #[test]
    fn test_tool_round_trip_returns_to_model() {
        let mut state = LoopState::new("x", 3);
        state.begin_model_turn().unwrap();
        let phase = state.record_model_reply("raw".into(), ModelReply::ToolCallRequested(invocation()));
        assert_eq!(phase, Phase::AwaitingTool);
        assert_eq!(state.pending().len(), 1);

        let pending = state.take_pending();
        for inv in pending {
            state.record_tool_result(inv, ToolOutcome::Output("found".into()));
        }
        state.finish_tool_phase();

        assert_eq!(state.phase(), Phase::AwaitingModel);
        assert!(state.pending().is_empty());
        assert_eq!(state.tool_outputs(), &[ToolOutcome::Output("found".into())]);
        assert_eq!(state.tool_calls(), 1);
        let kinds: Vec<_> = state.turns().iter().map(Turn::kind).collect();
        assert_eq!(kinds, vec!["user", "assistant", "tool_result"]);
    }

    #[test]
    fn test_unparseable_reply_finishes_without_answer() {
        let mut state = LoopState::new("x", 3);
        state.begin_model_turn().unwrap();
        assert_eq!(state.record_model_reply("{}".into(), ModelReply::Unparseable), Phase::Done);
        assert!(state.into_final_answer().is_none());
    }

    #[test]
    fn test_turn_limit() {
        let mut state = LoopState::new("x", 2);
        assert_eq!(state.begin_model_turn().unwrap(), 1);
        state.record_model_reply("a".into(), ModelReply::ToolCallRequested(invocation()));
        state.take_pending();
        state.finish_tool_phase();
        assert_eq!(state.begin_model_turn().unwrap(), 2);
        state.record_model_reply("b".into(), ModelReply::ToolCallRequested(invocation()));
        state.take_pending();
        state.finish_tool_phase();

        let err = state.begin_model_turn().unwrap_err();
        assert!(matches!(err, PlanetaryError::TurnLimitExceeded(2)));
    }
}
