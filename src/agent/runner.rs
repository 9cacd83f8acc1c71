//! Planner loop: ask the model, run the requested tool, repeat.

use super::events::{LoopEvent, LoopObserver, TracingObserver};
use super::parser::parse_reply;
use super::prompt::PlanningPrompt;
use super::state::{LoopState, Phase, ToolOutcome};
use super::tools::ToolRegistry;
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::LanguageModel;
use std::sync::Arc;
use tracing::{instrument, warn};

/// Default cap on model calls per request.
pub const DEFAULT_MAX_TURNS: usize = 15;

/// Drives one planning conversation per call to [`Planner::run`].
///
/// The model and tools are shared handles; all per-request data lives in the
/// [`LoopState`] created by `run`.
pub struct Planner {
    model: Arc<dyn LanguageModel>,
    tools: Arc<ToolRegistry>,
    prompt: PlanningPrompt,
    observer: Arc<dyn LoopObserver>,
    max_turns: usize,
}

impl Planner {
    /// Create a planner with the default prompt and a tracing observer.
    pub fn new(model: Arc<dyn LanguageModel>, tools: Arc<ToolRegistry>) -> Self {
        Self {
            model,
            tools,
            prompt: PlanningPrompt::default(),
            observer: Arc::new(TracingObserver),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Use custom prompt templates.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompt = PlanningPrompt::new(prompts);
        self
    }

    /// Send loop events somewhere other than `tracing`.
    pub fn with_observer(mut self, observer: Arc<dyn LoopObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Set maximum model calls per request.
    pub fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    /// Run the loop to completion for one user input.
    ///
    /// Returns the finished state; its final answer is `None` on degenerate
    /// convergence. Model failures, malformed replies and the turn limit abort.
    #[instrument(skip(self), fields(model = %self.model.model_name()))]
    pub async fn run(&self, input: &str) -> Result<LoopState> {
        let mut state = LoopState::new(input, self.max_turns);
        self.emit_appended(&state);

        loop {
            match state.phase() {
                Phase::AwaitingModel => self.think(&mut state).await?,
                Phase::AwaitingTool => self.act(&mut state).await?,
                Phase::Done => break,
            }
        }

        Ok(state)
    }

    async fn think(&self, state: &mut LoopState) -> Result<()> {
        let turn = state.begin_model_turn()?;
        self.observer.on_event(&LoopEvent::ModelCallStarted { turn });

        let messages = self.prompt.render(&self.tools.catalog(), state);
        let raw = self.model.complete(&messages).await?;

        let reply = parse_reply(&raw).inspect_err(|e| {
            warn!(turn, error = %e, "discarding model reply");
        })?;

        let phase = state.record_model_reply(raw, reply);
        self.emit_appended(state);

        if phase == Phase::Done {
            match state.final_answer() {
                Some(plan) => self.observer.on_event(&LoopEvent::FinalAnswerReached {
                    title: plan.title.clone(),
                    tasks: plan.task_list.len(),
                }),
                None => self
                    .observer
                    .on_event(&LoopEvent::DegenerateConvergence { turn }),
            }
        }

        Ok(())
    }

    async fn act(&self, state: &mut LoopState) -> Result<()> {
        for invocation in state.take_pending() {
            self.observer.on_event(&LoopEvent::ToolCallStarted {
                call_id: invocation.call_id.clone(),
                tool_name: invocation.tool_name.clone(),
            });

            let outcome = match self.tools.execute(&invocation).await {
                Ok(output) => ToolOutcome::Output(output),
                Err(e) if e.is_recoverable_tool_error() => {
                    warn!(tool = %invocation.tool_name, error = %e, "tool call failed");
                    ToolOutcome::Error(format!("Error: {}", e))
                }
                Err(e) => return Err(e),
            };

            state.record_tool_result(invocation, outcome);
            self.emit_appended(state);
        }

        state.finish_tool_phase();
        Ok(())
    }

    fn emit_appended(&self, state: &LoopState) {
        if let Some(turn) = state.turns().last() {
            self.observer.on_event(&LoopEvent::TurnAppended {
                index: state.turns().len() - 1,
                kind: turn.kind(),
            });
        }
    }
}
