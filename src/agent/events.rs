//! Loop transition events.
//!
//! The planner reports progress through [`LoopObserver`] so it stays independent
//! of where the events end up. [`TracingObserver`] is the default sink.

use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    ModelCallStarted { turn: usize },
    ToolCallStarted { call_id: String, tool_name: String },
    TurnAppended { index: usize, kind: &'static str },
    FinalAnswerReached { title: String, tasks: usize },
    /// The model reply matched neither response shape.
    DegenerateConvergence { turn: usize },
}

pub trait LoopObserver: Send + Sync {
    fn on_event(&self, event: &LoopEvent);
}

/// Forwards loop events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LoopObserver for TracingObserver {
    fn on_event(&self, event: &LoopEvent) {
        match event {
            LoopEvent::ModelCallStarted { turn } => info!(turn, "calling model"),
            LoopEvent::ToolCallStarted { call_id, tool_name } => {
                info!(%call_id, tool = %tool_name, "calling tool")
            }
            LoopEvent::TurnAppended { index, kind } => debug!(index, kind, "turn appended"),
            LoopEvent::FinalAnswerReached { title, tasks } => {
                info!(%title, tasks, "final answer reached")
            }
            LoopEvent::DegenerateConvergence { turn } => {
                warn!(turn, "model reply had neither a tool call nor a final answer")
            }
        }
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Keeps every event for later assertions.
    #[derive(Default)]
    pub struct RecordingObserver {
        events: Mutex<Vec<LoopEvent>>,
    }

    impl RecordingObserver {
        pub fn events(&self) -> Vec<LoopEvent> {
            self.events.lock().unwrap().clone()
        }
    }

    impl LoopObserver for RecordingObserver {
        fn on_event(&self, event: &LoopEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }
}
