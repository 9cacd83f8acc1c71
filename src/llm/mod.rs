//! Language model boundary.
//!
//! The planner only needs "rendered messages in, raw text out". Tool-call intent
//! travels inside the text, so no provider-specific function calling is used.

mod openai_compat;

pub use openai_compat::OpenAICompatModel;

use crate::error::{PlanetaryError, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Upper bound on the wait between model retries.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Speaker of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// One role-tagged message handed to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Text completion capability used by the planner.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Complete the conversation and return the raw reply text.
    ///
    /// Backend failures surface as [`PlanetaryError::ModelUnavailable`].
    async fn complete(&self, messages: &[PromptMessage]) -> Result<String>;

    /// Model identifier for logs.
    fn model_name(&self) -> &str;
}

/// Run `op` with a per-attempt timeout, retrying failed attempts with exponential backoff.
///
/// Every failure is reported as `ModelUnavailable`; the last one is returned once
/// `max_retries` extra attempts are used up.
pub async fn with_retries<T, F, Fut>(
    max_retries: u32,
    timeout: Duration,
    initial_backoff: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let backoff = backoff_for(initial_backoff, attempt);
            warn!(
                attempt,
                backoff_ms = backoff.as_millis() as u64,
                "model call failed, retrying"
            );
            tokio::time::sleep(backoff).await;
        }

        match tokio::time::timeout(timeout, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => last_error = Some(into_unavailable(e)),
            Err(_) => {
                last_error = Some(PlanetaryError::ModelUnavailable(format!(
                    "timed out after {}s",
                    timeout.as_secs_f32()
                )))
            }
        }
    }

    Err(last_error
        .unwrap_or_else(|| PlanetaryError::ModelUnavailable("no attempts made".to_string())))
}

/// Exponential backoff before retry `attempt` (1-based), capped at [`MAX_BACKOFF`].
fn backoff_for(initial: Duration, attempt: u32) -> Duration {
    initial
        .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
        .min(MAX_BACKOFF)
}

fn into_unavailable(err: PlanetaryError) -> PlanetaryError {
    match err {
        PlanetaryError::ModelUnavailable(_) => err,
        other => PlanetaryError::ModelUnavailable(other.to_string()),
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned replies in order and records every prompt it receives.
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String>>>,
        prompts: Mutex<Vec<Vec<PromptMessage>>>,
    }

    impl ScriptedModel {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        /// A model whose every call fails as unreachable.
        pub fn failing() -> Self {
            Self {
                replies: Mutex::new(VecDeque::new()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        pub fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }

        pub fn prompts(&self) -> Vec<Vec<PromptMessage>> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, messages: &[PromptMessage]) -> Result<String> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(PlanetaryError::ModelUnavailable("connection refused".into())))
        }

        fn model_name(&self) -> &str {
            "scripted"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_backoff_doubles_and_caps() {
        let initial = Duration::from_millis(500);
        assert_eq!(backoff_for(initial, 1), Duration::from_millis(500));
        assert_eq!(backoff_for(initial, 3), Duration::from_secs(2));
        assert_eq!(backoff_for(initial, 40), MAX_BACKOFF);
        assert_eq!(backoff_for(Duration::MAX, u32::MAX), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicUsize::new(0);
        let result = with_retries(3, Duration::from_secs(5), Duration::from_millis(1), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(PlanetaryError::Config("flaky".into()))
                } else {
                    Ok("ok")
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(result, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_as_model_unavailable() {
        let calls = AtomicUsize::new(0);
        let result: Result<()> =
            with_retries(1, Duration::from_secs(5), Duration::from_millis(1), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(PlanetaryError::Config("down".into())) }
            })
            .await;

        assert!(matches!(result, Err(PlanetaryError::ModelUnavailable(msg)) if msg.contains("down")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_unavailable() {
        let result: Result<()> =
            with_retries(0, Duration::from_millis(10), Duration::from_millis(1), || async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(PlanetaryError::ModelUnavailable(msg)) if msg.contains("timed out")));
    }
}
