//! Web search backends used by the `webSearchTool`.

mod duckduckgo;

pub use duckduckgo::DuckDuckGoSearch;

use crate::error::Result;
use async_trait::async_trait;

/// Text-in, text-out search capability. The result format is provider defined.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a search and return the formatted result text.
    async fn search(&self, query: &str) -> Result<String>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::error::PlanetaryError;
    use std::sync::Mutex;

    /// Returns a fixed reply (or failure) and records every query.
    pub struct RecordingSearch {
        reply: std::result::Result<String, String>,
        queries: Mutex<Vec<String>>,
    }

    impl RecordingSearch {
        pub fn returning(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchProvider for RecordingSearch {
        async fn search(&self, query: &str) -> Result<String> {
            self.queries.lock().unwrap().push(query.to_string());
            self.reply
                .clone()
                .map_err(|e| PlanetaryError::tool("webSearchTool", e))
        }

        fn name(&self) -> &str {
            "recording"
        }
    }
}
