//! Error types for Planetary.

use thiserror::Error;

/// Library-level error type for Planetary operations.
#[derive(Error, Debug)]
pub enum PlanetaryError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The model reply had no decodable `{...}` span.
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    #[error("Tool '{0}' not found.")]
    UnknownTool(String),

    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Planner exceeded maximum turns ({0})")]
    TurnLimitExceeded(usize),

    #[error("Plan store error: {0}")]
    Store(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl PlanetaryError {
    /// Build a tool failure for the named tool.
    pub fn tool(tool: &str, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool: tool.to_string(),
            message: message.into(),
        }
    }

    /// Whether the loop may absorb this error into the conversation.
    pub fn is_recoverable_tool_error(&self) -> bool {
        matches!(self, Self::ToolExecution { .. } | Self::UnknownTool(_))
    }
}

/// Result type alias for Planetary operations.
pub type Result<T> = std::result::Result<T, PlanetaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tool_message_names_tool() {
        let err = PlanetaryError::UnknownTool("calculator".to_string());
        assert_eq!(err.to_string(), "Tool 'calculator' not found.");
        assert!(err.is_recoverable_tool_error());
    }

    #[test]
    fn test_model_errors_are_not_recoverable() {
        assert!(!PlanetaryError::ModelUnavailable("down".into()).is_recoverable_tool_error());
        assert!(!PlanetaryError::MalformedResponse("x".into()).is_recoverable_tool_error());
    }
}
