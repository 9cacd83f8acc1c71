//! Decoding of raw model replies.
//!
//! The model is asked for JSON but often wraps it in prose or code fences, so the
//! parser decodes the span between the first `{` and the last `}`.

use crate::error::{PlanetaryError, Result};
use crate::plan::Plan;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

/// A parsed request to run a named tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Identifier pairing the request with its result turn.
    pub call_id: String,
    pub tool_name: String,
    pub arguments: Map<String, Value>,
}

/// What a model reply asks the planner to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    ToolCallRequested(ToolInvocation),
    FinalAnswerReady(Plan),
    /// Valid JSON matching neither shape closely enough to act on.
    Unparseable,
}

#[derive(Deserialize)]
struct ToolCallShape {
    tool_name: String,
    #[serde(default)]
    args: Map<String, Value>,
}

/// Slice from the first `{` to the last `}`, if both exist in that order.
pub fn extract_json_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Decode a raw model reply.
///
/// Fails with `MalformedResponse` only when there is no decodable JSON object.
/// Shape problems inside a valid object yield [`ModelReply::Unparseable`].
pub fn parse_reply(raw: &str) -> Result<ModelReply> {
    let span = extract_json_span(raw).ok_or_else(|| {
        PlanetaryError::MalformedResponse("reply contains no JSON object".to_string())
    })?;

    let value: Value = serde_json::from_str(span)
        .map_err(|e| PlanetaryError::MalformedResponse(format!("invalid JSON in reply: {}", e)))?;

    let reply = match value.get("tool_calling_required").and_then(Value::as_bool) {
        Some(true) => match ToolCallShape::deserialize(&value) {
            Ok(call) => ModelReply::ToolCallRequested(ToolInvocation {
                call_id: Uuid::new_v4().to_string(),
                tool_name: call.tool_name,
                arguments: call.args,
            }),
            Err(e) => {
                debug!(error = %e, "tool call reply is incomplete");
                ModelReply::Unparseable
            }
        },
        Some(false) => match value.get("final_answer") {
            Some(answer) => decode_plan(answer),
            None => ModelReply::Unparseable,
        },
        None => ModelReply::Unparseable,
    };

    Ok(reply)
}

/// Decode a final answer, which some models send as a JSON-encoded string.
fn decode_plan(answer: &Value) -> ModelReply {
    let decoded = match answer {
        Value::String(text) => extract_json_span(text)
            .and_then(|span| serde_json::from_str::<Plan>(span).ok()),
        Value::Null => None,
        other => Plan::deserialize(other).ok(),
    };

    decoded.map_or(ModelReply::Unparseable, ModelReply::FinalAnswerReady)
}
