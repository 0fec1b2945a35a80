//! Pulling structured data out of free-form model replies

use crate::error::{PipelineError, Result};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Locate the JSON object in a model reply.
///
/// Accepts a bare object, an object inside a ``` fence, or an object
/// surrounded by prose (first `{` to last `}`). With several fences the
/// first one holding a valid object wins.
pub fn extract_json_object(reply: &str) -> Result<&str> {
    let fence = Regex::new(r"(?s)```(?:json|JSON)?\s*(\{.*?\})\s*```")
        .map_err(|e| PipelineError::TextProcessing(e.to_string()))?;
    let bodies: Vec<&str> = fence
        .captures_iter(reply)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect();
    if let Some(body) = bodies.iter().find(|body| is_json_object(body)) {
        return Ok(*body);
    }
    if let Some(body) = bodies.first() {
        return Ok(*body);
    }

    let start = reply.find('{');
    let end = reply.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&reply[start..=end]),
        _ => Err(PipelineError::AgentOutput(format!(
            "no JSON object found in reply: {}",
            preview(reply)
        ))),
    }
}

/// Extract and deserialize the JSON object in a model reply
pub fn parse_reply<T: DeserializeOwned>(reply: &str) -> Result<T> {
    let json = extract_json_object(reply)?;
    serde_json::from_str(json).map_err(|e| {
        PipelineError::AgentOutput(format!("{} in reply: {}", e, preview(reply)))
    })
}

fn is_json_object(text: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(text)
        .map(|v| v.is_object())
        .unwrap_or(false)
}

/// Field deserializer for model replies: `null` becomes the default value
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn preview(reply: &str) -> String {
    let trimmed = reply.trim();
    let mut out: String = trimmed.chars().take(120).collect();
    if trimmed.chars().count() > 120 {
        out.push_str("...");
    }
    out
}
