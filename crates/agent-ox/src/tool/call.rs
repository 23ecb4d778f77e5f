use derive_more::{Deref, IntoIterator};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Represents a call to a tool function.
///
/// The `id` is assigned by the model provider and must be echoed back
/// unchanged when reporting the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,

    /// Name of the function to call
    pub name: String,

    /// Raw, untyped arguments keyed by parameter name
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    /// Creates a new ToolCall with the given parameters.
    ///
    /// Argument payloads that are not JSON objects carry no named parameters
    /// and resolve as an empty map.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        let name = name.into();
        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                tracing::warn!(tool = %name, payload = %other, "discarding non-object tool arguments");
                Map::new()
            }
        };
        Self {
            id: id.into(),
            name,
            arguments,
        }
    }
}

/// Error returned when building a [`ToolCalls`] list without any call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a tool call request must carry at least one tool call")]
pub struct EmptyToolCalls;

/// A non-empty, ordered list of tool calls requested by one model response.
#[derive(Debug, Clone, PartialEq, Eq, Deref, IntoIterator, Serialize, Deserialize)]
#[serde(try_from = "Vec<ToolCall>", into = "Vec<ToolCall>")]
pub struct ToolCalls(#[into_iterator(owned, ref)] Vec<ToolCall>);

impl ToolCalls {
    /// Collects `calls`, rejecting an empty list.
    pub fn new(calls: impl IntoIterator<Item = ToolCall>) -> Result<Self, EmptyToolCalls> {
        let calls: Vec<ToolCall> = calls.into_iter().collect();
        if calls.is_empty() {
            return Err(EmptyToolCalls);
        }
        Ok(Self(calls))
    }

    pub fn single(call: ToolCall) -> Self {
        Self(vec![call])
    }

    pub fn into_vec(self) -> Vec<ToolCall> {
        self.0
    }
}

impl TryFrom<Vec<ToolCall>> for ToolCalls {
    type Error = EmptyToolCalls;

    fn try_from(calls: Vec<ToolCall>) -> Result<Self, Self::Error> {
        Self::new(calls)
    }
}

impl From<ToolCalls> for Vec<ToolCall> {
    fn from(calls: ToolCalls) -> Self {
        calls.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_tool_calls_rejected() {
        assert_eq!(ToolCalls::new(Vec::new()), Err(EmptyToolCalls));
        assert!(serde_json::from_value::<ToolCalls>(json!([])).is_err());
    }

    #[test]
    fn test_tool_calls_keep_order() {
        let calls = ToolCalls::new([
            ToolCall::new("a", "first", json!({})),
            ToolCall::new("b", "second", json!({})),
        ])
        .unwrap();

        let ids: Vec<&str> = calls.iter().map(|call| call.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(calls.len(), 2);
    }

    #[test]
    fn test_non_object_arguments_become_empty() {
        let call = ToolCall::new("1", "echo", json!("not an object"));
        assert!(call.arguments.is_empty());
    }
}
