use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::tool::ToolCall;

/// A single piece of message content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Part {
    /// Plain text content
    Text { text: String },

    /// Request to call a tool
    ToolUse {
        id: String,
        name: String,
        args: Map<String, Value>,
    },

    /// Result from tool execution, already rendered to text.
    ///
    /// `content` is `None` when the tool produced no value at all.
    ToolResult {
        id: String,
        name: String,
        content: Option<String>,
    },
}

impl Part {
    /// Create a text part
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a tool use request mirroring `call`.
    pub fn tool_use(call: &ToolCall) -> Self {
        Self::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            args: call.arguments.clone(),
        }
    }

    /// Create a tool result answering `call`.
    pub fn tool_result(call: &ToolCall, content: Option<String>) -> Self {
        Self::ToolResult {
            id: call.id.clone(),
            name: call.name.clone(),
            content,
        }
    }

    /// Returns the text if this is a text part.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Reconstructs the tool call if this is a tool use part.
    pub fn as_tool_call(&self) -> Option<ToolCall> {
        match self {
            Self::ToolUse { id, name, args } => Some(ToolCall {
                id: id.clone(),
                name: name.clone(),
                arguments: args.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_use_mirrors_call() {
        let call = ToolCall::new("call_123", "search", json!({"query": "rust"}));
        let part = Part::tool_use(&call);

        assert_eq!(part.as_tool_call(), Some(call));
        assert_eq!(part.as_text(), None);
    }

    #[test]
    fn test_tool_result_serialization() {
        let call = ToolCall::new("call_123", "search", json!({}));
        let part = Part::tool_result(&call, None);

        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["type"], "toolResult");
        assert_eq!(json["id"], "call_123");
        assert_eq!(json["content"], Value::Null);
    }
}
