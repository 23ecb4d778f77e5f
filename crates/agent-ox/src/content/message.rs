use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use super::Part;
use crate::tool::{ToolCall, ToolCalls};

/// The author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    /// Carries the result of a tool call back to the model.
    ToolResult,
}

/// An immutable, role-tagged conversation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    role: MessageRole,
    content: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<DateTime<Utc>>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl IntoIterator<Item = Part>) -> Self {
        Self {
            role,
            content: content.into_iter().collect(),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(MessageRole::System, [Part::text(text)])
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, [Part::text(text)])
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, [Part::text(text)])
    }

    /// An assistant message carrying exactly `calls` and no text.
    pub fn assistant_tool_calls(calls: &ToolCalls) -> Self {
        Self::new(MessageRole::Assistant, calls.iter().map(Part::tool_use))
    }

    /// A tool result message echoing the id of `call`.
    pub fn tool_result(call: &ToolCall, content: Option<String>) -> Self {
        Self::new(MessageRole::ToolResult, [Part::tool_result(call, content)])
    }

    /// Returns a copy with the given timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &[Part] {
        &self.content
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Concatenates all text parts, or `None` if there are none.
    pub fn text(&self) -> Option<String> {
        let mut texts = self.content.iter().filter_map(Part::as_text).peekable();
        texts.peek()?;
        Some(texts.collect())
    }

    /// The tool calls requested by this message, in order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.content.iter().filter_map(Part::as_tool_call).collect()
    }

    /// The id of the call this message answers, if it is a tool result.
    pub fn tool_call_id(&self) -> Option<&str> {
        self.content.iter().find_map(|part| match part {
            Part::ToolResult { id, .. } => Some(id.as_str()),
            _ => None,
        })
    }

    /// The rendered tool output, if this is a tool result message.
    pub fn tool_content(&self) -> Option<Option<&str>> {
        self.content.iter().find_map(|part| match part {
            Part::ToolResult { content, .. } => Some(content.as_deref()),
            _ => None,
        })
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Self::user(text)
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Self::user(text)
    }
}
