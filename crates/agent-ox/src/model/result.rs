use std::fmt;

use futures_util::stream::BoxStream;
use serde_json::Value;

use super::ModelError;
use crate::tool::{ToolCall, ToolCalls};

/// One element of a model's token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamChunk {
    Token(String),
    /// The model finished by requesting tools instead of more text.
    ToolCalls(ToolCalls),
}

/// A lazy, single-pass sequence of stream chunks.
pub type ChunkStream = BoxStream<'static, Result<StreamChunk, ModelError>>;

/// The discriminated outcome of one model invocation.
pub enum ModelResult {
    Text(String),
    /// A non-empty request for tool calls.
    ToolCalls(ToolCalls),
    Stream(ChunkStream),
    Object(Value),
    Binary {
        data: Vec<u8>,
        mime_type: Option<String>,
    },
    Vector(Vec<f32>),
}

/// The variant of a [`ModelResult`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ResultKind {
    Text,
    ToolCalls,
    Stream,
    Object,
    Binary,
    Vector,
}

impl ModelResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Builds a tool call request, rejecting an empty list.
    pub fn tool_calls(calls: impl IntoIterator<Item = ToolCall>) -> Result<Self, ModelError> {
        Ok(Self::ToolCalls(ToolCalls::new(calls)?))
    }

    pub fn stream(stream: ChunkStream) -> Self {
        Self::Stream(stream)
    }

    pub fn kind(&self) -> ResultKind {
        match self {
            Self::Text(_) => ResultKind::Text,
            Self::ToolCalls(_) => ResultKind::ToolCalls,
            Self::Stream(_) => ResultKind::Stream,
            Self::Object(_) => ResultKind::Object,
            Self::Binary { .. } => ResultKind::Binary,
            Self::Vector(_) => ResultKind::Vector,
        }
    }

    pub fn is_tool_calls(&self) -> bool {
        matches!(self, Self::ToolCalls(_))
    }
}

impl fmt::Debug for ModelResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::ToolCalls(calls) => f.debug_tuple("ToolCalls").field(calls).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Object(value) => f.debug_tuple("Object").field(value).finish(),
            Self::Binary { data, mime_type } => f
                .debug_struct("Binary")
                .field("len", &data.len())
                .field("mime_type", mime_type)
                .finish(),
            Self::Vector(vector) => f.debug_struct("Vector").field("len", &vector.len()).finish(),
        }
    }
}

impl From<ToolCalls> for ModelResult {
    fn from(calls: ToolCalls) -> Self {
        Self::ToolCalls(calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_tool_call_request_is_rejected() {
        assert!(matches!(
            ModelResult::tool_calls(Vec::new()),
            Err(ModelError::EmptyToolCalls(_))
        ));

        let result = ModelResult::tool_calls([ToolCall::new("1", "echo", json!({}))]).unwrap();
        assert_eq!(result.kind(), ResultKind::ToolCalls);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ResultKind::ToolCalls.to_string(), "tool_calls");
        assert_eq!(
            ModelResult::Binary {
                data: vec![0, 1],
                mime_type: None
            }
            .kind()
            .to_string(),
            "binary"
        );
    }
}
