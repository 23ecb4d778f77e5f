use std::fmt::{self, Display};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use super::{ToolCall, ToolError};

/// Object-safe JSON serialization for tool return values.
pub trait SerializeOutput: Send + Sync {
    fn to_json_string(&self) -> serde_json::Result<String>;
}

impl<T: Serialize + Send + Sync> SerializeOutput for T {
    fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// The raw value a tool returned.
///
/// Rendering to text follows a fixed precedence: `Null` stays absent,
/// `Text` passes through, `Rendered` uses its `Display` impl and everything
/// else is serialized to JSON.
#[derive(Clone)]
pub enum ToolOutput {
    Null,
    Text(String),
    Rendered(Arc<dyn Display + Send + Sync>),
    Structured(Arc<dyn SerializeOutput>),
}

impl fmt::Debug for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Rendered(value) => f.debug_tuple("Rendered").field(&value.to_string()).finish(),
            Self::Structured(_) => f.write_str("Structured(..)"),
        }
    }
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// A value rendered through its `Display` implementation.
    pub fn rendered(value: impl Display + Send + Sync + 'static) -> Self {
        Self::Rendered(Arc::new(value))
    }

    /// A value serialized to JSON when the result is rendered.
    pub fn json<T: Serialize + Send + Sync + 'static>(value: T) -> Self {
        Self::Structured(Arc::new(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Renders the output to the text placed in a tool result message.
    pub fn render(&self) -> serde_json::Result<Option<String>> {
        match self {
            Self::Null => Ok(None),
            Self::Text(text) => Ok(Some(text.clone())),
            Self::Rendered(value) => Ok(Some(value.to_string())),
            Self::Structured(value) => value.to_json_string().map(Some),
        }
    }
}

impl From<()> for ToolOutput {
    fn from((): ()) -> Self {
        Self::Null
    }
}

impl From<String> for ToolOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for ToolOutput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for ToolOutput {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::String(text) => Self::Text(text),
            other => Self::json(other),
        }
    }
}

impl<T: Into<ToolOutput>> From<Option<T>> for ToolOutput {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// The outcome of one tool invocation, tied to the call that produced it.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// The originating call
    pub call: ToolCall,
    /// What the tool returned
    pub output: ToolOutput,
}

impl ToolResult {
    /// Creates a new ToolResult.
    pub fn new(call: ToolCall, output: impl Into<ToolOutput>) -> Self {
        Self {
            call,
            output: output.into(),
        }
    }

    /// Renders the output for the tool result message.
    ///
    /// Serialization failure is fatal for the round: there is no textual
    /// fallback to give the model.
    pub fn content(&self) -> Result<Option<String>, ToolError> {
        self.output
            .render()
            .map_err(|error| ToolError::output_serialization(&self.call.name, error))
    }
}
