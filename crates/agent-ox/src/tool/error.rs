use std::error::Error as StdError;
use thiserror::Error;

use super::ToolCall;

/// A type alias for a boxed error that is thread-safe.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Represents errors that can occur during tool invocation.
///
/// This error enum is designed for use within the framework's logic.
/// It preserves the original source errors where applicable, allowing for
/// detailed logging and debugging.
#[derive(Debug, Error)]
pub enum ToolError {
    /// No registered tool answers to the requested name, or its execution
    /// target is missing.
    #[error("Tool not found for call {call_id}: {name}")]
    NotFound { name: String, call_id: String },

    /// The tool failed. `fallback` is the text handed to the model when the
    /// failure is recovered.
    #[error("Execution of tool '{name}' failed")]
    Execution {
        name: String,
        call_id: String,
        fallback: String,
        /// The underlying tool-specific error.
        #[source]
        error: Option<BoxedError>,
    },

    /// Failed to serialize the output of a successful tool execution.
    #[error("Output serialization failed for tool '{name}'")]
    OutputSerialization {
        name: String,
        #[source]
        error: serde_json::Error,
    },

    /// The registry could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ToolError {
    /// Creates a "not found" error for `call`.
    pub fn not_found(call: &ToolCall) -> Self {
        Self::NotFound {
            name: call.name.clone(),
            call_id: call.id.clone(),
        }
    }

    /// Wraps an unexpected failure into an execution failure with a
    /// best-effort fallback message.
    pub fn execution_failed(call: &ToolCall, error: impl Into<BoxedError>) -> Self {
        let error = error.into();
        Self::Execution {
            name: call.name.clone(),
            call_id: call.id.clone(),
            fallback: format!(
                "An error occurred while executing tool \"{}\": {error}",
                call.name
            ),
            error: Some(error),
        }
    }

    /// Creates an "output serialization" error, wrapping the source error.
    pub fn output_serialization(name: impl Into<String>, error: serde_json::Error) -> Self {
        Self::OutputSerialization {
            name: name.into(),
            error,
        }
    }

    /// The text to hand to the model when this error is recovered.
    pub fn fallback(&self) -> Option<&str> {
        match self {
            Self::Execution { fallback, .. } => Some(fallback),
            _ => None,
        }
    }
}

/// A failure raised by a tool's own code.
#[derive(Debug, Error)]
pub enum ToolFailure {
    /// The tool's declared failure mode. `fallback` is returned to the model
    /// verbatim.
    #[error("{fallback}")]
    Declared {
        fallback: String,
        #[source]
        error: Option<BoxedError>,
    },

    /// Anything the tool did not anticipate.
    #[error(transparent)]
    Unexpected(BoxedError),
}

impl ToolFailure {
    pub fn declared(fallback: impl Into<String>) -> Self {
        Self::Declared {
            fallback: fallback.into(),
            error: None,
        }
    }

    pub fn declared_with_source(
        fallback: impl Into<String>,
        error: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Declared {
            fallback: fallback.into(),
            error: Some(Box::new(error)),
        }
    }

    pub fn unexpected(error: impl Into<BoxedError>) -> Self {
        Self::Unexpected(error.into())
    }
}

impl From<serde_json::Error> for ToolFailure {
    fn from(error: serde_json::Error) -> Self {
        Self::unexpected(error)
    }
}

/// Configuration errors raised while building a registry snapshot.
///
/// These are never retried: a malformed declaration stays malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Tool declaration is invalid: {reason}")]
    InvalidDeclaration { reason: String },

    #[error("Parameter schema of tool '{tool}' is malformed at '{path}': {reason}")]
    InvalidSchema {
        tool: String,
        path: String,
        reason: String,
    },

    #[error("Tool name '{name}' is declared more than once")]
    DuplicateName { name: String },

    #[error("More than one tool instance is registered as '{target}'")]
    AmbiguousTarget { target: String },

    #[error("No metadata factory produced metadata for tool '{target}'")]
    MissingMetadata { target: String },
}

impl RegistryError {
    pub fn invalid_schema(
        tool: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidSchema {
            tool: tool.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Raised when a raw argument cannot be converted to its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot convert argument '{parameter}' of tool '{tool}': {reason}")]
pub struct ResolutionError {
    pub tool: String,
    /// Dotted path to the offending value, e.g. `filter.since` or `ids[2]`.
    pub parameter: String,
    pub reason: String,
}
