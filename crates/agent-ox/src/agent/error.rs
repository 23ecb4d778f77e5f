use thiserror::Error;

use super::config::ConfigError;
use crate::{
    model::{ModelError, ResultKind},
    tool::{RegistryError, ToolError},
};

/// Errors that abort an agent call.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Model invocation failed: {0}")]
    Model(#[from] ModelError),

    #[error("Tool execution failed: {0}")]
    Tool(#[from] ToolError),

    #[error("Tool registry is misconfigured: {0}")]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Agent reached maximum tool rounds ({limit}) without completing the turn")]
    MaxToolRounds { limit: usize },

    #[error("Agent call was cancelled")]
    Cancelled,

    /// A tool round inside a token stream ended in a result that has no
    /// textual form.
    #[error("A {kind} result cannot continue a token stream")]
    UnsupportedStreamContinuation { kind: ResultKind },
}

impl AgentError {
    pub fn max_tool_rounds_reached(limit: usize) -> Self {
        Self::MaxToolRounds { limit }
    }
}
