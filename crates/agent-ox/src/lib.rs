//! Tool-calling orchestration for LLM agents.
//!
//! An [`Agent`] invokes a [`Model`], runs the tools the model asks for through
//! a [`ToolRegistry`] and keeps invoking the model until it produces a
//! terminal answer. Token streams that end in a tool call request are
//! intercepted and continued transparently.

pub mod agent;
pub mod content;
pub mod model;
pub mod tool;

// Re-export commonly used types
pub use agent::{Agent, AgentConfig, AgentError, AgentResponse, CallOptions, TokenStream};
pub use content::{Conversation, Message, MessageRole, Part};
pub use model::{Model, ModelError, ModelRequest, ModelResult, StreamChunk};
pub use tool::{
    FaultTolerantExecutor, FunctionTool, Tool, ToolCall, ToolCalls, ToolError, ToolExecutor,
    ToolFailure, ToolOutput, ToolRegistry, ToolResult,
};
