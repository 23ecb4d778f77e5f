//! Scripted collaborators for driving the agent without a provider.
//!
//! `ScriptedModel` answers each invocation with the next queued result and
//! records every request it receives, so tests can assert on exactly what the
//! model was shown.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use agent_ox::{
    Message, MessageRole, Model, ModelError, ModelRequest, ModelResult, StreamChunk,
    tool::{FunctionTool, Tool, ToolCall, ToolCalls, ToolFailure, ToolOutput, ToolRegistry},
};
use futures_util::{FutureExt, StreamExt, future::BoxFuture, stream};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Clone, Default)]
pub struct ScriptedModel {
    script: Arc<Mutex<VecDeque<ModelResult>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedModel {
    pub fn new(script: impl IntoIterator<Item = ModelResult>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into_iter().collect())),
            requests: Arc::default(),
        }
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn invocations(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

impl Model for ScriptedModel {
    fn name(&self) -> &str {
        "scripted-model"
    }

    fn invoke(&self, request: ModelRequest) -> BoxFuture<'_, Result<ModelResult, ModelError>> {
        async move {
            self.requests.lock().unwrap().push(request);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .ok_or(ModelError::NoResponse)
        }
        .boxed()
    }
}

pub fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall::new(id, name, arguments)
}

pub fn tool_calls(calls: impl IntoIterator<Item = ToolCall>) -> ModelResult {
    ModelResult::ToolCalls(ToolCalls::new(calls).unwrap())
}

pub fn text(text: &str) -> ModelResult {
    ModelResult::text(text)
}

/// A token stream of `tokens`, optionally ending in a tool call request.
pub fn token_stream(tokens: &[&str], calls: Option<Vec<ToolCall>>) -> ModelResult {
    let mut chunks: Vec<Result<StreamChunk, ModelError>> = tokens
        .iter()
        .map(|token| Ok(StreamChunk::Token((*token).to_string())))
        .collect();
    if let Some(calls) = calls {
        chunks.push(Ok(StreamChunk::ToolCalls(ToolCalls::new(calls).unwrap())));
    }
    ModelResult::Stream(stream::iter(chunks).boxed())
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EchoInput {
    pub text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WeatherInput {
    pub city: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NoInput {}

pub fn echo_tool() -> impl Tool {
    FunctionTool::new("echo", "Repeats the given text", |input: EchoInput| async move {
        Ok::<_, ToolFailure>(input.text)
    })
}

pub fn weather_tool() -> impl Tool {
    FunctionTool::new("get_weather", "Current weather for a city", |input: WeatherInput| async move {
        Ok::<_, ToolFailure>(ToolOutput::json(json!({"city": input.city, "sky": "sunny"})))
    })
}

pub fn refusing_tool() -> impl Tool {
    FunctionTool::new("refuse", "Always refuses", |_: NoInput| async move {
        Err::<ToolOutput, _>(ToolFailure::declared("The refuse tool is unavailable right now."))
    })
}

/// Records the order in which calls reach it.
pub fn recording_tool(name: &'static str, log: Arc<Mutex<Vec<String>>>) -> impl Tool {
    FunctionTool::new(name, "Records its invocations", move |input: EchoInput| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(format!("{name}:{}", input.text));
            Ok::<_, ToolFailure>(ToolOutput::Null)
        }
    })
}

pub fn registry() -> ToolRegistry {
    ToolRegistry::new()
        .with_tool(echo_tool())
        .with_tool(weather_tool())
        .with_tool(refusing_tool())
}

pub fn roles(messages: &[Message]) -> Vec<MessageRole> {
    messages.iter().map(Message::role).collect()
}
