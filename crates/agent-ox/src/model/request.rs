//! Defines the `ModelRequest` handed to a [`Model`](super::Model).

use bon::Builder;

use crate::{agent::CallOptions, content::Message, tool::ToolMetadata};

/// A single request to a large language model.
///
/// Carries the conversation so far, the tools the model may call and the
/// caller's options, untouched.
#[derive(Debug, Clone, Default, Builder)]
pub struct ModelRequest {
    /// The messages that form the core of the request.
    #[builder(field)]
    pub messages: Vec<Message>,
    /// The tools the model can use to respond to the request.
    #[builder(field)]
    pub tools: Vec<ToolMetadata>,
    /// Free-form options from the caller.
    #[builder(default)]
    pub options: CallOptions,
}

impl<S: model_request_builder::State> ModelRequestBuilder<S> {
    pub fn messages(mut self, messages: impl IntoIterator<Item = impl Into<Message>>) -> Self {
        self.messages = messages.into_iter().map(Into::into).collect();
        self
    }

    pub fn tool(mut self, tool: ToolMetadata) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: impl IntoIterator<Item = ToolMetadata>) -> Self {
        self.tools.extend(tools);
        self
    }
}

impl ModelRequest {
    /// The most recent message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn tool_names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|tool| tool.name.as_str())
    }
}
