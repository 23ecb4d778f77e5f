use futures_util::future::{BoxFuture, FutureExt};

use super::{
    Agent, AgentError, AgentResponse, CallOptions,
    events::ToolRound,
    stream::intercept,
};
use crate::{
    content::{Conversation, Message},
    model::{ModelRequest, ModelResult},
    tool::{ToolCalls, ToolMetadata},
};

/// State of one agent call while its tool rounds are settled.
pub(crate) struct Turn {
    agent: Agent,
    conversation: Conversation,
    options: CallOptions,
    tools: Vec<ToolMetadata>,
    rounds: usize,
}

impl Turn {
    pub(crate) fn new(
        agent: Agent,
        conversation: Conversation,
        options: CallOptions,
        tools: Vec<ToolMetadata>,
    ) -> Self {
        Self {
            agent,
            conversation,
            options,
            tools,
            rounds: 0,
        }
    }

    pub(crate) fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub(crate) fn ensure_active(&self) -> Result<(), AgentError> {
        if self.agent.cancellation.is_cancelled() {
            return Err(AgentError::Cancelled);
        }
        Ok(())
    }

    pub(crate) fn cancellation(&self) -> tokio_util::sync::CancellationToken {
        self.agent.cancellation.clone()
    }

    /// Invokes the model with the conversation so far.
    pub(crate) async fn invoke_model(&self) -> Result<ModelResult, AgentError> {
        self.ensure_active()?;
        let request = ModelRequest::builder()
            .messages(self.conversation.messages())
            .tools(self.tools.iter().cloned())
            .options(self.options.clone())
            .build();

        tracing::debug!(
            model = self.agent.model.name(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            rounds = self.rounds,
            "invoking model"
        );

        tokio::select! {
            biased;
            () = self.agent.cancellation.cancelled() => Err(AgentError::Cancelled),
            result = self.agent.model.invoke(request) => result.map_err(AgentError::from),
        }
    }

    /// Runs tool rounds until the model produces a terminal result.
    pub(crate) fn settle(self, result: ModelResult) -> BoxFuture<'static, Result<AgentResponse, AgentError>> {
        async move {
            let mut turn = self;
            let mut result = result;
            loop {
                result = match result {
                    ModelResult::ToolCalls(calls) => turn.run_tool_round(calls).await?,
                    ModelResult::Stream(chunks) => {
                        tracing::debug!(rounds = turn.rounds, "intercepting token stream");
                        return Ok(AgentResponse::Stream(intercept(turn, chunks)));
                    }
                    ModelResult::Text(text) => return Ok(AgentResponse::Text(text)),
                    ModelResult::Object(value) => return Ok(AgentResponse::Object(value)),
                    ModelResult::Binary { data, mime_type } => {
                        return Ok(AgentResponse::Binary { data, mime_type });
                    }
                    ModelResult::Vector(vector) => return Ok(AgentResponse::Vector(vector)),
                };
            }
        }
        .boxed()
    }

    /// Executes every call of one round in order, reports the results to the
    /// conversation and fetches the next result.
    ///
    /// The round is appended to the conversation only once every call has
    /// been executed and rendered, so a failed round leaves it untouched.
    pub(crate) async fn run_tool_round(&mut self, calls: ToolCalls) -> Result<ModelResult, AgentError> {
        if let Some(limit) = self.agent.config.round_limit() {
            if self.rounds >= limit {
                tracing::warn!(limit, "tool round limit reached");
                return Err(AgentError::max_tool_rounds_reached(limit));
            }
        }
        self.rounds += 1;
        tracing::debug!(round = self.rounds, calls = calls.len(), "running tool round");

        let mut messages = Vec::with_capacity(calls.len() + 1);
        messages.push(Message::assistant_tool_calls(&calls));

        let mut results = Vec::with_capacity(calls.len());
        for call in calls.iter() {
            self.ensure_active()?;
            let result = tokio::select! {
                biased;
                () = self.agent.cancellation.cancelled() => return Err(AgentError::Cancelled),
                result = self.agent.executor.execute(call.clone()) => result?,
            };
            let content = result.content()?;
            messages.push(Message::tool_result(call, content));
            results.push(result);
        }
        self.conversation.extend(messages);

        let round = ToolRound::new(calls, results);
        if let Some(result) = self.agent.events.tool_calls_executed(&round) {
            tracing::debug!(kind = %result.kind(), "observer supplied the next result");
            return Ok(result);
        }

        self.invoke_model().await
    }
}
