use std::sync::Arc;

use bon::bon;
use tokio_util::sync::CancellationToken;

use crate::{
    content::Conversation,
    model::{Model, ModelResult},
    tool::{DefaultExecutor, FaultTolerantExecutor, ToolExecutor, ToolMetadata, ToolRegistry},
};

pub mod config;
pub mod error;
pub mod events;
pub mod options;
pub mod response;
pub mod stream;
mod turn;

pub use config::{AgentConfig, ConfigError};
pub use error::AgentError;
pub use events::{EventDispatcher, EventObserver, ToolEvent, ToolRound};
pub use options::CallOptions;
pub use response::AgentResponse;
pub use stream::TokenStream;

use turn::Turn;

/// Drives one conversation turn to completion.
///
/// The agent invokes the model and, for as long as the model answers with
/// tool call requests, executes the requested tools, reports their results
/// and invokes the model again. Token streams are intercepted so tool rounds
/// requested mid-stream are settled the same way.
#[derive(Clone)]
pub struct Agent {
    model: Arc<dyn Model>,
    registry: Arc<ToolRegistry>,
    executor: Arc<dyn ToolExecutor>,
    events: EventDispatcher,
    config: AgentConfig,
    cancellation: CancellationToken,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("model", &self.model.name())
            .field("registry", &self.registry)
            .field("events", &self.events)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[bon]
impl Agent {
    /// Builds an agent and its tool registry snapshot.
    ///
    /// Fails when the registry is misconfigured. Without an explicit
    /// `executor`, a [`DefaultExecutor`] is used, wrapped in a
    /// [`FaultTolerantExecutor`] unless `config.fault_tolerant` is off.
    #[builder]
    pub fn new(
        model: Arc<dyn Model>,
        #[builder(default, into)] registry: Arc<ToolRegistry>,
        #[builder(default)] config: AgentConfig,
        #[builder(default)] observers: Vec<Arc<dyn EventObserver>>,
        cancellation: Option<CancellationToken>,
        executor: Option<Arc<dyn ToolExecutor>>,
    ) -> Result<Self, AgentError> {
        let snapshot = registry.snapshot()?;
        tracing::debug!(
            model = model.name(),
            tools = snapshot.len(),
            fault_tolerant = config.fault_tolerant,
            keep_tool_messages = config.keep_tool_messages,
            "building agent"
        );

        let events = EventDispatcher::new(observers);
        let executor: Arc<dyn ToolExecutor> = match executor {
            Some(executor) => executor,
            None => {
                let executor =
                    DefaultExecutor::new(Arc::clone(&registry)).with_events(events.clone());
                if config.fault_tolerant {
                    Arc::new(FaultTolerantExecutor::new(executor, Arc::clone(&registry)))
                } else {
                    Arc::new(executor)
                }
            }
        };

        Ok(Self {
            model,
            registry,
            executor,
            events,
            config,
            cancellation: cancellation.unwrap_or_else(CancellationToken::new),
        })
    }
}

impl Agent {
    /// Starts a builder for an agent over `model`.
    pub fn with_model(model: impl Model + 'static) -> AgentBuilder<agent_builder::SetModel> {
        Agent::builder().model(Arc::new(model))
    }

    pub fn model(&self) -> &Arc<dyn Model> {
        &self.model
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Cancelling this token aborts in-flight calls at their next model
    /// invocation, tool execution or stream pull.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Metadata of every tool the model may call.
    pub fn tools(&self) -> Result<Vec<ToolMetadata>, AgentError> {
        Ok(self.registry.tools()?)
    }

    /// Invokes the model on `conversation` and settles any tool rounds.
    ///
    /// Unless `keep_tool_messages` is set, tool rounds are recorded on a
    /// private copy of the conversation and the caller's one is left as is.
    pub async fn call(
        &self,
        conversation: &Conversation,
        options: CallOptions,
    ) -> Result<AgentResponse, AgentError> {
        let turn = self.start_turn(conversation, options)?;
        let result = turn.invoke_model().await?;
        turn.settle(result).await
    }

    /// Settles a result obtained from the model outside of [`call`](Self::call).
    ///
    /// `conversation` must end with the request that produced `result`.
    pub async fn process(
        &self,
        conversation: &Conversation,
        options: CallOptions,
        result: ModelResult,
    ) -> Result<AgentResponse, AgentError> {
        let turn = self.start_turn(conversation, options)?;
        turn.settle(result).await
    }

    fn start_turn(&self, conversation: &Conversation, options: CallOptions) -> Result<Turn, AgentError> {
        let conversation = if self.config.keep_tool_messages {
            conversation.clone()
        } else {
            conversation.copy()
        };

        let tools = match options.tools() {
            Some(names) => self.registry.filtered(&names)?,
            None => self.registry.tools()?,
        };

        Ok(Turn::new(self.clone(), conversation, options, tools))
    }
}
