use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use super::{ArgumentResolver, ToolCall, ToolError, ToolFailure, ToolRegistry, ToolResult};
use crate::agent::events::{EventDispatcher, ToolEvent};

/// Executes a single tool call.
pub trait ToolExecutor: Send + Sync {
    fn execute(&self, call: ToolCall) -> BoxFuture<'_, Result<ToolResult, ToolError>>;
}

impl<T: ToolExecutor + ?Sized> ToolExecutor for Arc<T> {
    fn execute(&self, call: ToolCall) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        self.as_ref().execute(call)
    }
}

/// Looks a call up in the registry, resolves its arguments and invokes the
/// target.
///
/// Every failure is returned as a [`ToolError`]; wrap it in a
/// [`FaultTolerantExecutor`](super::FaultTolerantExecutor) to turn those
/// into text for the model.
#[derive(Debug, Clone)]
pub struct DefaultExecutor {
    registry: Arc<ToolRegistry>,
    resolver: ArgumentResolver,
    events: EventDispatcher,
}

impl DefaultExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            resolver: ArgumentResolver,
            events: EventDispatcher::default(),
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    async fn run(&self, call: &ToolCall) -> Result<ToolResult, ToolError> {
        let snapshot = self.registry.snapshot()?;
        let descriptor = snapshot
            .descriptor(&call.name)
            .ok_or_else(|| ToolError::not_found(call))?;
        let tool = snapshot
            .target(&descriptor.metadata.target)
            .ok_or_else(|| ToolError::not_found(call))?;

        let args = self
            .resolver
            .resolve(&descriptor.params, &descriptor.metadata, call)
            .map_err(|error| self.failed(call, ToolError::execution_failed(call, error)))?;

        self.events
            .dispatch(ToolEvent::ArgumentsResolved { call, args: &args });
        tracing::debug!(tool = %call.name, call_id = %call.id, "invoking tool");

        let invocation = AssertUnwindSafe(tool.invoke(args)).catch_unwind().await;
        let output = match invocation {
            Ok(Ok(output)) => output,
            Ok(Err(ToolFailure::Declared { fallback, error })) => {
                tracing::debug!(tool = %call.name, call_id = %call.id, "tool reported a failure");
                return Err(self.failed(
                    call,
                    ToolError::Execution {
                        name: call.name.clone(),
                        call_id: call.id.clone(),
                        fallback,
                        error,
                    },
                ));
            }
            Ok(Err(ToolFailure::Unexpected(error))) => {
                tracing::error!(tool = %call.name, call_id = %call.id, error = %error, "tool crashed");
                return Err(self.failed(call, ToolError::execution_failed(call, error)));
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(tool = %call.name, call_id = %call.id, panic = %message, "tool panicked");
                return Err(self.failed(call, ToolError::execution_failed(call, message)));
            }
        };

        let result = ToolResult::new(call.clone(), output);
        self.events.dispatch(ToolEvent::ToolSucceeded {
            call,
            result: &result,
        });
        Ok(result)
    }

    fn failed(&self, call: &ToolCall, error: ToolError) -> ToolError {
        self.events.dispatch(ToolEvent::ToolFailed {
            call,
            error: &error,
        });
        error
    }
}

impl ToolExecutor for DefaultExecutor {
    fn execute(&self, call: ToolCall) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        async move { self.run(&call).await }.boxed()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool panicked".to_string()
    }
}
