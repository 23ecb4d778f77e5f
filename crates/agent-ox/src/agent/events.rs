use std::sync::Arc;

use crate::{
    model::ModelResult,
    tool::{ToolArgs, ToolCall, ToolCalls, ToolError, ToolResult},
};

/// One batch of tool calls and the results they produced, in call order.
#[derive(Debug, Clone)]
pub struct ToolRound {
    calls: ToolCalls,
    results: Vec<ToolResult>,
}

impl ToolRound {
    pub(crate) fn new(calls: ToolCalls, results: Vec<ToolResult>) -> Self {
        Self { calls, results }
    }

    pub fn calls(&self) -> &ToolCalls {
        &self.calls
    }

    pub fn results(&self) -> &[ToolResult] {
        &self.results
    }
}

/// Events emitted while tools are executed.
///
/// These events provide visibility into the tool lifecycle and can be used
/// for logging, debugging or test interception.
#[derive(Debug, Clone, Copy)]
pub enum ToolEvent<'a> {
    /// Arguments were converted and the tool is about to run.
    ArgumentsResolved {
        call: &'a ToolCall,
        args: &'a ToolArgs,
    },

    /// The tool returned a value.
    ToolSucceeded {
        call: &'a ToolCall,
        result: &'a ToolResult,
    },

    /// Argument resolution or the invocation itself failed.
    ToolFailed {
        call: &'a ToolCall,
        error: &'a ToolError,
    },

    /// Every call of a round has been executed and reported.
    ToolCallsExecuted { round: &'a ToolRound },
}

impl ToolEvent<'_> {
    /// Returns a descriptive name for this event type.
    pub fn event_type(&self) -> &'static str {
        match self {
            ToolEvent::ArgumentsResolved { .. } => "ArgumentsResolved",
            ToolEvent::ToolSucceeded { .. } => "ToolSucceeded",
            ToolEvent::ToolFailed { .. } => "ToolFailed",
            ToolEvent::ToolCallsExecuted { .. } => "ToolCallsExecuted",
        }
    }
}

/// Receives tool lifecycle events.
pub trait EventObserver: Send + Sync {
    fn on_event(&self, event: &ToolEvent<'_>);

    /// Called after a tool round. Returning a result makes the agent continue
    /// with it instead of invoking the model again.
    fn on_tool_calls_executed(&self, _round: &ToolRound) -> Option<ModelResult> {
        None
    }
}

impl<F> EventObserver for F
where
    F: Fn(&ToolEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &ToolEvent<'_>) {
        self(event);
    }
}

/// Calls observers synchronously, in registration order.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    observers: Vec<Arc<dyn EventObserver>>,
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("observers_count", &self.observers.len())
            .finish()
    }
}

impl EventDispatcher {
    pub fn new(observers: impl IntoIterator<Item = Arc<dyn EventObserver>>) -> Self {
        Self {
            observers: observers.into_iter().collect(),
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn EventObserver>) {
        self.observers.push(observer);
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn dispatch(&self, event: ToolEvent<'_>) {
        tracing::trace!(event = event.event_type(), "dispatching tool event");
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    /// Notifies every observer of a finished round, then returns the first
    /// pre-built result an observer supplies.
    pub fn tool_calls_executed(&self, round: &ToolRound) -> Option<ModelResult> {
        self.dispatch(ToolEvent::ToolCallsExecuted { round });
        self.observers
            .iter()
            .find_map(|observer| observer.on_tool_calls_executed(round))
    }
}
