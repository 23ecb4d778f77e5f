use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use super::{ToolCall, ToolError, ToolExecutor, ToolOutput, ToolRegistry, ToolResult};

/// Turns tool failures into text the model can react to.
///
/// Declared and unexpected execution failures become their fallback text and
/// an unknown tool name becomes a list of the registered tools. Registry and
/// serialization errors still propagate: there is nothing useful to tell the
/// model about them.
#[derive(Debug, Clone)]
pub struct FaultTolerantExecutor<E> {
    inner: E,
    registry: Arc<ToolRegistry>,
}

impl<E: ToolExecutor> FaultTolerantExecutor<E> {
    pub fn new(inner: E, registry: Arc<ToolRegistry>) -> Self {
        Self { inner, registry }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    fn not_found_message(&self, name: &str) -> Result<String, ToolError> {
        let names = self.registry.names()?;
        Ok(format!(
            "Tool \"{name}\" was not found, please use one of these: {}",
            names.join(", ")
        ))
    }
}

impl<E: ToolExecutor> ToolExecutor for FaultTolerantExecutor<E> {
    fn execute(&self, call: ToolCall) -> BoxFuture<'_, Result<ToolResult, ToolError>> {
        async move {
            match self.inner.execute(call.clone()).await {
                Ok(result) => Ok(result),
                Err(ToolError::Execution {
                    name,
                    call_id,
                    fallback,
                    error,
                }) => {
                    match &error {
                        Some(error) => tracing::warn!(tool = %name, %call_id, %error, "recovered tool failure"),
                        None => tracing::warn!(tool = %name, %call_id, "recovered tool failure"),
                    }
                    Ok(ToolResult::new(call, ToolOutput::Text(fallback)))
                }
                Err(ToolError::NotFound { name, call_id }) => {
                    tracing::warn!(tool = %name, %call_id, "model requested an unknown tool");
                    let message = self.not_found_message(&name)?;
                    Ok(ToolResult::new(call, ToolOutput::Text(message)))
                }
                Err(error) => Err(error),
            }
        }
        .boxed()
    }
}
