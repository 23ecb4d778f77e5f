use std::future::Future;
use std::marker::PhantomData;

use futures_util::future::{BoxFuture, FutureExt};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{Tool, ToolArgs, ToolFailure, ToolOutput, schema_for_type};

/// Adapts an async function taking a typed input struct into a [`Tool`].
///
/// The parameter schema is generated from `I`, and resolved arguments are
/// deserialized into `I` before the handler runs.
///
/// ```rust
/// # use agent_ox::tool::{FunctionTool, ToolFailure};
/// # use schemars::JsonSchema;
/// # use serde::Deserialize;
/// #[derive(Deserialize, JsonSchema)]
/// struct EchoInput {
///     text: String,
/// }
///
/// let echo = FunctionTool::new("echo", "Repeats the given text", |input: EchoInput| async move {
///     Ok::<_, ToolFailure>(input.text)
/// });
/// ```
pub struct FunctionTool<I, O, F> {
    name: String,
    description: String,
    parameters: Option<Value>,
    handler: F,
    _marker: PhantomData<fn(I) -> O>,
}

impl<I, O, F, Fut> FunctionTool<I, O, F>
where
    I: DeserializeOwned + JsonSchema + Send + 'static,
    O: Into<ToolOutput> + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, ToolFailure>> + Send + 'static,
{
    pub fn new(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Some(schema_for_type::<I>()),
            handler,
            _marker: PhantomData,
        }
    }

    /// Replaces the generated parameter schema.
    #[must_use]
    pub fn with_parameters(mut self, parameters: Option<Value>) -> Self {
        self.parameters = parameters;
        self
    }
}

impl<I, O, F> std::fmt::Debug for FunctionTool<I, O, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<I, O, F, Fut> Tool for FunctionTool<I, O, F>
where
    I: DeserializeOwned + JsonSchema + Send + 'static,
    O: Into<ToolOutput> + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, ToolFailure>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Option<Value> {
        self.parameters.clone()
    }

    fn invoke(&self, args: ToolArgs) -> BoxFuture<'_, Result<ToolOutput, ToolFailure>> {
        let input = match args.parse::<I>() {
            Ok(input) => input,
            Err(error) => return futures_util::future::ready(Err(error.into())).boxed(),
        };
        let future = (self.handler)(input);
        async move { future.await.map(Into::into) }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ArgValue, ResolvedArg};
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct AddInput {
        a: i64,
        #[serde(default)]
        b: i64,
    }

    fn add() -> impl Tool {
        FunctionTool::new("add", "Adds two numbers", |input: AddInput| async move {
            Ok::<_, ToolFailure>(ToolOutput::text((input.a + input.b).to_string()))
        })
    }

    #[test]
    fn test_schema_is_generated_from_input() {
        let tool = add();
        let schema = tool.parameters().unwrap();

        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["a"].is_object());
        assert!(schema.get("title").is_none());
    }

    #[tokio::test]
    async fn test_invoke_parses_resolved_args() {
        let tool = add();
        let args = ToolArgs::new([ResolvedArg {
            name: "a".into(),
            value: ArgValue::Integer(2),
        }]);

        let output = tool.invoke(args).await.unwrap();
        assert_eq!(output.render().unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_missing_required_input_is_unexpected_failure() {
        let tool = add();
        let result = tool.invoke(ToolArgs::default()).await;
        assert!(matches!(result, Err(ToolFailure::Unexpected(_))));
    }
}
