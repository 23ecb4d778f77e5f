pub mod args;
pub mod call;
pub mod error;
pub mod executor;
pub mod fault_tolerant;
pub mod function;
pub mod metadata;
pub mod params;
pub mod registry;
pub mod resolver;
pub mod result;

pub use args::{ArgValue, ResolvedArg, ToolArgs};
pub use call::{EmptyToolCalls, ToolCall, ToolCalls};
pub use error::{BoxedError, RegistryError, ResolutionError, ToolError, ToolFailure};
pub use executor::{DefaultExecutor, ToolExecutor};
pub use fault_tolerant::FaultTolerantExecutor;
pub use function::FunctionTool;
pub use metadata::{ExecutionTarget, MetadataFactory, OverrideFactory, ReflectiveFactory, ToolMetadata};
pub use params::{ParamKind, ParamSpec, ParamTable};
pub use registry::{RegistrySnapshot, ToolDescriptor, ToolRegistry};
pub use resolver::ArgumentResolver;
pub use result::{SerializeOutput, ToolOutput, ToolResult};

use futures_util::future::BoxFuture;
use schemars::{JsonSchema, generate::SchemaSettings};
use serde_json::Value;
use std::sync::Arc;

/// A callable capability exposed to the model.
///
/// Implementors describe themselves through [`name`](Tool::name),
/// [`description`](Tool::description) and [`parameters`](Tool::parameters);
/// a [`MetadataFactory`] turns that description into the [`ToolMetadata`]
/// advertised to the model.
pub trait Tool: Send + Sync + 'static {
    /// Identity of this tool instance. Also the default advertised name.
    fn name(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    /// JSON schema of the input object, `None` for a tool without parameters.
    fn parameters(&self) -> Option<Value> {
        None
    }

    /// Runs the tool with arguments already converted to their declared types.
    ///
    /// Return [`ToolFailure::Declared`] for failures the model should hear
    /// about verbatim. Anything else is treated as an unexpected crash.
    fn invoke(&self, args: ToolArgs) -> BoxFuture<'_, Result<ToolOutput, ToolFailure>>;
}

impl<T: Tool + ?Sized> Tool for Arc<T> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn description(&self) -> &str {
        self.as_ref().description()
    }

    fn parameters(&self) -> Option<Value> {
        self.as_ref().parameters()
    }

    fn invoke(&self, args: ToolArgs) -> BoxFuture<'_, Result<ToolOutput, ToolFailure>> {
        self.as_ref().invoke(args)
    }
}

/// Generates a JSON schema for the given type using schemars.
///
/// Subschemas are inlined and the title is dropped so the result can be used
/// directly as a tool's parameter schema.
#[must_use]
pub fn schema_for_type<T: JsonSchema>() -> Value {
    let settings = SchemaSettings::openapi3().with(|s| {
        s.inline_subschemas = true;
        s.meta_schema = None;
    });
    let generator = schemars::generate::SchemaGenerator::new(settings);
    let root_schema = generator.into_root_schema_for::<T>();
    let mut schema_value = serde_json::to_value(root_schema).unwrap_or(Value::Null);

    if let Some(obj) = schema_value.as_object_mut() {
        obj.remove("title");
    }

    schema_value
}
