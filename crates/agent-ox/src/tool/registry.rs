use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use super::{
    ExecutionTarget, MetadataFactory, ParamTable, ReflectiveFactory, RegistryError, Tool,
    ToolMetadata,
};

/// Everything the executor needs to know about one declared tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub metadata: ToolMetadata,
    /// Conversion table interpreted from `metadata.parameters`.
    pub params: ParamTable,
}

/// The memoized, read-only view of a [`ToolRegistry`].
pub struct RegistrySnapshot {
    descriptors: Vec<ToolDescriptor>,
    by_name: HashMap<String, usize>,
    targets: HashMap<ExecutionTarget, Arc<dyn Tool>>,
}

impl std::fmt::Debug for RegistrySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrySnapshot")
            .field("tools", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

impl RegistrySnapshot {
    /// All declared tools, in registration order.
    pub fn metadata(&self) -> Vec<ToolMetadata> {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor.metadata.clone())
            .collect()
    }

    /// Looks up a declared tool by exact name.
    pub fn descriptor(&self, name: &str) -> Option<&ToolDescriptor> {
        self.by_name
            .get(name)
            .and_then(|&index| self.descriptors.get(index))
    }

    /// Finds the live tool instance behind `target`.
    pub fn target(&self, target: &ExecutionTarget) -> Option<&Arc<dyn Tool>> {
        self.targets.get(target)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor.metadata.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Holds the tools available to an agent and the metadata derived from them.
///
/// Metadata is computed once, on first access, and shared afterwards. A
/// malformed declaration surfaces as a [`RegistryError`] at that point rather
/// than when the model first calls the tool.
#[derive(Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    factories: Vec<Arc<dyn MetadataFactory>>,
    snapshot: OnceLock<Result<Arc<RegistrySnapshot>, RegistryError>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools_count", &self.tools.len())
            .field("factories_count", &self.factories.len())
            .field("snapshot_built", &self.snapshot.get().is_some())
            .finish()
    }
}

impl ToolRegistry {
    /// Creates an empty registry using the [`ReflectiveFactory`].
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            factories: vec![Arc::new(ReflectiveFactory)],
            snapshot: OnceLock::new(),
        }
    }

    /// Adds a tool to this registry.
    ///
    /// The tool is wrapped in an `Arc` internally. Use [`add_shared`](Self::add_shared)
    /// to register an instance that is already shared.
    pub fn add_tool(&mut self, tool: impl Tool) {
        self.add_shared(Arc::new(tool));
    }

    pub fn add_shared(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
        self.snapshot.take();
    }

    /// Appends a metadata factory. Factories run in order and the last one
    /// producing metadata for a tool wins.
    pub fn add_factory(&mut self, factory: impl MetadataFactory + 'static) {
        self.factories.push(Arc::new(factory));
        self.snapshot.take();
    }

    /// Adds a tool using a builder pattern.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Tool) -> Self {
        self.add_tool(tool);
        self
    }

    #[must_use]
    pub fn with_shared(mut self, tool: Arc<dyn Tool>) -> Self {
        self.add_shared(tool);
        self
    }

    #[must_use]
    pub fn with_factory(mut self, factory: impl MetadataFactory + 'static) -> Self {
        self.add_factory(factory);
        self
    }

    /// Returns the memoized snapshot, building it on first access.
    pub fn snapshot(&self) -> Result<Arc<RegistrySnapshot>, RegistryError> {
        self.snapshot
            .get_or_init(|| self.build().map(Arc::new))
            .clone()
    }

    /// Metadata of every declared tool.
    pub fn tools(&self) -> Result<Vec<ToolMetadata>, RegistryError> {
        Ok(self.snapshot()?.metadata())
    }

    /// Names of every declared tool, in registration order.
    pub fn names(&self) -> Result<Vec<String>, RegistryError> {
        Ok(self.snapshot()?.names().map(str::to_string).collect())
    }

    /// Metadata of the declared tools whose names appear in `names`.
    ///
    /// Unknown names are skipped.
    pub fn filtered(&self, names: &[String]) -> Result<Vec<ToolMetadata>, RegistryError> {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .descriptors
            .iter()
            .filter(|descriptor| wanted.contains(descriptor.metadata.name.as_str()))
            .map(|descriptor| descriptor.metadata.clone())
            .collect())
    }

    fn build(&self) -> Result<RegistrySnapshot, RegistryError> {
        let mut descriptors = Vec::with_capacity(self.tools.len());
        let mut by_name = HashMap::with_capacity(self.tools.len());
        let mut targets = HashMap::with_capacity(self.tools.len());

        for tool in &self.tools {
            let target = ExecutionTarget::of(tool.as_ref());
            if targets.insert(target.clone(), Arc::clone(tool)).is_some() {
                return Err(RegistryError::AmbiguousTarget {
                    target: target.to_string(),
                });
            }

            let mut metadata = None;
            for factory in &self.factories {
                if let Some(produced) = factory.metadata(tool.as_ref())? {
                    metadata = Some(produced);
                }
            }
            let metadata = metadata.ok_or_else(|| RegistryError::MissingMetadata {
                target: target.to_string(),
            })?;

            if by_name.contains_key(&metadata.name) {
                return Err(RegistryError::DuplicateName {
                    name: metadata.name,
                });
            }
            let params = ParamTable::from_schema(&metadata.name, metadata.parameters.as_ref())?;

            by_name.insert(metadata.name.clone(), descriptors.len());
            descriptors.push(ToolDescriptor { metadata, params });
        }

        tracing::debug!(
            tools = descriptors.len(),
            factories = self.factories.len(),
            "built tool registry snapshot"
        );

        Ok(RegistrySnapshot {
            descriptors,
            by_name,
            targets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{OverrideFactory, ToolArgs, ToolFailure, ToolOutput};
    use futures_util::FutureExt;
    use futures_util::future::BoxFuture;
    use serde_json::{Value, json};

    #[derive(Debug)]
    struct MockTool {
        name: &'static str,
        parameters: Option<Value>,
    }

    impl MockTool {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                parameters: Some(json!({"type": "object", "properties": {"text": {"type": "string"}}})),
            }
        }
    }

    impl Tool for MockTool {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "Mock tool"
        }

        fn parameters(&self) -> Option<Value> {
            self.parameters.clone()
        }

        fn invoke(&self, _args: ToolArgs) -> BoxFuture<'_, Result<ToolOutput, ToolFailure>> {
            async move { Ok(ToolOutput::text(self.name)) }.boxed()
        }
    }

    /// Produces nothing for any tool.
    struct SilentFactory;

    impl MetadataFactory for SilentFactory {
        fn metadata(&self, _tool: &dyn Tool) -> Result<Option<ToolMetadata>, RegistryError> {
            Ok(None)
        }
    }

    #[test]
    fn test_empty_registry() {
        let registry = ToolRegistry::new();
        assert!(registry.tools().unwrap().is_empty());
        assert!(registry.snapshot().unwrap().descriptor("echo").is_none());
    }

    #[test]
    fn test_snapshot_is_memoized() {
        let registry = ToolRegistry::new()
            .with_tool(MockTool::new("echo"))
            .with_tool(MockTool::new("clock"));

        let first = registry.snapshot().unwrap();
        let second = registry.snapshot().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.names().unwrap(), ["echo", "clock"]);

        let descriptor = first.descriptor("echo").unwrap();
        assert_eq!(descriptor.metadata.description, "Mock tool");
        assert_eq!(descriptor.params.len(), 1);
        assert!(first.target(&descriptor.metadata.target).is_some());
    }

    #[test]
    fn test_adding_a_tool_invalidates_snapshot() {
        let mut registry = ToolRegistry::new().with_tool(MockTool::new("echo"));
        assert_eq!(registry.names().unwrap(), ["echo"]);

        registry.add_tool(MockTool::new("clock"));
        assert_eq!(registry.names().unwrap(), ["echo", "clock"]);
    }

    #[test]
    fn test_later_factory_overrides_metadata() {
        let registry = ToolRegistry::new()
            .with_tool(MockTool::new("echo"))
            .with_factory(OverrideFactory::new("echo").name("repeat").description("Says it again"));

        let snapshot = registry.snapshot().unwrap();
        assert!(snapshot.descriptor("echo").is_none());

        let descriptor = snapshot.descriptor("repeat").unwrap();
        assert_eq!(descriptor.metadata.description, "Says it again");
        assert_eq!(descriptor.metadata.target, ExecutionTarget::new("echo"));
    }

    #[test]
    fn test_filtered_keeps_registration_order() {
        let registry = ToolRegistry::new()
            .with_tool(MockTool::new("a"))
            .with_tool(MockTool::new("b"))
            .with_tool(MockTool::new("c"));

        let names: Vec<String> = registry
            .filtered(&["c".into(), "a".into(), "zzz".into()])
            .unwrap()
            .into_iter()
            .map(|metadata| metadata.name)
            .collect();
        assert_eq!(names, ["a", "c"]);
    }

    #[test]
    fn test_configuration_errors_surface_at_snapshot_time() {
        let registry = ToolRegistry::new()
            .with_tool(MockTool::new("echo"))
            .with_tool(MockTool::new("echo"));
        assert_eq!(
            registry.tools().unwrap_err(),
            RegistryError::AmbiguousTarget {
                target: "echo".into()
            }
        );

        let registry = ToolRegistry::new()
            .with_tool(MockTool::new("echo"))
            .with_tool(MockTool::new("clock"))
            .with_factory(OverrideFactory::new("clock").name("echo"));
        assert_eq!(
            registry.tools().unwrap_err(),
            RegistryError::DuplicateName {
                name: "echo".into()
            }
        );

        let registry = ToolRegistry::new().with_tool(MockTool {
            name: "broken",
            parameters: Some(json!({"type": "object", "properties": {"x": {"type": 7}}})),
        });
        assert!(matches!(
            registry.tools().unwrap_err(),
            RegistryError::InvalidSchema { ref tool, .. } if tool == "broken"
        ));

        let registry = ToolRegistry::new().with_tool(MockTool::new(""));
        assert!(matches!(
            registry.tools().unwrap_err(),
            RegistryError::InvalidDeclaration { .. }
        ));
    }

    #[test]
    fn test_missing_metadata_is_a_configuration_error() {
        let mut registry = ToolRegistry::new().with_tool(MockTool::new("echo"));
        registry.factories.clear();
        registry.add_factory(SilentFactory);

        assert_eq!(
            registry.tools().unwrap_err(),
            RegistryError::MissingMetadata {
                target: "echo".into()
            }
        );
    }
}
