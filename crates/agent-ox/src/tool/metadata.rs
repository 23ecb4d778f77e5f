use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{RegistryError, Tool};

/// Identifies the live tool instance that executes a declared tool.
///
/// This is the instance's own [`Tool::name`], which stays stable even when a
/// factory exposes the tool to the model under a different name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionTarget(String);

impl ExecutionTarget {
    pub fn new(target: impl Into<String>) -> Self {
        Self(target.into())
    }

    pub fn of(tool: &dyn Tool) -> Self {
        Self(tool.name().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExecutionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Metadata for a tool function, as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolMetadata {
    /// Name of the function, unique within a registry
    pub name: String,

    /// What the function does
    pub description: String,

    /// JSON schema for the function's input parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,

    /// The instance that executes calls to this function
    #[serde(skip)]
    pub target: ExecutionTarget,
}

/// Derives [`ToolMetadata`] for a tool instance.
///
/// Factories are chained by the registry: for each tool, every factory is
/// consulted in order and the last one that returns `Some` wins.
pub trait MetadataFactory: Send + Sync {
    fn metadata(&self, tool: &dyn Tool) -> Result<Option<ToolMetadata>, RegistryError>;
}

/// Builds metadata from the tool's own description.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReflectiveFactory;

impl MetadataFactory for ReflectiveFactory {
    fn metadata(&self, tool: &dyn Tool) -> Result<Option<ToolMetadata>, RegistryError> {
        let name = tool.name();
        if name.trim().is_empty() {
            return Err(RegistryError::InvalidDeclaration {
                reason: "tool name must not be empty".to_string(),
            });
        }
        Ok(Some(ToolMetadata {
            name: name.to_string(),
            description: tool.description().to_string(),
            parameters: tool.parameters(),
            target: ExecutionTarget::of(tool),
        }))
    }
}

/// Replaces the advertised name and/or description of one tool.
///
/// Useful for tests or for exposing a generic tool under a task specific
/// name without reimplementing it.
#[derive(Debug, Clone)]
pub struct OverrideFactory {
    target: ExecutionTarget,
    name: Option<String>,
    description: Option<String>,
}

impl OverrideFactory {
    /// Overrides metadata for the tool whose [`Tool::name`] is `target`.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: ExecutionTarget::new(target),
            name: None,
            description: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl MetadataFactory for OverrideFactory {
    fn metadata(&self, tool: &dyn Tool) -> Result<Option<ToolMetadata>, RegistryError> {
        if ExecutionTarget::of(tool) != self.target {
            return Ok(None);
        }
        let Some(mut metadata) = ReflectiveFactory.metadata(tool)? else {
            return Ok(None);
        };
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(RegistryError::InvalidDeclaration {
                    reason: format!("override for '{}' sets an empty name", self.target),
                });
            }
            metadata.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            metadata.description.clone_from(description);
        }
        Ok(Some(metadata))
    }
}
