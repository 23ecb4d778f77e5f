use derive_more::Deref;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form options for one agent call.
///
/// The bag is forwarded to the model untouched. The agent itself only reads
/// `tools`: a flat list of tool names restricting which tools the model is
/// told about.
#[derive(Debug, Clone, Default, PartialEq, Deref, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallOptions(Map<String, Value>);

impl CallOptions {
    pub const TOOLS: &'static str = "tools";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Restricts the call to the named tools.
    #[must_use]
    pub fn with_tools(self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let names: Vec<Value> = names.into_iter().map(|name| Value::String(name.into())).collect();
        self.with(Self::TOOLS, names)
    }

    /// The `tools` restriction, if it is a flat list of strings.
    ///
    /// Any other shape is ignored and the full registry applies.
    pub fn tools(&self) -> Option<Vec<String>> {
        let Some(value) = self.0.get(Self::TOOLS) else {
            return None;
        };
        let names = value
            .as_array()?
            .iter()
            .map(|name| name.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>();
        if names.is_none() {
            tracing::debug!(tools = %value, "ignoring malformed tools option");
        }
        names
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for CallOptions {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
