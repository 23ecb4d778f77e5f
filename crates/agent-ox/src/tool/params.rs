//! Parameter tables interpreted from a tool's JSON schema.
//!
//! A table is built once per tool when the registry snapshot is taken, so a
//! malformed schema is reported as a configuration error up front. At call
//! time the [`ArgumentResolver`](super::ArgumentResolver) only walks the table.

use serde_json::{Map, Value};

use super::RegistryError;

/// The declared type of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    /// Accepted as-is.
    Any,
    String,
    Integer,
    Number,
    Boolean,
    /// `{"type": "string", "format": "date-time"}`
    DateTime,
    /// `{"type": "string", "format": "date"}`
    Date,
    Array(Box<ParamKind>),
    Object(ParamTable),
    /// A kind that also accepts `null`.
    Nullable(Box<ParamKind>),
}

impl ParamKind {
    /// Whether `null` is a value of this kind.
    pub fn accepts_null(&self) -> bool {
        matches!(self, Self::Any | Self::Nullable(_))
    }
}

/// One declared formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
}

/// The ordered formal parameters of a tool (or of a nested object).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamTable {
    params: Vec<ParamSpec>,
}

impl ParamTable {
    pub fn new(params: impl IntoIterator<Item = ParamSpec>) -> Self {
        Self {
            params: params.into_iter().collect(),
        }
    }

    /// Interprets the parameter schema of `tool`.
    ///
    /// A missing or `null` schema declares no parameters.
    pub fn from_schema(tool: &str, schema: Option<&Value>) -> Result<Self, RegistryError> {
        match schema {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(schema) => SchemaReader { tool }.object_table(schema, "$"),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ParamSpec> {
        self.params.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|param| param.name == name)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<'a> IntoIterator for &'a ParamTable {
    type Item = &'a ParamSpec;
    type IntoIter = std::slice::Iter<'a, ParamSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

struct SchemaReader<'a> {
    tool: &'a str,
}

impl SchemaReader<'_> {
    fn error(&self, path: &str, reason: impl Into<String>) -> RegistryError {
        RegistryError::invalid_schema(self.tool, path, reason)
    }

    fn object_table(&self, schema: &Value, path: &str) -> Result<ParamTable, RegistryError> {
        let object = schema
            .as_object()
            .ok_or_else(|| self.error(path, "expected a schema object"))?;

        match object.get("type") {
            None => {}
            Some(Value::String(ty)) if ty == "object" => {}
            Some(other) => {
                return Err(self.error(path, format!("expected type \"object\", found {other}")));
            }
        }

        let Some(properties) = object.get("properties") else {
            return Ok(ParamTable::default());
        };
        let properties = properties
            .as_object()
            .ok_or_else(|| self.error(path, "\"properties\" must be an object"))?;

        properties
            .iter()
            .map(|(name, property)| {
                let kind = self.kind(property, &format!("{path}.{name}"))?;
                Ok(ParamSpec {
                    name: name.clone(),
                    kind,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ParamTable::new)
    }

    fn kind(&self, schema: &Value, path: &str) -> Result<ParamKind, RegistryError> {
        let object = match schema {
            // `true` is the schema that accepts anything.
            Value::Bool(true) => return Ok(ParamKind::Any),
            Value::Object(object) => object,
            other => return Err(self.error(path, format!("expected a schema object, found {other}"))),
        };

        match object.get("type") {
            Some(Value::String(ty)) => self.named_kind(ty, object, path),
            Some(Value::Array(types)) => self.union_kind(types, object, path),
            Some(other) => Err(self.error(path, format!("\"type\" must be a string or array, found {other}"))),
            None => self.untyped_kind(object, path),
        }
    }

    fn named_kind(
        &self,
        ty: &str,
        object: &Map<String, Value>,
        path: &str,
    ) -> Result<ParamKind, RegistryError> {
        let kind = match ty {
            "string" => match object.get("format").and_then(Value::as_str) {
                Some("date-time") => ParamKind::DateTime,
                Some("date") => ParamKind::Date,
                _ => ParamKind::String,
            },
            "integer" => ParamKind::Integer,
            "number" => ParamKind::Number,
            "boolean" => ParamKind::Boolean,
            "null" => ParamKind::Any,
            "array" => {
                let items = match object.get("items") {
                    Some(items) => self.kind(items, &format!("{path}[]"))?,
                    None => ParamKind::Any,
                };
                ParamKind::Array(Box::new(items))
            }
            "object" => {
                if object.contains_key("properties") {
                    ParamKind::Object(self.object_table(&Value::Object(object.clone()), path)?)
                } else {
                    // Free-form map, nothing to construct field by field.
                    ParamKind::Any
                }
            }
            other => return Err(self.error(path, format!("unknown type \"{other}\""))),
        };
        Ok(kind)
    }

    /// `{"type": ["string", "null"]}` as generated for optional fields.
    fn union_kind(
        &self,
        types: &[Value],
        object: &Map<String, Value>,
        path: &str,
    ) -> Result<ParamKind, RegistryError> {
        let mut names = Vec::with_capacity(types.len());
        for ty in types {
            let name = ty
                .as_str()
                .ok_or_else(|| self.error(path, format!("type names must be strings, found {ty}")))?;
            names.push(name);
        }
        let nullable = names.contains(&"null");
        let concrete: Vec<&str> = names.into_iter().filter(|name| *name != "null").collect();

        let kind = match concrete.as_slice() {
            [] => ParamKind::Any,
            [single] => self.named_kind(single, object, path)?,
            _ => ParamKind::Any,
        };
        Ok(wrap_nullable(kind, nullable))
    }

    /// Schemas without `type`: `anyOf`/`oneOf` unions, `$ref`, `enum`, ...
    fn untyped_kind(
        &self,
        object: &Map<String, Value>,
        path: &str,
    ) -> Result<ParamKind, RegistryError> {
        let variants = object
            .get("anyOf")
            .or_else(|| object.get("oneOf"))
            .map(|variants| {
                variants
                    .as_array()
                    .ok_or_else(|| self.error(path, "\"anyOf\"/\"oneOf\" must be an array"))
            })
            .transpose()?;

        let Some(variants) = variants else {
            return Ok(ParamKind::Any);
        };

        let is_null = |variant: &Value| variant.get("type").and_then(Value::as_str) == Some("null");
        let nullable = variants.iter().any(is_null);
        let concrete: Vec<&Value> = variants.iter().filter(|&variant| !is_null(variant)).collect();

        let kind = match concrete.as_slice() {
            [single] => self.kind(single, path)?,
            _ => ParamKind::Any,
        };
        Ok(wrap_nullable(kind, nullable))
    }
}

fn wrap_nullable(kind: ParamKind, nullable: bool) -> ParamKind {
    match kind {
        ParamKind::Any => ParamKind::Any,
        kind if nullable => ParamKind::Nullable(Box::new(kind)),
        kind => kind,
    }
}
