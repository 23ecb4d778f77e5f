use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

/// A single argument converted to its declared type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
    Array(Vec<ArgValue>),
    /// A structured value constructed field by field, in declaration order.
    Object(Vec<(String, ArgValue)>),
    /// Undeclared shape, passed through untouched.
    Json(Value),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::DateTime(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// Looks up a field of a structured value.
    pub fn field(&self, name: &str) -> Option<&ArgValue> {
        match self {
            Self::Object(fields) => fields
                .iter()
                .find_map(|(field, value)| (field == name).then_some(value)),
            _ => None,
        }
    }

    /// Converts back to JSON. Dates are written in RFC 3339 / ISO 8601.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(value) => Value::Bool(*value),
            Self::Integer(value) => Value::Number((*value).into()),
            Self::Number(value) => Number::from_f64(*value).map_or(Value::Null, Value::Number),
            Self::String(value) => Value::String(value.clone()),
            Self::DateTime(value) => {
                Value::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Self::Date(value) => Value::String(value.format("%Y-%m-%d").to_string()),
            Self::Array(values) => Value::Array(values.iter().map(Self::to_json).collect()),
            Self::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect(),
            ),
            Self::Json(value) => value.clone(),
        }
    }
}

/// One resolved formal parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArg {
    pub name: String,
    pub value: ArgValue,
}

/// The ordered, typed argument list handed to a tool.
///
/// Holds only the parameters the model supplied, in the order the tool
/// declares them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolArgs {
    args: Vec<ResolvedArg>,
}

impl ToolArgs {
    pub fn new(args: impl IntoIterator<Item = ResolvedArg>) -> Self {
        Self {
            args: args.into_iter().collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        self.args
            .iter()
            .find_map(|arg| (arg.name == name).then_some(&arg.value))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.args.iter().map(|arg| arg.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedArg> {
        self.args.iter()
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// The arguments as a JSON object.
    pub fn to_json(&self) -> Map<String, Value> {
        self.args
            .iter()
            .map(|arg| (arg.name.clone(), arg.value.to_json()))
            .collect()
    }

    /// Deserializes the whole argument list into a typed input struct.
    ///
    /// Absent parameters are simply missing from the object, so `#[serde(default)]`
    /// and `Option` fields fall back to their defaults.
    pub fn parse<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.to_json()))
    }

    /// Deserializes a single argument, `Ok(None)` if it was not supplied.
    pub fn parse_arg<T: DeserializeOwned>(&self, name: &str) -> serde_json::Result<Option<T>> {
        self.get(name)
            .map(|value| serde_json::from_value(value.to_json()))
            .transpose()
    }
}

impl<'a> IntoIterator for &'a ToolArgs {
    type Item = &'a ResolvedArg;
    type IntoIter = std::slice::Iter<'a, ResolvedArg>;

    fn into_iter(self) -> Self::IntoIter {
        self.args.iter()
    }
}
