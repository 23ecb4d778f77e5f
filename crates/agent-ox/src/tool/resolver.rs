use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use super::{
    ArgValue, ParamKind, ParamTable, ResolutionError, ResolvedArg, ToolArgs, ToolCall,
    ToolMetadata,
};

/// Converts the raw argument map of a [`ToolCall`] into [`ToolArgs`].
///
/// Permissive on input: unknown keys are ignored, and absent parameters are
/// left out so the tool's own defaults apply. A `null` given for a parameter
/// that does not accept it counts as absent. Strict on output: every emitted
/// value has its declared type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentResolver;

impl ArgumentResolver {
    pub fn resolve(
        &self,
        params: &ParamTable,
        metadata: &ToolMetadata,
        call: &ToolCall,
    ) -> Result<ToolArgs, ResolutionError> {
        let conversion = Conversion {
            tool: &metadata.name,
        };
        let args = conversion.table(params, &call.arguments, "")?;
        Ok(ToolArgs::new(args))
    }
}

struct Conversion<'a> {
    tool: &'a str,
}

impl Conversion<'_> {
    fn error(&self, path: &str, reason: impl Into<String>) -> ResolutionError {
        ResolutionError {
            tool: self.tool.to_string(),
            parameter: path.to_string(),
            reason: reason.into(),
        }
    }

    fn table(
        &self,
        params: &ParamTable,
        raw: &Map<String, Value>,
        prefix: &str,
    ) -> Result<Vec<ResolvedArg>, ResolutionError> {
        params
            .iter()
            .filter_map(|param| raw.get(&param.name).map(|value| (param, value)))
            .filter(|(param, value)| !value.is_null() || param.kind.accepts_null())
            .map(|(param, value)| {
                let path = if prefix.is_empty() {
                    param.name.clone()
                } else {
                    format!("{prefix}.{}", param.name)
                };
                let value = self.value(&param.kind, value, &path)?;
                Ok(ResolvedArg {
                    name: param.name.clone(),
                    value,
                })
            })
            .collect()
    }

    fn value(&self, kind: &ParamKind, raw: &Value, path: &str) -> Result<ArgValue, ResolutionError> {
        if raw.is_null() {
            return if kind.accepts_null() {
                Ok(ArgValue::Null)
            } else {
                Err(self.mismatch(path, "a non-null value", raw))
            };
        }

        match kind {
            ParamKind::Any => Ok(ArgValue::Json(raw.clone())),
            ParamKind::Nullable(inner) => self.value(inner, raw, path),
            ParamKind::String => match raw {
                Value::String(text) => Ok(ArgValue::String(text.clone())),
                Value::Number(number) => Ok(ArgValue::String(number.to_string())),
                Value::Bool(flag) => Ok(ArgValue::String(flag.to_string())),
                other => Err(self.mismatch(path, "a string", other)),
            },
            ParamKind::Integer => integer(raw)
                .map(ArgValue::Integer)
                .ok_or_else(|| self.mismatch(path, "an integer", raw)),
            ParamKind::Number => number(raw)
                .map(ArgValue::Number)
                .ok_or_else(|| self.mismatch(path, "a number", raw)),
            ParamKind::Boolean => match raw {
                Value::Bool(flag) => Ok(ArgValue::Bool(*flag)),
                Value::String(text) if text.eq_ignore_ascii_case("true") => Ok(ArgValue::Bool(true)),
                Value::String(text) if text.eq_ignore_ascii_case("false") => {
                    Ok(ArgValue::Bool(false))
                }
                other => Err(self.mismatch(path, "a boolean", other)),
            },
            ParamKind::DateTime => datetime(raw)
                .map(ArgValue::DateTime)
                .ok_or_else(|| self.mismatch(path, "an RFC 3339 date-time", raw)),
            ParamKind::Date => raw
                .as_str()
                .and_then(|text| NaiveDate::parse_from_str(text, "%Y-%m-%d").ok())
                .map(ArgValue::Date)
                .ok_or_else(|| self.mismatch(path, "a YYYY-MM-DD date", raw)),
            ParamKind::Array(items) => {
                let values = raw
                    .as_array()
                    .ok_or_else(|| self.mismatch(path, "an array", raw))?;
                values
                    .iter()
                    .enumerate()
                    .map(|(index, value)| self.value(items, value, &format!("{path}[{index}]")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(ArgValue::Array)
            }
            ParamKind::Object(fields) => {
                let object = raw
                    .as_object()
                    .ok_or_else(|| self.mismatch(path, "an object", raw))?;
                let fields = self.table(fields, object, path)?;
                Ok(ArgValue::Object(
                    fields.into_iter().map(|arg| (arg.name, arg.value)).collect(),
                ))
            }
        }
    }

    fn mismatch(&self, path: &str, expected: &str, found: &Value) -> ResolutionError {
        self.error(path, format!("expected {expected}, found {found}"))
    }
}

fn integer(raw: &Value) -> Option<i64> {
    match raw {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|value| value.fract() == 0.0 && value.abs() < 9.007_199_254_740_992e15)
                .map(|value| value as i64)
        }),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn number(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// RFC 3339, a naive timestamp taken as UTC, or unix seconds.
fn datetime(raw: &Value) -> Option<DateTime<FixedOffset>> {
    match raw {
        Value::String(text) => DateTime::parse_from_rfc3339(text).ok().or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|naive| naive.and_utc().fixed_offset())
        }),
        Value::Number(number) => number
            .as_i64()
            .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))
            .map(|utc| utc.fixed_offset()),
        _ => None,
    }
}
