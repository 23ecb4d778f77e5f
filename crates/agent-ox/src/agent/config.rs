use std::env;

use bon::Builder;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_MAX_TOOL_ROUNDS: usize = 12;

/// Behaviour switches of an [`Agent`](super::Agent).
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Run tool rounds on the caller's conversation instead of a private
    /// copy, so later calls see them.
    #[builder(default)]
    pub keep_tool_messages: bool,

    /// Maximum tool rounds per call. `0` disables the limit.
    #[builder(default = DEFAULT_MAX_TOOL_ROUNDS)]
    pub max_tool_rounds: usize,

    /// Turn tool failures into text for the model instead of aborting the call.
    #[builder(default = true)]
    pub fault_tolerant: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            keep_tool_messages: false,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            fault_tolerant: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl AgentConfig {
    pub const KEEP_TOOL_MESSAGES_VAR: &'static str = "AGENT_OX_KEEP_TOOL_MESSAGES";
    pub const MAX_TOOL_ROUNDS_VAR: &'static str = "AGENT_OX_MAX_TOOL_ROUNDS";
    pub const FAULT_TOLERANT_VAR: &'static str = "AGENT_OX_FAULT_TOLERANT";

    /// Reads the configuration from `AGENT_OX_*` environment variables.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(value) = lookup(Self::KEEP_TOOL_MESSAGES_VAR) {
            config.keep_tool_messages = parse_flag(Self::KEEP_TOOL_MESSAGES_VAR, &value)?;
        }
        if let Some(value) = lookup(Self::MAX_TOOL_ROUNDS_VAR) {
            config.max_tool_rounds =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: Self::MAX_TOOL_ROUNDS_VAR,
                        value: value.clone(),
                        expected: "a non-negative integer",
                    })?;
        }
        if let Some(value) = lookup(Self::FAULT_TOLERANT_VAR) {
            config.fault_tolerant = parse_flag(Self::FAULT_TOLERANT_VAR, &value)?;
        }
        Ok(config)
    }

    /// The round limit, `None` when unlimited.
    pub fn round_limit(&self) -> Option<usize> {
        (self.max_tool_rounds > 0).then_some(self.max_tool_rounds)
    }
}

fn parse_flag(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            expected: "a boolean",
        }),
    }
}
