use std::fmt;

use futures_util::StreamExt;
use serde_json::Value;

use super::{AgentError, stream::TokenStream};
use crate::model::ResultKind;

/// The terminal result of an agent call.
///
/// Tool rounds never surface here: they are settled inside the call, and a
/// stream hides them behind one continuous token sequence.
pub enum AgentResponse {
    Text(String),
    /// Tokens for the caller, with tool rounds run lazily as it is consumed.
    Stream(TokenStream),
    Object(Value),
    Binary {
        data: Vec<u8>,
        mime_type: Option<String>,
    },
    Vector(Vec<f32>),
}

impl AgentResponse {
    pub fn kind(&self) -> ResultKind {
        match self {
            Self::Text(_) => ResultKind::Text,
            Self::Stream(_) => ResultKind::Stream,
            Self::Object(_) => ResultKind::Object,
            Self::Binary { .. } => ResultKind::Binary,
            Self::Vector(_) => ResultKind::Vector,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Consumes the response into text: streams are drained and objects are
    /// JSON encoded. Binary and vector output has no text.
    pub async fn collect_text(self) -> Result<Option<String>, AgentError> {
        match self {
            Self::Text(text) => Ok(Some(text)),
            Self::Object(value) => Ok(Some(value.to_string())),
            Self::Stream(mut stream) => {
                let mut text = String::new();
                while let Some(token) = stream.next().await {
                    text.push_str(&token?);
                }
                Ok(Some(text))
            }
            Self::Binary { .. } | Self::Vector(_) => Ok(None),
        }
    }
}

impl fmt::Debug for AgentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Object(value) => f.debug_tuple("Object").field(value).finish(),
            Self::Binary { data, mime_type } => f
                .debug_struct("Binary")
                .field("len", &data.len())
                .field("mime_type", mime_type)
                .finish(),
            Self::Vector(vector) => f.debug_struct("Vector").field("len", &vector.len()).finish(),
        }
    }
}
