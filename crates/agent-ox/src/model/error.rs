use thiserror::Error;

use crate::tool::{BoxedError, EmptyToolCalls};

/// Errors raised by a [`Model`](super::Model) implementation.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The provider request failed (transport, authentication, rate limit, ...).
    #[error("Model request failed: {source}")]
    Request {
        #[source]
        source: BoxedError,
    },

    /// The provider answered without any usable content.
    #[error("No response received from model")]
    NoResponse,

    /// A token stream broke off or carried malformed data.
    #[error("Invalid stream: {0}")]
    InvalidStream(String),

    /// A tool call request without any tool call.
    #[error(transparent)]
    EmptyToolCalls(#[from] EmptyToolCalls),
}

impl ModelError {
    pub fn request(source: impl Into<BoxedError>) -> Self {
        Self::Request {
            source: source.into(),
        }
    }

    pub fn invalid_stream(message: impl Into<String>) -> Self {
        Self::InvalidStream(message.into())
    }
}
