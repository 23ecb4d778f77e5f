pub mod error;
pub mod request;
pub mod result;

pub use error::ModelError;
pub use request::ModelRequest;
pub use result::{ChunkStream, ModelResult, ResultKind, StreamChunk};

use futures_util::future::BoxFuture;
use std::sync::Arc;

/// A trait for interacting with a large language model.
///
/// Implementations translate a [`ModelRequest`] into a provider call and the
/// provider's answer into a [`ModelResult`]. The agent only branches on the
/// variant of that result.
pub trait Model: Send + Sync {
    /// Returns the model name/identifier.
    fn name(&self) -> &str;

    /// Sends a request to the model.
    fn invoke(&self, request: ModelRequest) -> BoxFuture<'_, Result<ModelResult, ModelError>>;
}

impl<T: Model + ?Sized> Model for Arc<T> {
    fn name(&self) -> &str {
        self.as_ref().name()
    }

    fn invoke(&self, request: ModelRequest) -> BoxFuture<'_, Result<ModelResult, ModelError>> {
        self.as_ref().invoke(request)
    }
}
