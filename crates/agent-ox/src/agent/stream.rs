//! Stream interception.
//!
//! A model may answer with a token stream that ends in a tool call request
//! instead of more text. The interceptor forwards tokens to the caller as they
//! arrive. When the request shows up it records the text seen so far, runs the
//! tool round and continues the caller's stream with whatever the follow-up
//! turn produces. Nested streams are intercepted the same way.

use async_stream::try_stream;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;

use super::{AgentError, AgentResponse, turn::Turn};
use crate::{
    content::Message,
    model::{ChunkStream, ResultKind, StreamChunk},
};

/// A lazy, single-pass sequence of text tokens.
pub type TokenStream = BoxStream<'static, Result<String, AgentError>>;

pub(crate) fn intercept(mut turn: Turn, mut chunks: ChunkStream) -> TokenStream {
    try_stream! {
        let cancellation = turn.cancellation();
        let mut seen = String::new();

        loop {
            turn.ensure_active()?;
            let next = tokio::select! {
                biased;
                () = cancellation.cancelled() => Err(AgentError::Cancelled),
                chunk = chunks.next() => Ok(chunk),
            };
            let chunk = match next? {
                Some(chunk) => chunk?,
                None => break,
            };

            match chunk {
                StreamChunk::Token(token) => {
                    seen.push_str(&token);
                    yield token;
                }
                StreamChunk::ToolCalls(calls) => {
                    tracing::debug!(
                        calls = calls.len(),
                        streamed = seen.len(),
                        "tool call request inside token stream"
                    );
                    if !seen.is_empty() {
                        turn.conversation().push(Message::assistant(std::mem::take(&mut seen)));
                    }

                    let next = turn.run_tool_round(calls).await?;
                    let response = turn.settle(next).await?;
                    match response {
                        AgentResponse::Text(text) => {
                            if !text.is_empty() {
                                yield text;
                            }
                        }
                        AgentResponse::Stream(mut continuation) => {
                            while let Some(token) = continuation.next().await {
                                let token = token?;
                                yield token;
                            }
                        }
                        AgentResponse::Object(value) => {
                            yield value.to_string();
                        }
                        AgentResponse::Binary { .. } => {
                            Err::<(), _>(AgentError::UnsupportedStreamContinuation { kind: ResultKind::Binary })?;
                        }
                        AgentResponse::Vector(_) => {
                            Err::<(), _>(AgentError::UnsupportedStreamContinuation { kind: ResultKind::Vector })?;
                        }
                    }
                    break;
                }
            }
        }
    }
    .boxed()
}
