mod common;

use agent_ox::{
    Agent, AgentConfig, AgentError, AgentResponse, CallOptions, Conversation, Message, MessageRole,
    ModelError, ModelResult, StreamChunk, TokenStream, model::ResultKind,
};
use common::{ScriptedModel, call, registry, roles, text, token_stream};
use futures_util::{StreamExt, stream};
use serde_json::json;

fn agent(model: &ScriptedModel) -> Agent {
    Agent::with_model(model.clone())
        .registry(registry())
        .config(AgentConfig::builder().keep_tool_messages(true).build())
        .build()
        .unwrap()
}

fn into_stream(response: AgentResponse) -> TokenStream {
    match response {
        AgentResponse::Stream(stream) => stream,
        other => panic!("expected a token stream, got {other:?}"),
    }
}

async fn drain(stream: TokenStream) -> (Vec<String>, Option<AgentError>) {
    let mut tokens = Vec::new();
    let mut stream = stream;
    while let Some(item) = stream.next().await {
        match item {
            Ok(token) => tokens.push(token),
            Err(error) => return (tokens, Some(error)),
        }
    }
    (tokens, None)
}

#[tokio::test]
async fn test_plain_stream_is_forwarded() {
    let model = ScriptedModel::new([token_stream(&["Hello", ", ", "world"], None)]);
    let agent = agent(&model);
    let conversation = Conversation::from(vec![Message::user("Hi")]);

    let response = agent.call(&conversation, CallOptions::new()).await.unwrap();
    let (tokens, error) = drain(into_stream(response)).await;

    assert!(error.is_none());
    assert_eq!(tokens, ["Hello", ", ", "world"]);
    assert_eq!(conversation.len(), 1);
}

#[tokio::test]
async fn test_tool_call_inside_stream_continues_the_same_stream() {
    let model = ScriptedModel::new([
        token_stream(
            &["The", " weather", " is"],
            Some(vec![call("w1", "get_weather", json!({"city": "Oslo"}))]),
        ),
        text(" sunny in Oslo"),
    ]);
    let agent = agent(&model);
    let conversation = Conversation::from(vec![Message::user("Weather in Oslo?")]);

    let response = agent.call(&conversation, CallOptions::new()).await.unwrap();
    let (tokens, error) = drain(into_stream(response)).await;

    assert!(error.is_none());
    assert_eq!(tokens, ["The", " weather", " is", " sunny in Oslo"]);

    let messages = conversation.messages();
    assert_eq!(
        roles(&messages),
        [
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::Assistant,
            MessageRole::ToolResult
        ]
    );
    assert_eq!(messages[1].text().as_deref(), Some("The weather is"));
    assert_eq!(
        messages[2].tool_calls(),
        [call("w1", "get_weather", json!({"city": "Oslo"}))]
    );
    assert_eq!(
        messages[3].tool_content(),
        Some(Some(r#"{"city":"Oslo","sky":"sunny"}"#))
    );

    let requests = model.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].messages, messages);
}

#[tokio::test]
async fn test_stream_without_leading_text_records_no_partial_message() {
    let model = ScriptedModel::new([
        token_stream(&[], Some(vec![call("1", "echo", json!({"text": "hi"}))])),
        text("hi"),
    ]);
    let agent = agent(&model);
    let conversation = Conversation::from(vec![Message::user("Echo hi")]);

    let response = agent.call(&conversation, CallOptions::new()).await.unwrap();
    let (tokens, _) = drain(into_stream(response)).await;

    assert_eq!(tokens, ["hi"]);
    assert_eq!(
        roles(&conversation.messages()),
        [MessageRole::User, MessageRole::Assistant, MessageRole::ToolResult]
    );
}

#[tokio::test]
async fn test_nested_streams_are_intercepted() {
    let model = ScriptedModel::new([
        token_stream(&["Checking"], Some(vec![call("1", "echo", json!({"text": "a"}))])),
        token_stream(&[" and", " again"], Some(vec![call("2", "echo", json!({"text": "b"}))])),
        token_stream(&[" done"], None),
    ]);
    let agent = agent(&model);
    let conversation = Conversation::from(vec![Message::user("go")]);

    let response = agent.call(&conversation, CallOptions::new()).await.unwrap();
    let (tokens, error) = drain(into_stream(response)).await;

    assert!(error.is_none());
    assert_eq!(tokens, ["Checking", " and", " again", " done"]);
    assert_eq!(model.invocations(), 3);

    let messages = conversation.messages();
    let reported: Vec<_> = messages
        .iter()
        .filter_map(|message| message.tool_call_id().map(str::to_string))
        .collect();
    assert_eq!(reported, ["1", "2"]);
    assert_eq!(messages[4].text().as_deref(), Some(" and again"));
}

#[tokio::test]
async fn test_tool_rounds_inside_a_stream_share_the_round_limit() {
    let model = ScriptedModel::new([
        token_stream(&["a"], Some(vec![call("1", "echo", json!({"text": "a"}))])),
        token_stream(&["b"], Some(vec![call("2", "echo", json!({"text": "b"}))])),
        text("unreachable"),
    ]);
    let agent = Agent::with_model(model.clone())
        .registry(registry())
        .config(AgentConfig::builder().max_tool_rounds(1).build())
        .build()
        .unwrap();

    let response = agent
        .call(&Conversation::from(vec![Message::user("go")]), CallOptions::new())
        .await
        .unwrap();
    let (tokens, error) = drain(into_stream(response)).await;

    assert_eq!(tokens, ["a", "b"]);
    assert!(matches!(error, Some(AgentError::MaxToolRounds { limit: 1 })));
    assert_eq!(model.remaining(), 1);
}

#[tokio::test]
async fn test_object_continuation_is_streamed_as_json() {
    let model = ScriptedModel::new([
        token_stream(&["Result: "], Some(vec![call("1", "echo", json!({"text": "x"}))])),
        ModelResult::Object(json!({"ok": true})),
    ]);
    let agent = agent(&model);

    let response = agent
        .call(&Conversation::from(vec![Message::user("go")]), CallOptions::new())
        .await
        .unwrap();
    let (tokens, error) = drain(into_stream(response)).await;

    assert!(error.is_none());
    assert_eq!(tokens, ["Result: ", r#"{"ok":true}"#]);
}

#[tokio::test]
async fn test_binary_continuation_fails_the_stream() {
    let model = ScriptedModel::new([
        token_stream(&["Drawing"], Some(vec![call("1", "echo", json!({"text": "x"}))])),
        ModelResult::Binary {
            data: vec![0x89, 0x50],
            mime_type: Some("image/png".to_string()),
        },
    ]);
    let agent = agent(&model);

    let response = agent
        .call(&Conversation::from(vec![Message::user("draw")]), CallOptions::new())
        .await
        .unwrap();
    let (tokens, error) = drain(into_stream(response)).await;

    assert_eq!(tokens, ["Drawing"]);
    assert!(matches!(
        error,
        Some(AgentError::UnsupportedStreamContinuation {
            kind: ResultKind::Binary
        })
    ));
}

#[tokio::test]
async fn test_stream_errors_are_forwarded() {
    let broken = ModelResult::Stream(
        stream::iter([
            Ok(StreamChunk::Token("partial".to_string())),
            Err(ModelError::InvalidStream("connection reset".to_string())),
        ])
        .boxed(),
    );
    let model = ScriptedModel::new([broken]);
    let agent = agent(&model);

    let response = agent
        .call(&Conversation::from(vec![Message::user("go")]), CallOptions::new())
        .await
        .unwrap();
    let (tokens, error) = drain(into_stream(response)).await;

    assert_eq!(tokens, ["partial"]);
    assert!(matches!(
        error,
        Some(AgentError::Model(ModelError::InvalidStream(_)))
    ));
}

#[tokio::test]
async fn test_cancellation_stops_the_stream() {
    let model = ScriptedModel::new([token_stream(
        &["one", "two", "three"],
        Some(vec![call("1", "echo", json!({"text": "x"}))]),
    )]);
    let agent = agent(&model);

    let response = agent
        .call(&Conversation::from(vec![Message::user("go")]), CallOptions::new())
        .await
        .unwrap();
    let mut stream = into_stream(response);

    assert_eq!(stream.next().await.unwrap().unwrap(), "one");
    agent.cancellation_token().cancel();
    assert!(matches!(stream.next().await, Some(Err(AgentError::Cancelled))));
    assert_eq!(model.invocations(), 1);
}

#[tokio::test]
async fn test_collect_text_drains_an_intercepted_stream() {
    let model = ScriptedModel::new([
        token_stream(&["The", " weather"], Some(vec![call("w1", "get_weather", json!({"city": "Rome"}))])),
        token_stream(&[" is", " sunny"], None),
    ]);
    let agent = agent(&model);

    let response = agent
        .call(&Conversation::from(vec![Message::user("Rome?")]), CallOptions::new())
        .await
        .unwrap();

    assert_eq!(
        response.collect_text().await.unwrap().as_deref(),
        Some("The weather is sunny")
    );
}
