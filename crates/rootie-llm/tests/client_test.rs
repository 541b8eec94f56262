use rootie_llm::{ChatClient, ChatRequest, Message, OpenAIClient, ProviderConfig};

#[tokio::test]
async fn test_chat_returns_full_reply() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "model": "ep-test",
            "stream": false,
            "messages": [
                {"role": "system", "content": "You are a helpful assistant."},
                {"role": "user", "content": "2+2?"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "id": "cmpl-1",
                "object": "chat.completion",
                "created": 1,
                "model": "doubao-1-5-pro-32k-250115",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "4"},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client =
        OpenAIClient::from_config(&ProviderConfig::new("k").with_base_url(server.url())).unwrap();
    let response = client
        .chat(ChatRequest::new(
            "ep-test",
            vec![
                Message::system("You are a helpful assistant."),
                Message::human("2+2?"),
            ],
        ))
        .await
        .unwrap();

    assert_eq!(response.content.as_deref(), Some("4"));
    assert_eq!(response.finish_reason.as_deref(), Some("stop"));
    assert_eq!(response.usage.map(|u| u.total_tokens), Some(13));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_server_error_carries_upstream_text() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("upstream overloaded")
        .create_async()
        .await;

    let client =
        OpenAIClient::from_config(&ProviderConfig::new("k").with_base_url(server.url())).unwrap();
    let err = client
        .chat(ChatRequest::new("ep-test", vec![Message::human("hi")]))
        .await
        .unwrap_err()
        .to_string();

    assert!(err.contains("503"));
    assert!(err.contains("upstream overloaded"));
}
