use rootie_llm::{ChatOptions, ChatRequest, Message};

#[test]
fn test_chat_request_creation() {
    let messages = vec![Message::human("Hello")];
    let request = ChatRequest::new("ep-20250228174015-wrzrt", messages);

    assert_eq!(request.model, "ep-20250228174015-wrzrt");
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.options, ChatOptions::default());
}

#[test]
fn test_chat_request_with_options() {
    let messages = vec![Message::human("Hello")];
    let options = ChatOptions::new()
        .temperature(0.7)
        .max_tokens(100);

    let request = ChatRequest::new("gpt-4o", messages)
        .with_options(options);

    assert_eq!(request.options.temperature, Some(0.7));
    assert_eq!(request.options.max_tokens, Some(100));
}

#[test]
fn test_chat_options_default() {
    let options = ChatOptions::default();

    assert_eq!(options.temperature, None);
    assert_eq!(options.max_tokens, None);
}

#[test]
fn test_chat_options_from_toml_like_json() {
    let options: ChatOptions = serde_json::from_str(r#"{"max_tokens": 512}"#).unwrap();
    assert_eq!(options.max_tokens, Some(512));
    assert_eq!(options.temperature, None);
}
