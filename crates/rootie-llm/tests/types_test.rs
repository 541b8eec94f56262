use rootie_llm::{Message, StreamEvent};

#[test]
fn test_message_system() {
    let msg = Message::system("You are helpful");
    assert_eq!(msg.role(), "system");
    assert_eq!(msg.content(), "You are helpful");
}

#[test]
fn test_message_human() {
    let msg = Message::human("Hello");
    assert_eq!(msg.role(), "user");
}

#[test]
fn test_message_ai() {
    let msg = Message::ai("Hi there!");
    assert_eq!(msg.role(), "assistant");
}

#[test]
fn test_message_wire_shape() {
    let msg = Message::human("2+2?");
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json, serde_json::json!({"role": "user", "content": "2+2?"}));
}

#[test]
fn test_message_deserialization() {
    let json = r#"{"role":"assistant","content":"4"}"#;
    let msg: Message = serde_json::from_str(json).unwrap();
    assert_eq!(msg, Message::ai("4"));
}

#[test]
fn test_unknown_role_rejected() {
    let json = r#"{"role":"tool","content":"x"}"#;
    assert!(serde_json::from_str::<Message>(json).is_err());
}

#[test]
fn test_stream_event_serialization() {
    let event = StreamEvent::Message {
        content: "Test".to_string(),
    };

    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains("\"type\":\"message\""));

    let done = serde_json::to_string(&StreamEvent::Done { finish_reason: None }).unwrap();
    assert_eq!(done, r#"{"type":"done"}"#);
}
