use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use rootie_api::{build_router, AppState, Config};
use rootie_llm::{ChatClient, ChatEventStream, ChatRequest, ChatResponse, Message, StreamEvent};
use rootie_persist::{MemoryClient, NodeScope, PersistenceClient};

/// Provider stand-in that answers every turn with `reply` in two fragments
struct FakeClient {
    reply: &'static str,
    fail: bool,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeClient {
    fn answering(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            reply,
            fail: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: "",
            fail: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn last_messages(&self) -> Vec<Message> {
        self.requests.lock().unwrap().last().unwrap().messages.clone()
    }
}

#[async_trait]
impl ChatClient for FakeClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(anyhow!("Provider API error (503): overloaded"));
        }
        Ok(ChatResponse {
            content: Some(self.reply.to_string()),
            ..Default::default()
        })
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<ChatEventStream> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            return Err(anyhow!("Provider API error (503): overloaded"));
        }
        let (head, tail) = self.reply.split_at(self.reply.len() / 2);
        let items = vec![
            Ok(StreamEvent::Message { content: head.to_string() }),
            Ok(StreamEvent::Message { content: tail.to_string() }),
            Ok(StreamEvent::Done { finish_reason: Some("stop".to_string()) }),
        ];
        Ok(Box::pin(futures::stream::iter(items)))
    }
}

struct TestApp {
    router: Router,
    client: Arc<FakeClient>,
    store: Arc<MemoryClient>,
}

fn app_with(client: Arc<FakeClient>) -> TestApp {
    let store = Arc::new(MemoryClient::new());
    let state = AppState::new(Config::default(), client.clone(), store.clone());
    TestApp {
        router: build_router(Arc::new(state)),
        client,
        store,
    }
}

fn app() -> TestApp {
    app_with(FakeClient::answering("The answer is 4"))
}

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_root_and_health() {
    let app = app();

    let response = send(&app.router, "GET", "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Rootie Backend API is running!");

    let response = send(&app.router, "GET", "/api/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["storage"], "connected");
    assert!(health["timestamp"].is_string());
}

#[tokio::test]
async fn test_root_turn_sends_system_and_prompt() {
    let app = app();

    let response = send(&app.router, "POST", "/api/chat", Some(json!({"prompt": "2+2?"}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["new_node_data"]["question"], "2+2?");
    assert_eq!(body["new_node_data"]["answer"], "The answer is 4");
    assert_eq!(body["new_node_data"]["parent_node_id"], Value::Null);
    assert_eq!(body["new_node_data"]["endpoint_id"], rootie_types::DEFAULT_ENDPOINT_ID);

    assert_eq!(
        app.client.last_messages(),
        vec![Message::system("You are a helpful assistant."), Message::human("2+2?")]
    );

    let nodes = body_json(send(&app.router, "GET", "/api/nodes", None).await).await;
    assert_eq!(nodes["nodes"].as_array().unwrap().len(), 1);
    assert_eq!(nodes["nodes"][0]["ai_response"], "The answer is 4");
}

#[tokio::test]
async fn test_context_from_supplied_nodes() {
    let app = app();

    let payload = json!({
        "prompt": "and then?",
        "parent_node_id": "b",
        "nodes": [
            {"id": "a", "user_prompt": "first", "ai_response": "one"},
            {"id": "b", "parent_node_id": "a", "user_prompt": "second", "ai_response": "two"}
        ]
    });
    let response = send(&app.router, "POST", "/api/chat", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let messages = app.client.last_messages();
    assert_eq!(messages.len(), 6);
    assert_eq!(messages[1], Message::human("first"));
    assert_eq!(messages[4], Message::ai("two"));
    assert_eq!(messages[5], Message::human("and then?"));
}

#[tokio::test]
async fn test_context_falls_back_to_stored_nodes() {
    let app = app();

    let first = body_json(send(&app.router, "POST", "/api/chat", Some(json!({"prompt": "hello"}))).await).await;
    let parent_id = first["new_node_data"]["id"].as_str().unwrap().to_string();

    let response = send(
        &app.router,
        "POST",
        "/api/chat",
        Some(json!({"prompt": "follow up", "parent_node_id": parent_id})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let messages = app.client.last_messages();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1], Message::human("hello"));
}

#[tokio::test]
async fn test_resubmitted_node_id_overwrites() {
    let app = app();

    for prompt in ["draft", "final"] {
        let payload = json!({"prompt": prompt, "node_id": "fixed"});
        let response = send(&app.router, "POST", "/api/chat", Some(payload)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let stored = app.store.list_nodes(NodeScope::All).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, "fixed");
    assert_eq!(stored[0].user_prompt, "final");
}

#[tokio::test]
async fn test_invalid_chat_requests() {
    let app = app();

    let response = send(&app.router, "POST", "/api/chat", Some(json!({"prompt": "   "}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(
        &app.router,
        "POST",
        "/api/chat",
        Some(json!({"prompt": "hi", "graph_id": "missing"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_provider_failure_is_server_error() {
    let app = app_with(FakeClient::failing());

    let response = send(&app.router, "POST", "/api/chat", Some(json!({"prompt": "hi"}))).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("503"));
    assert!(app.store.list_nodes(NodeScope::All).await.unwrap().is_empty());
}

fn frames(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:")))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

#[tokio::test]
async fn test_stream_frames() {
    let app = app();

    let payload = json!({"prompt": "2+2?", "node_id": "pending-1"});
    let response = send(&app.router, "POST", "/api/chat/stream", Some(payload)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let events = frames(&body_text(response).await);
    let kinds: Vec<_> = events.iter().map(|e| e["type"].as_str().unwrap()).collect();
    assert_eq!(kinds, vec!["init", "chunk", "chunk", "complete"]);
    assert_eq!(events[0]["node_id"], "pending-1");
    assert_eq!(events[0]["model_name"], rootie_types::DEFAULT_MODEL_NAME);

    let streamed: String = events[1..3]
        .iter()
        .map(|e| e["content"].as_str().unwrap())
        .collect();
    assert_eq!(streamed, "The answer is 4");
    assert_eq!(events[3]["full_response"], "The answer is 4");

    let stored = app.store.list_nodes(NodeScope::All).await.unwrap();
    assert_eq!(stored[0].id, "pending-1");
}

#[tokio::test]
async fn test_stream_provider_error_frame() {
    let app = app_with(FakeClient::failing());

    let response = send(&app.router, "POST", "/api/chat/stream", Some(json!({"prompt": "hi"}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let events = frames(&body_text(response).await);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["type"], "init");
    assert_eq!(events[1]["type"], "error");
    assert!(events[1]["error"].as_str().unwrap().contains("overloaded"));
}

#[tokio::test]
async fn test_graph_lifecycle() {
    let app = app();

    let response = send(&app.router, "POST", "/api/graphs", Some(json!({"title": "Trip ideas"}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let graph = body_json(response).await;
    let id = graph["id"].as_str().unwrap().to_string();
    assert_eq!(graph["node_count"], 0);

    let save = json!({
        "graph_id": id,
        "nodes": [
            {"id": "r", "user_prompt": "where?", "ai_response": "Lisbon", "position_x": 10.0, "position_y": 20.0},
            {"id": "c", "user_prompt": "when?", "ai_response": "May"}
        ],
        "edges": [{"id": "er-c", "source": "r", "target": "c"}]
    });
    let response = send(&app.router, "POST", &format!("/api/graphs/{}/save", id), Some(save)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let loaded = body_json(send(&app.router, "GET", &format!("/api/graphs/{}/load", id), None).await).await;
    assert_eq!(loaded["graph"]["node_count"], 2);
    assert_eq!(loaded["nodes"][1]["parent_node_id"], "r");
    assert_eq!(loaded["nodes"][0]["position_x"], 10.0);
    assert_eq!(loaded["edges"][0]["id"], "er-c");

    let response = send(
        &app.router,
        "PUT",
        &format!("/api/graphs/{}", id),
        Some(json!({"description": "Summer"})),
    )
    .await;
    let updated = body_json(response).await;
    assert_eq!(updated["title"], "Trip ideas");
    assert_eq!(updated["description"], "Summer");

    let listed = body_json(send(&app.router, "GET", "/api/graphs", None).await).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    // Chat turn inside the graph builds context from its stored nodes
    let response = send(
        &app.router,
        "POST",
        "/api/chat",
        Some(json!({"prompt": "budget?", "parent_node_id": "c", "graph_id": id})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["new_node_data"]["graph_id"], id.as_str());
    assert_eq!(app.client.last_messages().len(), 6);

    let response = send(&app.router, "DELETE", &format!("/api/graphs/{}", id), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Graph deleted (3 nodes removed)");

    let response = send(&app.router, "GET", &format!("/api/graphs/{}/load", id), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(app.store.list_nodes(NodeScope::All).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_graph_validation() {
    let app = app();

    let response = send(&app.router, "POST", "/api/graphs", Some(json!({"title": ""}))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let graph = body_json(send(&app.router, "POST", "/api/graphs", Some(json!({"title": "g"}))).await).await;
    let id = graph["id"].as_str().unwrap();

    let mismatched = json!({"graph_id": "other", "nodes": [], "edges": []});
    let response = send(&app.router, "POST", &format!("/api/graphs/{}/save", id), Some(mismatched)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let dangling = json!({"nodes": [{"id": "x", "parent_node_id": "nowhere", "user_prompt": "q"}]});
    let response = send(&app.router, "POST", &format!("/api/graphs/{}/save", id), Some(dangling)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app.router, "PUT", "/api/graphs/missing", Some(json!({"title": "t"}))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app.router, "DELETE", "/api/graphs/missing", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app();

    let response = send(&app.router, "GET", "/api/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let doc = body_json(response).await;
    assert!(doc["paths"]["/api/chat/stream"].is_object());
    assert!(doc["paths"]["/api/graphs/{graph_id}/load"].is_object());
}
