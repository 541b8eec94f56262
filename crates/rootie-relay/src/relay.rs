use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use rootie_llm::{ChatClient, ChatRequest, Message, StreamEvent};
use rootie_persist::PersistenceClient;
use rootie_types::{DialogueNode, NodeId, PersistFailurePolicy, RelayConfig, RelayEvent, TurnRequest};
use tokio::sync::mpsc;

use crate::error::{RelayError, Result};

/// Capacity of the event channel returned by [`Relay::spawn_stream`]
pub const EVENT_BUFFER: usize = 256;

/// Result of a one-shot completion
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub response_text: String,
    pub model_name: String,
}

/// Forwards a turn to the provider and turns the reply into a dialogue node
pub struct Relay {
    client: Arc<dyn ChatClient>,
    config: RelayConfig,
    store: Option<Arc<dyn PersistenceClient>>,
}

impl Relay {
    pub fn new(client: Arc<dyn ChatClient>, config: RelayConfig) -> Self {
        Self {
            client,
            config,
            store: None,
        }
    }

    /// Create a builder for fluent construction
    pub fn builder() -> crate::builder::RelayBuilder {
        crate::builder::RelayBuilder::new()
    }

    /// Hand completed nodes to `store` instead of leaving persistence to the caller
    pub fn with_store(mut self, store: Arc<dyn PersistenceClient>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    fn request(config: &RelayConfig, messages: Vec<Message>) -> ChatRequest {
        ChatRequest::new(config.endpoint_id.clone(), messages).with_options(config.options.clone())
    }

    /// Call the provider once and wait for the full reply
    pub async fn complete(&self, messages: Vec<Message>) -> Result<Completion> {
        let response = self
            .client
            .chat(Self::request(&self.config, messages))
            .await
            .map_err(RelayError::provider)?;

        let response_text = response
            .content
            .ok_or_else(|| RelayError::Provider("Provider returned no content".to_string()))?;

        Ok(Completion {
            response_text,
            model_name: self.config.model_name.clone(),
        })
    }

    /// Non-streaming turn: complete, assemble the node and persist it if a store is set
    pub async fn complete_node(&self, turn: TurnRequest) -> Result<DialogueNode> {
        let node_id = turn.resolve_node_id();
        tracing::info!(node_id = %node_id, parent_node_id = ?turn.parent_node_id, "Completing turn");

        let completion = self.complete(turn.messages()).await?;
        let node = assemble_node(&self.config, node_id, &turn, completion.response_text, Utc::now());

        if let Some(store) = &self.store {
            if let Err(e) = store.upsert_node(node.clone()).await {
                tracing::error!(node_id = %node.id, error = %e, "Failed to persist completed node");
                if self.config.persist_failure == PersistFailurePolicy::Fail {
                    return Err(RelayError::Persist(e));
                }
            }
        }

        Ok(node)
    }

    /// Spawn a streamed turn in the background, return the event receiver
    ///
    /// Dropping the receiver cancels the turn: the provider stream is dropped
    /// and nothing is persisted.
    pub fn spawn_stream(&self, turn: TurnRequest) -> mpsc::Receiver<RelayEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);

        let client = Arc::clone(&self.client);
        let config = self.config.clone();
        let store = self.store.clone();

        tokio::spawn(async move {
            Self::execute_stream(turn, tx, client, config, store).await;
        });

        rx
    }

    async fn execute_stream(
        turn: TurnRequest,
        event_tx: mpsc::Sender<RelayEvent>,
        client: Arc<dyn ChatClient>,
        config: RelayConfig,
        store: Option<Arc<dyn PersistenceClient>>,
    ) {
        let node_id = turn.resolve_node_id();

        let init = RelayEvent::Init {
            node_id: node_id.clone(),
            question: turn.prompt.clone(),
            parent_node_id: turn.parent_node_id.clone(),
            model_name: config.model_name.clone(),
            endpoint_id: config.endpoint_id.clone(),
        };
        if event_tx.send(init).await.is_err() {
            tracing::debug!(node_id = %node_id, "Client disconnected before init");
            return;
        }

        let request = Self::request(&config, turn.messages());
        let mut stream = match client.chat_stream(request).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(node_id = %node_id, error = %e, "Provider stream failed to start");
                let _ = event_tx.send(RelayEvent::Error { message: format!("{:#}", e) }).await;
                return;
            }
        };

        let mut full_response = String::new();
        let mut chunks = 0usize;

        loop {
            let next = tokio::select! {
                _ = event_tx.closed() => {
                    tracing::debug!(node_id = %node_id, chunks, "Client disconnected mid-stream");
                    return;
                }
                next = stream.next() => next,
            };

            match next {
                Some(Ok(StreamEvent::Message { content })) => {
                    if content.is_empty() {
                        continue;
                    }
                    full_response.push_str(&content);
                    chunks += 1;
                    if event_tx.send(RelayEvent::Chunk { content }).await.is_err() {
                        tracing::debug!(node_id = %node_id, chunks, "Client disconnected mid-stream");
                        return;
                    }
                }
                Some(Ok(StreamEvent::Done { .. })) => break,
                None => {
                    tracing::warn!(node_id = %node_id, chunks, "Provider stream ended without a finish marker");
                    let _ = event_tx
                        .send(RelayEvent::error("Provider stream ended before completion"))
                        .await;
                    return;
                }
                Some(Err(e)) => {
                    tracing::warn!(node_id = %node_id, chunks, error = %e, "Provider stream failed");
                    let _ = event_tx.send(RelayEvent::Error { message: format!("{:#}", e) }).await;
                    return;
                }
            }
        }
        drop(stream);

        if event_tx.is_closed() {
            tracing::debug!(node_id = %node_id, "Client disconnected before completion");
            return;
        }

        let created_at = Utc::now();
        let terminal = match store {
            None => RelayEvent::Done {
                full_response,
                created_at,
            },
            Some(store) => {
                let node = assemble_node(&config, node_id.clone(), &turn, full_response.clone(), created_at);
                match store.upsert_node(node).await {
                    Ok(outcome) => {
                        tracing::debug!(node_id = %node_id, outcome = ?outcome, "Persisted streamed node");
                        RelayEvent::Complete {
                            full_response,
                            created_at,
                        }
                    }
                    Err(e) => {
                        tracing::error!(node_id = %node_id, error = %e, "Failed to persist completed node");
                        match config.persist_failure {
                            PersistFailurePolicy::LogAndContinue => RelayEvent::Complete {
                                full_response,
                                created_at,
                            },
                            PersistFailurePolicy::Fail => RelayEvent::error(RelayError::Persist(e).to_string()),
                        }
                    }
                }
            }
        };

        tracing::info!(node_id = %node_id, chunks, event = terminal.kind(), "Stream finished");
        let _ = event_tx.send(terminal).await;
    }
}

fn assemble_node(
    config: &RelayConfig,
    node_id: NodeId,
    turn: &TurnRequest,
    response: String,
    created_at: DateTime<Utc>,
) -> DialogueNode {
    DialogueNode {
        id: node_id,
        parent_node_id: turn.parent_node_id.clone(),
        graph_id: turn.graph_id.clone(),
        user_prompt: turn.prompt.clone(),
        ai_response: response,
        created_at: Some(created_at),
        model_name: Some(config.model_name.clone()),
        endpoint_id: Some(config.endpoint_id.clone()),
        position_x: None,
        position_y: None,
    }
}
