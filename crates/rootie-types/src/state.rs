use rootie_llm::Message;
use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// Input for one relay run: the new prompt plus the context built from its ancestors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRequest {
    pub prompt: String,
    pub parent_node_id: Option<NodeId>,
    /// Reused when present so a pre-created pending node keeps its id
    pub node_id: Option<NodeId>,
    pub graph_id: Option<String>,
    /// System message plus ancestor pairs; the prompt is appended by the relay
    pub context: Vec<Message>,
}

impl TurnRequest {
    pub fn new(prompt: impl Into<String>, context: Vec<Message>) -> Self {
        Self {
            prompt: prompt.into(),
            parent_node_id: None,
            node_id: None,
            graph_id: None,
            context,
        }
    }

    pub fn with_parent(mut self, parent_node_id: Option<NodeId>) -> Self {
        self.parent_node_id = parent_node_id.filter(|p| !p.is_empty());
        self
    }

    pub fn with_node_id(mut self, node_id: Option<NodeId>) -> Self {
        self.node_id = node_id.filter(|id| !id.is_empty());
        self
    }

    pub fn with_graph(mut self, graph_id: Option<String>) -> Self {
        self.graph_id = graph_id.filter(|id| !id.is_empty());
        self
    }

    /// The caller's node id, or a fresh v4 UUID
    pub fn resolve_node_id(&self) -> NodeId {
        self.node_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }

    /// Context followed by the new user prompt, as sent to the provider
    pub fn messages(&self) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.context.len() + 1);
        messages.extend(self.context.iter().cloned());
        messages.push(Message::human(self.prompt.clone()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_appended_last() {
        let turn = TurnRequest::new("2+2?", vec![Message::system("You are a helpful assistant.")]);
        assert_eq!(
            turn.messages(),
            vec![
                Message::system("You are a helpful assistant."),
                Message::human("2+2?"),
            ]
        );
    }

    #[test]
    fn test_node_id_reused_or_generated() {
        let turn = TurnRequest::new("q", vec![]).with_node_id(Some("pending-1".to_string()));
        assert_eq!(turn.resolve_node_id(), "pending-1");

        let fresh = TurnRequest::new("q", vec![]).with_node_id(Some(String::new()));
        let id = fresh.resolve_node_id();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_ne!(id, fresh.resolve_node_id());
    }
}
