use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque node identifier (client-assigned or a v4 UUID)
pub type NodeId = String;

/// One turn in a conversation tree: a prompt, the model's reply and a parent link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    pub id: NodeId,

    /// `None` marks a root node
    #[serde(default, alias = "parent_id")]
    pub parent_node_id: Option<NodeId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<String>,

    #[serde(default)]
    pub user_prompt: String,

    /// Empty until the relay completes
    #[serde(default)]
    pub ai_response: String,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub model_name: Option<String>,

    #[serde(default)]
    pub endpoint_id: Option<String>,

    // Layout hints from the canvas, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_y: Option<f64>,
}

impl DialogueNode {
    pub fn new(id: impl Into<NodeId>, user_prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_node_id: None,
            graph_id: None,
            user_prompt: user_prompt.into(),
            ai_response: String::new(),
            created_at: None,
            model_name: None,
            endpoint_id: None,
            position_x: None,
            position_y: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<NodeId>) -> Self {
        self.parent_node_id = Some(parent_id.into());
        self
    }

    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.ai_response = response.into();
        self
    }

    pub fn with_graph(mut self, graph_id: impl Into<String>) -> Self {
        self.graph_id = Some(graph_id.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position_x = Some(x);
        self.position_y = Some(y);
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_node_id.as_deref().map_or(true, str::is_empty)
    }
}
