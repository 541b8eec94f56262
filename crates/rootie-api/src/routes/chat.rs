use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use rootie_persist::NodeScope;
use rootie_relay::TurnRequest;
use rootie_types::{DialogueNode, NodeId};

use crate::{
    error::{ApiError, ApiResult, ValidatedJson},
    state::AppState,
};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatTurnRequest {
    pub prompt: String,
    #[serde(default)]
    pub parent_node_id: Option<NodeId>,
    /// Reused for the new node when present
    #[serde(default)]
    pub node_id: Option<NodeId>,
    /// Nodes the context may be built from; empty means "use stored nodes"
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub nodes: Vec<DialogueNode>,
    #[serde(default)]
    pub graph_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewNodeData {
    pub id: NodeId,
    pub question: String,
    pub answer: String,
    pub parent_node_id: Option<NodeId>,
    pub created_at: Option<DateTime<Utc>>,
    pub model_name: Option<String>,
    pub endpoint_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_id: Option<String>,
}

impl From<DialogueNode> for NewNodeData {
    fn from(node: DialogueNode) -> Self {
        Self {
            id: node.id,
            question: node.user_prompt,
            answer: node.ai_response,
            parent_node_id: node.parent_node_id,
            created_at: node.created_at,
            model_name: node.model_name,
            endpoint_id: node.endpoint_id,
            graph_id: node.graph_id,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatTurnResponse {
    pub new_node_data: NewNodeData,
    pub success: bool,
    pub message: String,
}

/// Validate a chat request and build the relay input for it
///
/// The context comes from `nodes` when the client sent any, otherwise from
/// the stored nodes of `graph_id`, otherwise from the unfiled stored nodes.
pub(crate) async fn prepare_turn(state: &AppState, req: ChatTurnRequest) -> ApiResult<TurnRequest> {
    if req.prompt.trim().is_empty() {
        return Err(ApiError::BadRequest("prompt must not be empty".to_string()));
    }

    let graph_id = req.graph_id.filter(|id| !id.is_empty());
    if let Some(id) = graph_id.as_deref() {
        if state.persist.get_graph(id).await?.is_none() {
            return Err(ApiError::NotFound(format!("Graph not found: {}", id)));
        }
    }

    let parent_node_id = req.parent_node_id.filter(|id| !id.is_empty());
    let known_nodes = match (req.nodes.is_empty(), parent_node_id.is_some()) {
        (false, _) => req.nodes,
        // A root turn needs no history
        (true, false) => Vec::new(),
        (true, true) => {
            let scope = match graph_id.clone() {
                Some(id) => NodeScope::Graph(id),
                None => NodeScope::Unfiled,
            };
            state.persist.list_nodes(scope).await?
        }
    };

    let context = state
        .context_strategy
        .build(parent_node_id.as_deref(), &known_nodes)
        .into_messages();

    Ok(TurnRequest::new(req.prompt, context)
        .with_parent(parent_node_id)
        .with_node_id(req.node_id)
        .with_graph(graph_id))
}

/// Run one non-streaming chat turn
#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatTurnRequest,
    responses(
        (status = 200, description = "Turn completed", body = ChatTurnResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Graph not found"),
        (status = 500, description = "Provider or storage failure")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<ChatTurnRequest>,
) -> ApiResult<Json<ChatTurnResponse>> {
    let turn = prepare_turn(&state, req).await?;
    let node = state.relay.complete_node(turn).await?;

    Ok(Json(ChatTurnResponse {
        new_node_data: node.into(),
        success: true,
        message: "Dialogue created".to_string(),
    }))
}
