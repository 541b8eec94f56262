use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use rootie_persist::NodeScope;
use rootie_types::DialogueNode;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListNodesQuery {
    /// Only nodes filed under this graph
    pub graph_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NodesResponse {
    #[schema(value_type = Vec<Object>)]
    pub nodes: Vec<DialogueNode>,
}

/// List stored dialogue nodes
#[utoipa::path(
    get,
    path = "/api/nodes",
    params(ListNodesQuery),
    responses(
        (status = 200, description = "Stored nodes", body = NodesResponse),
        (status = 404, description = "Graph not found")
    ),
    tag = "nodes"
)]
pub async fn list_nodes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListNodesQuery>,
) -> ApiResult<Json<NodesResponse>> {
    let scope = match query.graph_id.filter(|id| !id.is_empty()) {
        Some(graph_id) => {
            if state.persist.get_graph(&graph_id).await?.is_none() {
                return Err(ApiError::NotFound(format!("Graph not found: {}", graph_id)));
            }
            NodeScope::Graph(graph_id)
        }
        None => NodeScope::All,
    };

    let nodes = state.persist.list_nodes(scope).await?;
    Ok(Json(NodesResponse { nodes }))
}
