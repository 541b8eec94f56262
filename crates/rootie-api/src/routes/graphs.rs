use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use rootie_persist::{GraphInfo, GraphSnapshot};
use rootie_types::{DialogueNode, GraphEdge, GraphUpdate, NewGraph};

use crate::{
    error::{ApiError, ApiResult, ValidatedJson},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateGraphRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateGraphRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SaveGraphRequest {
    /// Must match the path id when present
    #[serde(default)]
    pub graph_id: Option<String>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub nodes: Vec<DialogueNode>,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GraphResponse {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub node_count: usize,
}

impl From<GraphInfo> for GraphResponse {
    fn from(info: GraphInfo) -> Self {
        Self {
            id: info.graph.id,
            title: info.graph.title,
            description: info.graph.description,
            created_at: info.graph.created_at,
            updated_at: info.graph.updated_at,
            node_count: info.node_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GraphSnapshotResponse {
    pub graph: GraphResponse,
    #[schema(value_type = Vec<Object>)]
    pub nodes: Vec<DialogueNode>,
    #[schema(value_type = Vec<Object>)]
    pub edges: Vec<GraphEdge>,
}

impl From<GraphSnapshot> for GraphSnapshotResponse {
    fn from(snapshot: GraphSnapshot) -> Self {
        let node_count = snapshot.nodes.len();
        Self {
            graph: GraphInfo {
                graph: snapshot.graph,
                node_count,
            }
            .into(),
            nodes: snapshot.nodes,
            edges: snapshot.edges,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

fn require_title(title: &str) -> ApiResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

/// Create a new graph
#[utoipa::path(
    post,
    path = "/api/graphs",
    request_body = CreateGraphRequest,
    responses(
        (status = 201, description = "Graph created", body = GraphResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "graphs"
)]
pub async fn create_graph(
    State(state): State<Arc<AppState>>,
    ValidatedJson(req): ValidatedJson<CreateGraphRequest>,
) -> ApiResult<(StatusCode, Json<GraphResponse>)> {
    let title = require_title(&req.title)?;
    let graph = state
        .persist
        .create_graph(NewGraph {
            title,
            description: req.description,
        })
        .await?;

    let info = GraphInfo { graph, node_count: 0 };
    Ok((StatusCode::CREATED, Json(info.into())))
}

/// List graphs, most recently updated first
#[utoipa::path(
    get,
    path = "/api/graphs",
    responses(
        (status = 200, description = "List of graphs", body = Vec<GraphResponse>)
    ),
    tag = "graphs"
)]
pub async fn list_graphs(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<GraphResponse>>> {
    let graphs = state.persist.list_graphs().await?;
    Ok(Json(graphs.into_iter().map(GraphResponse::from).collect()))
}

/// Get a graph's metadata
#[utoipa::path(
    get,
    path = "/api/graphs/{graph_id}",
    params(
        ("graph_id" = String, Path, description = "Graph ID")
    ),
    responses(
        (status = 200, description = "Graph found", body = GraphResponse),
        (status = 404, description = "Graph not found")
    ),
    tag = "graphs"
)]
pub async fn get_graph(
    State(state): State<Arc<AppState>>,
    Path(graph_id): Path<String>,
) -> ApiResult<Json<GraphResponse>> {
    let info = state
        .persist
        .get_graph(&graph_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Graph not found: {}", graph_id)))?;

    Ok(Json(info.into()))
}

/// Update a graph's title and/or description
#[utoipa::path(
    put,
    path = "/api/graphs/{graph_id}",
    params(
        ("graph_id" = String, Path, description = "Graph ID")
    ),
    request_body = UpdateGraphRequest,
    responses(
        (status = 200, description = "Graph updated", body = GraphResponse),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Graph not found")
    ),
    tag = "graphs"
)]
pub async fn update_graph(
    State(state): State<Arc<AppState>>,
    Path(graph_id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateGraphRequest>,
) -> ApiResult<Json<GraphResponse>> {
    let update = GraphUpdate {
        title: req.title.as_deref().map(require_title).transpose()?,
        description: req.description,
    };

    let info = state.persist.update_graph(&graph_id, update).await?;
    Ok(Json(info.into()))
}

/// Delete a graph and all of its nodes
#[utoipa::path(
    delete,
    path = "/api/graphs/{graph_id}",
    params(
        ("graph_id" = String, Path, description = "Graph ID")
    ),
    responses(
        (status = 200, description = "Graph deleted", body = StatusResponse),
        (status = 404, description = "Graph not found")
    ),
    tag = "graphs"
)]
pub async fn delete_graph(
    State(state): State<Arc<AppState>>,
    Path(graph_id): Path<String>,
) -> ApiResult<Json<StatusResponse>> {
    let removed = state.persist.delete_graph(&graph_id).await?;

    Ok(Json(StatusResponse {
        success: true,
        message: format!("Graph deleted ({} nodes removed)", removed),
    }))
}

/// Replace a graph's nodes with the canvas state
#[utoipa::path(
    post,
    path = "/api/graphs/{graph_id}/save",
    params(
        ("graph_id" = String, Path, description = "Graph ID")
    ),
    request_body = SaveGraphRequest,
    responses(
        (status = 200, description = "Graph saved", body = StatusResponse),
        (status = 400, description = "Invalid nodes or edges"),
        (status = 404, description = "Graph not found")
    ),
    tag = "graphs"
)]
pub async fn save_graph(
    State(state): State<Arc<AppState>>,
    Path(graph_id): Path<String>,
    ValidatedJson(req): ValidatedJson<SaveGraphRequest>,
) -> ApiResult<Json<StatusResponse>> {
    if let Some(body_id) = req.graph_id.as_deref().filter(|id| !id.is_empty()) {
        if body_id != graph_id {
            return Err(ApiError::BadRequest(format!(
                "graph_id {} does not match path {}",
                body_id, graph_id
            )));
        }
    }

    let saved = state.persist.save_graph(&graph_id, req.nodes, req.edges).await?;

    Ok(Json(StatusResponse {
        success: true,
        message: format!("Graph saved ({} nodes)", saved),
    }))
}

/// Load a graph with its nodes and derived edges
#[utoipa::path(
    get,
    path = "/api/graphs/{graph_id}/load",
    params(
        ("graph_id" = String, Path, description = "Graph ID")
    ),
    responses(
        (status = 200, description = "Graph contents", body = GraphSnapshotResponse),
        (status = 404, description = "Graph not found")
    ),
    tag = "graphs"
)]
pub async fn load_graph(
    State(state): State<Arc<AppState>>,
    Path(graph_id): Path<String>,
) -> ApiResult<Json<GraphSnapshotResponse>> {
    let snapshot = state.persist.load_graph(&graph_id).await?;
    Ok(Json(snapshot.into()))
}
