use async_trait::async_trait;
use rootie_types::{DialogueGraph, DialogueNode, GraphEdge, GraphUpdate, NewGraph};

use crate::error::Result;
use crate::models::{GraphInfo, GraphSnapshot, NodeScope, UpsertOutcome};

/// Trait for graph and node persistence
///
/// Implementations scope any session or transaction to a single call.
#[async_trait]
pub trait PersistenceClient: Send + Sync {
    /// Create a new, empty graph
    async fn create_graph(&self, new_graph: NewGraph) -> Result<DialogueGraph>;

    /// All graphs, most recently updated first
    async fn list_graphs(&self) -> Result<Vec<GraphInfo>>;

    async fn get_graph(&self, graph_id: &str) -> Result<Option<GraphInfo>>;

    /// Apply a partial title/description update
    async fn update_graph(&self, graph_id: &str, update: GraphUpdate) -> Result<GraphInfo>;

    /// Delete a graph and every node filed under it; returns the number of nodes removed
    async fn delete_graph(&self, graph_id: &str) -> Result<usize>;

    /// Replace the graph's node set with `nodes`, linking parents through `edges`
    async fn save_graph(
        &self,
        graph_id: &str,
        nodes: Vec<DialogueNode>,
        edges: Vec<GraphEdge>,
    ) -> Result<usize>;

    /// Graph, its nodes and the edges derived from their parent links
    async fn load_graph(&self, graph_id: &str) -> Result<GraphSnapshot>;

    /// Insert the node, or overwrite the turn stored under the same id
    async fn upsert_node(&self, node: DialogueNode) -> Result<UpsertOutcome>;

    async fn list_nodes(&self, scope: NodeScope) -> Result<Vec<DialogueNode>>;

    /// Cheap liveness probe
    async fn ping(&self) -> Result<()>;
}
