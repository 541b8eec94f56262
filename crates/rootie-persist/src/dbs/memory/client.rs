use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use rootie_types::{DialogueGraph, DialogueNode, GraphEdge, GraphUpdate, NewGraph};

use crate::error::{PersistError, Result};
use crate::models::{GraphInfo, GraphSnapshot, NodeScope, UpsertOutcome};
use crate::trait_client::PersistenceClient;
use crate::validate::{finalize_node, prepare_snapshot};

#[derive(Default)]
struct Tables {
    graphs: HashMap<String, DialogueGraph>,
    /// Insertion order is kept so listings match the SQLite backend
    nodes: Vec<DialogueNode>,
}

impl Tables {
    fn info(&self, graph: &DialogueGraph) -> GraphInfo {
        let node_count = self
            .nodes
            .iter()
            .filter(|n| n.graph_id.as_deref() == Some(graph.id.as_str()))
            .count();
        GraphInfo {
            graph: graph.clone(),
            node_count,
        }
    }

    fn require_graph(&self, graph_id: &str) -> Result<&DialogueGraph> {
        self.graphs
            .get(graph_id)
            .ok_or_else(|| PersistError::GraphNotFound(graph_id.to_string()))
    }

    fn touch(&mut self, graph_id: &str) {
        if let Some(graph) = self.graphs.get_mut(graph_id) {
            graph.updated_at = Utc::now();
        }
    }
}

/// Process-local store for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryClient {
    tables: RwLock<Tables>,
}

impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistenceClient for MemoryClient {
    async fn create_graph(&self, new_graph: NewGraph) -> Result<DialogueGraph> {
        let graph = DialogueGraph::new(new_graph.title, new_graph.description);
        self.tables
            .write()
            .await
            .graphs
            .insert(graph.id.clone(), graph.clone());
        Ok(graph)
    }

    async fn list_graphs(&self) -> Result<Vec<GraphInfo>> {
        let tables = self.tables.read().await;
        let mut graphs: Vec<GraphInfo> = tables.graphs.values().map(|g| tables.info(g)).collect();
        graphs.sort_by(|a, b| b.graph.updated_at.cmp(&a.graph.updated_at));
        Ok(graphs)
    }

    async fn get_graph(&self, graph_id: &str) -> Result<Option<GraphInfo>> {
        let tables = self.tables.read().await;
        Ok(tables.graphs.get(graph_id).map(|g| tables.info(g)))
    }

    async fn update_graph(&self, graph_id: &str, update: GraphUpdate) -> Result<GraphInfo> {
        let mut tables = self.tables.write().await;
        let graph = tables
            .graphs
            .get_mut(graph_id)
            .ok_or_else(|| PersistError::GraphNotFound(graph_id.to_string()))?;
        graph.apply(&update);
        let graph = graph.clone();
        Ok(tables.info(&graph))
    }

    async fn delete_graph(&self, graph_id: &str) -> Result<usize> {
        let mut tables = self.tables.write().await;
        if tables.graphs.remove(graph_id).is_none() {
            return Err(PersistError::GraphNotFound(graph_id.to_string()));
        }
        let before = tables.nodes.len();
        tables
            .nodes
            .retain(|n| n.graph_id.as_deref() != Some(graph_id));
        Ok(before - tables.nodes.len())
    }

    async fn save_graph(
        &self,
        graph_id: &str,
        nodes: Vec<DialogueNode>,
        edges: Vec<GraphEdge>,
    ) -> Result<usize> {
        let nodes = prepare_snapshot(graph_id, nodes, &edges)?;

        let mut tables = self.tables.write().await;
        tables.require_graph(graph_id)?;

        // Check before mutating so a rejected save changes nothing
        for node in &nodes {
            let filed_elsewhere = tables.nodes.iter().find(|stored| {
                stored.id == node.id
                    && stored
                        .graph_id
                        .as_deref()
                        .is_some_and(|g| g != graph_id)
            });
            if let Some(stored) = filed_elsewhere {
                return Err(PersistError::Validation(format!(
                    "node {} already belongs to graph {}",
                    node.id,
                    stored.graph_id.as_deref().unwrap_or_default()
                )));
            }
        }

        tables.nodes.retain(|stored| {
            stored.graph_id.as_deref() != Some(graph_id) && !nodes.iter().any(|n| n.id == stored.id)
        });
        let saved = nodes.len();
        tables.nodes.extend(nodes);
        tables.touch(graph_id);
        Ok(saved)
    }

    async fn load_graph(&self, graph_id: &str) -> Result<GraphSnapshot> {
        let tables = self.tables.read().await;
        let graph = tables.require_graph(graph_id)?.clone();
        let nodes = tables
            .nodes
            .iter()
            .filter(|n| n.graph_id.as_deref() == Some(graph_id))
            .cloned()
            .collect();
        Ok(GraphSnapshot::new(graph, nodes))
    }

    async fn upsert_node(&self, node: DialogueNode) -> Result<UpsertOutcome> {
        let mut node = finalize_node(node)?;

        let mut tables = self.tables.write().await;
        if let Some(graph_id) = node.graph_id.as_deref() {
            tables.require_graph(graph_id)?;
        }

        let outcome = match tables.nodes.iter_mut().find(|n| n.id == node.id) {
            None => {
                tables.nodes.push(node.clone());
                UpsertOutcome::Inserted
            }
            Some(stored) => {
                if let (Some(existing), Some(requested)) =
                    (stored.graph_id.as_deref(), node.graph_id.as_deref())
                {
                    if existing != requested {
                        return Err(PersistError::Validation(format!(
                            "node {} already belongs to graph {}",
                            node.id, existing
                        )));
                    }
                }
                if node.graph_id.is_none() {
                    node.graph_id = stored.graph_id.take();
                }
                if node.position_x.is_none() {
                    node.position_x = stored.position_x;
                }
                if node.position_y.is_none() {
                    node.position_y = stored.position_y;
                }
                *stored = node.clone();
                UpsertOutcome::Updated
            }
        };

        if let Some(graph_id) = node.graph_id.as_deref() {
            tables.touch(graph_id);
        }
        Ok(outcome)
    }

    async fn list_nodes(&self, scope: NodeScope) -> Result<Vec<DialogueNode>> {
        let tables = self.tables.read().await;
        let nodes = tables
            .nodes
            .iter()
            .filter(|n| match &scope {
                NodeScope::All => true,
                NodeScope::Unfiled => n.graph_id.is_none(),
                NodeScope::Graph(graph_id) => n.graph_id.as_deref() == Some(graph_id.as_str()),
            })
            .cloned()
            .collect();
        Ok(nodes)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
