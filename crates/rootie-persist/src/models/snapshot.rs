use rootie_types::{DialogueGraph, DialogueNode, GraphEdge};
use serde::{Deserialize, Serialize};

/// Graph row plus the number of nodes filed under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphInfo {
    #[serde(flatten)]
    pub graph: DialogueGraph,
    pub node_count: usize,
}

/// Everything needed to redraw a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub graph: DialogueGraph,
    pub nodes: Vec<DialogueNode>,
    pub edges: Vec<GraphEdge>,
}

impl GraphSnapshot {
    pub fn new(graph: DialogueGraph, nodes: Vec<DialogueNode>) -> Self {
        let edges = GraphEdge::from_parent_links(&nodes);
        Self { graph, nodes, edges }
    }
}

/// Which stored nodes to list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeScope {
    All,
    /// Nodes created by chat turns that named no graph
    Unfiled,
    Graph(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}
