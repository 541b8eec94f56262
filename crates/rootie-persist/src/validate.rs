use std::collections::{HashMap, HashSet};

use chrono::Utc;
use rootie_types::{DialogueNode, GraphEdge};

use crate::error::{PersistError, Result};

/// Check a save payload and normalise it for storage under `graph_id`.
///
/// Every node is stamped with the graph id and a `created_at`. Edges fill in
/// missing parent links; a parent must be another node of the same payload and
/// the parent chains must be acyclic.
pub(crate) fn prepare_snapshot(
    graph_id: &str,
    nodes: Vec<DialogueNode>,
    edges: &[GraphEdge],
) -> Result<Vec<DialogueNode>> {
    let mut index = HashMap::with_capacity(nodes.len());
    for (pos, node) in nodes.iter().enumerate() {
        if node.id.trim().is_empty() {
            return Err(PersistError::Validation("node id must not be empty".to_string()));
        }
        if let Some(other) = node.graph_id.as_deref() {
            if other != graph_id {
                return Err(PersistError::Validation(format!(
                    "node {} belongs to graph {}",
                    node.id, other
                )));
            }
        }
        if index.insert(node.id.clone(), pos).is_some() {
            return Err(PersistError::Validation(format!("duplicate node id {}", node.id)));
        }
    }

    let mut nodes = nodes;
    for edge in edges {
        let Some(&target) = index.get(&edge.target) else {
            return Err(PersistError::Validation(format!(
                "edge {} targets unknown node {}",
                edge.id, edge.target
            )));
        };
        if !index.contains_key(&edge.source) {
            return Err(PersistError::Validation(format!(
                "edge {} starts at unknown node {}",
                edge.id, edge.source
            )));
        }

        let node = &mut nodes[target];
        match node.parent_node_id.as_deref().filter(|p| !p.is_empty()) {
            None => node.parent_node_id = Some(edge.source.clone()),
            Some(parent) if parent == edge.source => {}
            Some(parent) => {
                return Err(PersistError::Validation(format!(
                    "node {} has parent {} but edge {} says {}",
                    node.id, parent, edge.id, edge.source
                )));
            }
        }
    }

    let now = Utc::now();
    for node in nodes.iter_mut() {
        if node.parent_node_id.as_deref() == Some("") {
            node.parent_node_id = None;
        }
        if let Some(parent) = node.parent_node_id.as_deref() {
            if !index.contains_key(parent) {
                return Err(PersistError::Validation(format!(
                    "node {} references parent {} outside graph {}",
                    node.id, parent, graph_id
                )));
            }
        }
        node.graph_id = Some(graph_id.to_string());
        node.created_at.get_or_insert(now);
    }

    reject_cycles(&nodes)?;
    Ok(nodes)
}

fn reject_cycles(nodes: &[DialogueNode]) -> Result<()> {
    let parents: HashMap<&str, Option<&str>> = nodes
        .iter()
        .map(|n| (n.id.as_str(), n.parent_node_id.as_deref()))
        .collect();

    let mut acyclic: HashSet<&str> = HashSet::new();
    for node in nodes {
        let mut seen = HashSet::new();
        let mut current = Some(node.id.as_str());
        while let Some(id) = current {
            if acyclic.contains(id) {
                break;
            }
            if !seen.insert(id) {
                return Err(PersistError::Validation(format!(
                    "parent links of node {} form a cycle",
                    node.id
                )));
            }
            current = parents.get(id).copied().flatten();
        }
        acyclic.extend(seen);
    }
    Ok(())
}

/// Stamp a finished turn with its finalisation time if the caller left it blank
pub(crate) fn finalize_node(mut node: DialogueNode) -> Result<DialogueNode> {
    if node.id.trim().is_empty() {
        return Err(PersistError::Validation("node id must not be empty".to_string()));
    }
    node.created_at.get_or_insert_with(Utc::now);
    if node.parent_node_id.as_deref() == Some("") {
        node.parent_node_id = None;
    }
    if node.graph_id.as_deref() == Some("") {
        node.graph_id = None;
    }
    Ok(node)
}
