use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::node::{DialogueNode, NodeId};

/// A named tree of dialogue nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueGraph {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DialogueGraph {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update; `updated_at` moves forward only if something changed
    pub fn apply(&mut self, update: &GraphUpdate) -> bool {
        let mut changed = false;
        if let Some(title) = &update.title {
            self.title = title.clone();
            changed = true;
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
            changed = true;
        }
        if changed {
            self.updated_at = Utc::now();
        }
        changed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewGraph {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Canvas edge between two nodes; `source` is the parent, `target` the child
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    #[serde(default)]
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
}

impl GraphEdge {
    pub fn between(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("e{}-{}", source, target),
            source,
            target,
        }
    }

    /// One edge per parent link, in node order
    pub fn from_parent_links(nodes: &[DialogueNode]) -> Vec<Self> {
        nodes
            .iter()
            .filter_map(|node| {
                node.parent_node_id
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .map(|parent| Self::between(parent, node.id.clone()))
            })
            .collect()
    }
}
