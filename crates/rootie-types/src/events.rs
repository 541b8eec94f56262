use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// Framed event of a streamed turn
///
/// A stream is always `Init`, zero or more `Chunk`s, then exactly one of
/// `Complete`, `Done` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayEvent {
    /// Pending turn, sent before the provider answers
    Init {
        node_id: NodeId,
        question: String,
        parent_node_id: Option<NodeId>,
        model_name: String,
        endpoint_id: String,
    },

    /// Incremental, non-empty reply fragment
    Chunk {
        content: String,
    },

    /// Reply finished and the node was handed to storage
    Complete {
        full_response: String,
        created_at: DateTime<Utc>,
    },

    /// Reply finished; persisting the node is left to the caller
    Done {
        full_response: String,
        created_at: DateTime<Utc>,
    },

    Error {
        #[serde(rename = "error", alias = "message")]
        message: String,
    },
}

impl RelayEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Done { .. } | Self::Error { .. })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Chunk { .. } => "chunk",
            Self::Complete { .. } => "complete",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }
}
