pub mod node;
pub mod graph;
pub mod state;
pub mod config;
pub mod events;

pub use node::{DialogueNode, NodeId};
pub use graph::{DialogueGraph, GraphEdge, GraphUpdate, NewGraph};
pub use state::TurnRequest;
pub use config::{RelayConfig, PersistFailurePolicy, DEFAULT_ENDPOINT_ID, DEFAULT_MODEL_NAME};
pub use events::RelayEvent;
