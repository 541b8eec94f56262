mod snapshot;

pub use snapshot::{GraphInfo, GraphSnapshot, NodeScope, UpsertOutcome};
