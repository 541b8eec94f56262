mod builder;
mod error;
mod relay;

pub use builder::RelayBuilder;
pub use error::{RelayError, Result};
pub use relay::{Completion, Relay, EVENT_BUFFER};

// Re-export the types callers need to drive a relay
pub use rootie_types::{PersistFailurePolicy, RelayConfig, RelayEvent, TurnRequest};
