pub mod models;
pub mod dbs;
pub mod error;
pub mod builder;
pub mod trait_client;
mod validate;

pub use models::{GraphInfo, GraphSnapshot, NodeScope, UpsertOutcome};
pub use dbs::{MemoryClient, SqliteClient};
pub use error::PersistError;
pub use builder::{PersistClientBuilder, StorageBackend, DEFAULT_DB_PATH};
pub use trait_client::PersistenceClient;
