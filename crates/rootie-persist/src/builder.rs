use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dbs::{MemoryClient, SqliteClient};
use crate::error::{PersistError, Result};
use crate::trait_client::PersistenceClient;

pub const DEFAULT_DB_PATH: &str = "rootie.db";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Memory => "memory",
        }
    }
}

pub struct PersistClientBuilder {
    backend: StorageBackend,
    path: Option<PathBuf>,
}

impl PersistClientBuilder {
    pub fn new() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: None,
        }
    }

    pub fn backend(mut self, backend: StorageBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Database file for the SQLite backend
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<Arc<dyn PersistenceClient>> {
        match self.backend {
            StorageBackend::Memory => Ok(Arc::new(MemoryClient::new())),
            StorageBackend::Sqlite => {
                let path = self.path.unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
                if path.as_os_str() == ":memory:" {
                    return Err(PersistError::Connection(
                        "sqlite needs a file path; use the memory backend for an ephemeral store"
                            .to_string(),
                    ));
                }
                Ok(Arc::new(SqliteClient::open(path)?))
            }
        }
    }
}

impl Default for PersistClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
