use std::sync::Arc;

use anyhow::{anyhow, Result};
use rootie_llm::ChatClient;
use rootie_persist::PersistenceClient;
use rootie_types::RelayConfig;

use crate::relay::Relay;

/// Builder for constructing a Relay with an optional store
pub struct RelayBuilder {
    client: Option<Arc<dyn ChatClient>>,
    config: RelayConfig,
    store: Option<Arc<dyn PersistenceClient>>,
}

impl RelayBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            config: RelayConfig::default(),
            store: None,
        }
    }

    pub fn client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    /// Persist completed nodes through `store`
    pub fn store(mut self, store: Arc<dyn PersistenceClient>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn build(self) -> Result<Relay> {
        let client = self.client.ok_or_else(|| anyhow!("Chat client is required"))?;

        let relay = Relay::new(client, self.config);
        Ok(match self.store {
            Some(store) => relay.with_store(store),
            None => relay,
        })
    }
}

impl Default for RelayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
