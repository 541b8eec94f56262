use std::sync::Arc;

use rootie_context::{AncestorPathStrategy, ContextStrategy};
use rootie_llm::ChatClient;
use rootie_persist::PersistenceClient;
use rootie_relay::Relay;

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// The relay is stateless and created once at startup; every request
/// brings its own node set to the context strategy.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub persist: Arc<dyn PersistenceClient>,
    pub context_strategy: Arc<dyn ContextStrategy>,
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(
        config: Config,
        llm_client: Arc<dyn ChatClient>,
        persist: Arc<dyn PersistenceClient>,
    ) -> Self {
        let context_strategy: Arc<dyn ContextStrategy> = Arc::new(
            AncestorPathStrategy::with_system_prompt(config.relay.system_prompt.clone()),
        );
        let relay = Relay::new(llm_client, config.relay_config()).with_store(Arc::clone(&persist));

        Self {
            config: Arc::new(config),
            persist,
            context_strategy,
            relay: Arc::new(relay),
        }
    }
}
