use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use rootie_context::DEFAULT_SYSTEM_PROMPT;
use rootie_llm::{config::ARK_API_BASE, ChatOptions, ProviderConfig};
use rootie_persist::{StorageBackend, DEFAULT_DB_PATH};
use rootie_types::{PersistFailurePolicy, RelayConfig, DEFAULT_ENDPOINT_ID, DEFAULT_MODEL_NAME};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub relay: RelaySettings,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secrets (from ENV only)
    #[serde(default)]
    pub ark_api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: vec!["http://localhost:5173".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    /// Ark endpoint id, sent as the request's `model`
    pub endpoint_id: String,
    /// Display name reported to clients
    pub model_name: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Send `x-is-encrypted: true` with every provider call
    pub encrypted: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: ARK_API_BASE.to_string(),
            endpoint_id: DEFAULT_ENDPOINT_ID.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            temperature: None,
            max_tokens: None,
            encrypted: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            path: DEFAULT_DB_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    pub system_prompt: String,
    pub persist_failure: PersistFailurePolicy,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            persist_failure: PersistFailurePolicy::LogAndContinue,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. `ROOTIE__SECTION__KEY` environment variables
    /// 4. Well-known provider variables (`ARK_*`, `CORS_ORIGINS`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("ROOTIE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut cfg: Config = builder.build()?.try_deserialize()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Apply secrets and overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        self.ark_api_key = non_empty("ARK_API_KEY").ok_or_else(|| {
            ConfigError::Message("ARK_API_KEY environment variable is required".to_string())
        })?;

        if let Some(endpoint_id) = non_empty("ARK_ENDPOINT_ID") {
            self.llm.endpoint_id = endpoint_id;
        }
        if let Some(model_name) = non_empty("ARK_MODEL_NAME") {
            self.llm.model_name = model_name;
        }
        if let Some(base_url) = non_empty("ARK_BASE_URL") {
            self.llm.base_url = base_url;
        }
        if let Some(origins) = non_empty("CORS_ORIGINS") {
            self.cors.origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }

        Ok(())
    }

    pub fn provider_config(&self) -> ProviderConfig {
        let config = ProviderConfig::new(self.ark_api_key.clone()).with_base_url(self.llm.base_url.clone());
        if self.llm.encrypted {
            config.encrypted()
        } else {
            config
        }
    }

    pub fn relay_config(&self) -> RelayConfig {
        let mut options = ChatOptions::new();
        if let Some(temperature) = self.llm.temperature {
            options = options.temperature(temperature);
        }
        if let Some(max_tokens) = self.llm.max_tokens {
            options = options.max_tokens(max_tokens);
        }

        RelayConfig::new(self.llm.endpoint_id.clone(), self.llm.model_name.clone())
            .with_options(options)
            .with_persist_failure(self.relay.persist_failure)
    }
}
