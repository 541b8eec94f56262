// Configuration layer for provider client creation

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::openai::OpenAIClient;
use crate::traits::ChatClient;

/// Volcengine Ark chat-completions endpoint (OpenAI-compatible)
pub const ARK_API_BASE: &str = "https://ark.cn-beijing.volces.com/api/v3";

/// Header asking Ark to encrypt the inference session at the application layer
pub const ARK_ENCRYPTION_HEADER: &str = "x-is-encrypted";

/// Connection details for an OpenAI-compatible provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: String,
    /// Base URL without the `/chat/completions` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Extra headers sent with every request
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
}

fn default_base_url() -> String {
    ARK_API_BASE.to_string()
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            extra_headers: BTreeMap::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    /// Turn on Ark's application-layer session encryption
    pub fn encrypted(self) -> Self {
        self.with_header(ARK_ENCRYPTION_HEADER, "true")
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    pub fn create_client(config: &ProviderConfig) -> Result<Arc<dyn ChatClient>> {
        let client = OpenAIClient::from_config(config)?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_ark() {
        let config = ProviderConfig::new("test-key");
        assert_eq!(config.base_url, ARK_API_BASE);
        assert!(config.extra_headers.is_empty());
    }

    #[test]
    fn test_encrypted_header() {
        let config = ProviderConfig::new("test-key").encrypted();
        assert_eq!(
            config.extra_headers.get(ARK_ENCRYPTION_HEADER).map(String::as_str),
            Some("true")
        );
    }

    #[test]
    fn test_serde_defaults() {
        let config: ProviderConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.base_url, ARK_API_BASE);
    }

    #[test]
    fn test_factory_rejects_empty_key() {
        assert!(ClientFactory::create_client(&ProviderConfig::new("")).is_err());
    }
}
