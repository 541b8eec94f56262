use rootie_llm::ChatOptions;
use serde::{Deserialize, Serialize};

/// Ark endpoint id used as the `model` field of provider calls
pub const DEFAULT_ENDPOINT_ID: &str = "ep-20250228174015-wrzrt";

/// Display name of the model behind [`DEFAULT_ENDPOINT_ID`]
pub const DEFAULT_MODEL_NAME: &str = "Doubao-1.5-pro-32k-250115";

/// What the relay does when saving a completed node fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistFailurePolicy {
    /// Log the failure and still report the turn as complete
    #[default]
    #[serde(alias = "log")]
    LogAndContinue,
    /// Report the failure to the caller instead of completing
    #[serde(alias = "fail")]
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Provider-side identifier sent as `model`
    pub endpoint_id: String,
    /// Human-readable model name reported to clients
    pub model_name: String,
    #[serde(default)]
    pub options: ChatOptions,
    #[serde(default)]
    pub persist_failure: PersistFailurePolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint_id: DEFAULT_ENDPOINT_ID.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            options: ChatOptions::default(),
            persist_failure: PersistFailurePolicy::default(),
        }
    }
}

impl RelayConfig {
    pub fn new(endpoint_id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            endpoint_id: endpoint_id.into(),
            model_name: model_name.into(),
            ..Default::default()
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_persist_failure(mut self, policy: PersistFailurePolicy) -> Self {
        self.persist_failure = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_aliases() {
        let log: PersistFailurePolicy = serde_json::from_str(r#""log""#).unwrap();
        let fail: PersistFailurePolicy = serde_json::from_str(r#""fail""#).unwrap();
        assert_eq!(log, PersistFailurePolicy::LogAndContinue);
        assert_eq!(fail, PersistFailurePolicy::Fail);
    }

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.endpoint_id, DEFAULT_ENDPOINT_ID);
        assert_eq!(config.model_name, DEFAULT_MODEL_NAME);
        assert_eq!(config.persist_failure, PersistFailurePolicy::LogAndContinue);
    }
}
